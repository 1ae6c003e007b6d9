//! The client session: cached collections plus move reconciliation.
//!
//! Writes follow apply-after-confirm: the remote store is updated
//! first, and only a confirmed server representation is merged into the
//! cache. A failed call leaves every cached collection exactly as it
//! was; there is no partial local mutation to roll back.

use stow_board::{resolve_move, Board, MoveGesture, MoveOutcome};
use stow_core::{
    join_errors, validate_draft, Category, CategoryId, Item, ItemDraft, ItemId, Location,
    LocationId,
};

use crate::remote::{RemoteError, RemoteInventory};

/// Errors surfaced by session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Rejected locally; the remote store was never called.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// One authenticated caller's view of their inventory.
pub struct InventorySession {
    remote: Box<dyn RemoteInventory>,
    items: Vec<Item>,
    categories: Vec<Category>,
    locations: Vec<Location>,
}

impl InventorySession {
    /// A session with empty caches; call `refresh` to populate them.
    pub fn new(remote: Box<dyn RemoteInventory>) -> Self {
        Self {
            remote,
            items: Vec::new(),
            categories: Vec::new(),
            locations: Vec::new(),
        }
    }

    /// Connect and load everything in one step.
    pub fn connect(remote: Box<dyn RemoteInventory>) -> Result<Self, SessionError> {
        let mut session = Self::new(remote);
        session.refresh()?;
        Ok(session)
    }

    /// Reload items, categories, and locations wholesale. On any
    /// failure the previous caches are kept.
    pub fn refresh(&mut self) -> Result<(), SessionError> {
        let items = self.remote.fetch_items()?;
        let categories = self.remote.fetch_categories()?;
        let locations = self.remote.fetch_locations()?;

        self.items = items;
        self.categories = categories;
        self.locations = locations;
        tracing::debug!(
            items = self.items.len(),
            locations = self.locations.len(),
            "Session caches refreshed"
        );
        Ok(())
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// The derived board over the current caches. Recomputed per call;
    /// the session holds no grouped state of its own.
    pub fn board(&self) -> Board {
        Board::build(&self.items, &self.locations)
    }

    /// Resolve a move gesture and, when it resolves to a real move,
    /// apply it remotely and merge the confirmed item into the cache.
    ///
    /// `Ok(NoOp)` covers cancelled gestures, unknown items, and
    /// same-container drops with nowhere else to go — none of those
    /// issue a remote call.
    pub fn move_item(&mut self, gesture: &MoveGesture) -> Result<MoveOutcome, SessionError> {
        let Some(item) = self.items.iter().find(|i| i.id == gesture.item) else {
            tracing::warn!(item = %gesture.item, "Move gesture for unknown item");
            return Ok(MoveOutcome::NoOp);
        };

        let board = self.board();
        // The resolver needs the explicit assignment: an unassigned
        // item displayed in the default column must not trigger the
        // same-container divert when dropped there.
        let current = board.assigned_column(item);
        let outcome = resolve_move(gesture, current, &board);
        let MoveOutcome::Move(mv) = outcome else {
            tracing::debug!(item = %gesture.item, "Move gesture resolved to no-op");
            return Ok(MoveOutcome::NoOp);
        };

        // Full representation, with only the assignment changed.
        let mut updated = item.clone();
        updated.location = Some(mv.to);

        match self.remote.update_item(updated) {
            Ok(confirmed) => {
                self.merge_item(confirmed);
                tracing::debug!(item = %mv.item, from = %mv.from, to = %mv.to, "Move applied");
                Ok(MoveOutcome::Move(mv))
            }
            Err(e) => {
                tracing::warn!(item = %mv.item, error = %e, "Move rejected, local state kept");
                Err(e.into())
            }
        }
    }

    /// Create an item. Field validation happens here; invalid drafts
    /// never reach the remote store.
    pub fn create_item(&mut self, draft: ItemDraft) -> Result<Item, SessionError> {
        validate_draft(&draft).map_err(|e| SessionError::Validation(join_errors(&e)))?;
        let item = self.remote.create_item(draft)?;
        self.items.push(item.clone());
        Ok(item)
    }

    /// Update an item with a full representation, merging the server
    /// answer back into the cache.
    pub fn update_item(&mut self, item: Item) -> Result<Item, SessionError> {
        let draft = ItemDraft {
            name: item.name.clone(),
            description: item.description.clone(),
            quantity: item.quantity,
            price: item.price,
            category: item.category,
            location: item.location,
        };
        validate_draft(&draft).map_err(|e| SessionError::Validation(join_errors(&e)))?;

        let confirmed = self.remote.update_item(item)?;
        self.merge_item(confirmed.clone());
        Ok(confirmed)
    }

    pub fn delete_item(&mut self, id: ItemId) -> Result<(), SessionError> {
        self.remote.delete_item(id)?;
        self.items.retain(|i| i.id != id);
        Ok(())
    }

    /// Create a location and reload the collections, matching the
    /// board's add-location flow (new columns may affect grouping).
    pub fn create_location(&mut self, name: &str) -> Result<LocationId, SessionError> {
        let location = self.remote.create_location(name)?;
        let id = location.id;
        self.refresh()?;
        Ok(id)
    }

    /// Create a custom category. A `DuplicateName` answer passes
    /// through verbatim; the user corrects the name and retries.
    pub fn create_category(&mut self, name: &str) -> Result<Category, SessionError> {
        let category = self.remote.create_category(name)?;
        self.categories.push(category.clone());
        Ok(category)
    }

    /// Delete a custom category. Items referencing it keep a dangling
    /// reference the board tolerates.
    pub fn delete_category(&mut self, id: CategoryId) -> Result<(), SessionError> {
        self.remote.delete_category(id)?;
        self.categories.retain(|c| c.id != id);
        Ok(())
    }

    /// Replace the cached entry with the server representation, or
    /// append it when unseen (a create confirmed elsewhere).
    fn merge_item(&mut self, confirmed: Item) {
        match self.items.iter_mut().find(|i| i.id == confirmed.id) {
            Some(slot) => *slot = confirmed,
            None => self.items.push(confirmed),
        }
    }
}
