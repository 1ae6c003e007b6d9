//! The remote entity store as seen by one authenticated caller.
//!
//! The caller's identity travels with the connection (the transport
//! attaches credentials), so the trait carries no owner parameter. The
//! in-process adapter below binds an owner id to any `EntityStore`; an
//! HTTP adapter would implement the same trait against a real server.

use std::sync::Arc;

use stow_core::{
    Category, CategoryId, EntityKind, EntityStore, Item, ItemDraft, ItemId, Location, LocationId,
    StoreError, UserId,
};

/// Errors surfaced to the session layer.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// Missing and foreign records answer identically.
    #[error("{0} not found or not authorized")]
    NotFoundOrUnauthorized(EntityKind),

    /// Uniqueness violation; user-correctable, retry with another name.
    #[error("{kind} name already exists: {name}")]
    DuplicateName { kind: EntityKind, name: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Transient transport or backend failure. Retryable, but the
    /// session never retries on its own.
    #[error("Remote unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for RemoteError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFoundOrUnauthorized(kind) => RemoteError::NotFoundOrUnauthorized(kind),
            StoreError::DuplicateName { kind, name } => RemoteError::DuplicateName { kind, name },
            StoreError::Validation(msg) => RemoteError::Validation(msg),
            StoreError::Storage(msg) | StoreError::Unavailable(msg) => {
                RemoteError::Unavailable(msg)
            }
        }
    }
}

/// Remote operations the session needs. One implementation per
/// transport; every method is a single request/response exchange.
pub trait RemoteInventory: Send + Sync {
    fn fetch_items(&self) -> Result<Vec<Item>, RemoteError>;
    fn fetch_categories(&self) -> Result<Vec<Category>, RemoteError>;
    fn fetch_locations(&self) -> Result<Vec<Location>, RemoteError>;

    fn create_item(&self, draft: ItemDraft) -> Result<Item, RemoteError>;
    /// Full-representation update; the server answer is authoritative.
    fn update_item(&self, item: Item) -> Result<Item, RemoteError>;
    fn delete_item(&self, id: ItemId) -> Result<(), RemoteError>;

    fn create_category(&self, name: &str) -> Result<Category, RemoteError>;
    fn delete_category(&self, id: CategoryId) -> Result<(), RemoteError>;

    fn create_location(&self, name: &str) -> Result<Location, RemoteError>;
    fn delete_location(&self, id: LocationId) -> Result<(), RemoteError>;
}

/// In-process remote: an `EntityStore` with an owner identity bound to
/// every call. Doubles as the test transport.
pub struct StoreRemote {
    store: Arc<dyn EntityStore>,
    owner: UserId,
}

impl StoreRemote {
    pub fn new(store: Arc<dyn EntityStore>, owner: UserId) -> Self {
        Self { store, owner }
    }
}

impl RemoteInventory for StoreRemote {
    fn fetch_items(&self) -> Result<Vec<Item>, RemoteError> {
        Ok(self.store.items_for(self.owner)?)
    }

    fn fetch_categories(&self) -> Result<Vec<Category>, RemoteError> {
        Ok(self.store.categories_for(self.owner)?)
    }

    fn fetch_locations(&self) -> Result<Vec<Location>, RemoteError> {
        Ok(self.store.locations()?)
    }

    fn create_item(&self, draft: ItemDraft) -> Result<Item, RemoteError> {
        Ok(self.store.create_item(self.owner, draft)?)
    }

    fn update_item(&self, item: Item) -> Result<Item, RemoteError> {
        Ok(self.store.update_item(self.owner, item)?)
    }

    fn delete_item(&self, id: ItemId) -> Result<(), RemoteError> {
        Ok(self.store.delete_item(self.owner, id)?)
    }

    fn create_category(&self, name: &str) -> Result<Category, RemoteError> {
        Ok(self.store.create_category(self.owner, name)?)
    }

    fn delete_category(&self, id: CategoryId) -> Result<(), RemoteError> {
        Ok(self.store.delete_category(self.owner, id)?)
    }

    fn create_location(&self, name: &str) -> Result<Location, RemoteError> {
        Ok(self.store.create_location(name)?)
    }

    fn delete_location(&self, id: LocationId) -> Result<(), RemoteError> {
        Ok(self.store.delete_location(id)?)
    }
}
