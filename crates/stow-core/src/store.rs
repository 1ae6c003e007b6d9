use crate::entity::{
    Category, CategoryId, Item, ItemDraft, ItemId, Location, LocationId, User, UserId,
};

/// Which entity a store error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    User,
    Category,
    Location,
    Item,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EntityKind::User => "user",
            EntityKind::Category => "category",
            EntityKind::Location => "location",
            EntityKind::Item => "item",
        };
        f.write_str(s)
    }
}

/// Errors from the entity store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Deliberately ambiguous: the record may not exist, or it may belong
    /// to someone else. Callers get the same answer either way.
    #[error("{0} not found or not authorized")]
    NotFoundOrUnauthorized(EntityKind),

    #[error("{kind} name already exists: {name}")]
    DuplicateName { kind: EntityKind, name: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    /// Transient backend failure; the caller may retry.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// The trait all durable backends implement.
///
/// Every item and category operation is scoped by the caller's owner id;
/// backends must answer cross-owner access with
/// `NotFoundOrUnauthorized`, never a distinct "forbidden" signal.
pub trait EntityStore: Send + Sync {
    // --- users ---

    /// Register a user. `password_hash` comes pre-hashed from the
    /// authentication provider. Duplicate emails are rejected.
    fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, StoreError>;

    fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    // --- categories ---

    /// Defaults plus the caller's own custom categories.
    fn categories_for(&self, owner: UserId) -> Result<Vec<Category>, StoreError>;

    /// Create a custom category owned by the caller. Names are unique
    /// per owner; a clash yields `DuplicateName`.
    fn create_category(&self, owner: UserId, name: &str) -> Result<Category, StoreError>;

    /// Create a system default category (bootstrap only). Default names
    /// are globally unique.
    fn create_default_category(&self, name: &str) -> Result<Category, StoreError>;

    /// Delete a custom category owned by the caller. Items referencing
    /// it keep their dangling reference; reads tolerate that.
    fn delete_category(&self, owner: UserId, id: CategoryId) -> Result<(), StoreError>;

    // --- locations (global namespace, not owner-scoped) ---

    /// All locations, sorted by name.
    fn locations(&self) -> Result<Vec<Location>, StoreError>;

    fn create_location(&self, name: &str) -> Result<Location, StoreError>;

    /// Create the system default location (bootstrap only).
    fn create_default_location(&self, name: &str) -> Result<Location, StoreError>;

    /// Delete a location. The default location is undeletable.
    fn delete_location(&self, id: LocationId) -> Result<(), StoreError>;

    // --- items ---

    fn items_for(&self, owner: UserId) -> Result<Vec<Item>, StoreError>;

    fn item(&self, owner: UserId, id: ItemId) -> Result<Item, StoreError>;

    fn create_item(&self, owner: UserId, draft: ItemDraft) -> Result<Item, StoreError>;

    /// Replace an item with the full representation supplied. The store
    /// is authoritative for `created`/`modified`; the returned item
    /// carries the stamped values.
    fn update_item(&self, owner: UserId, item: Item) -> Result<Item, StoreError>;

    fn delete_item(&self, owner: UserId, id: ItemId) -> Result<(), StoreError>;
}
