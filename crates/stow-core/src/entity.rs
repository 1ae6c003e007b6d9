use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique user identifier (UUID v4).
pub type UserId = Uuid;

/// Unique category identifier.
pub type CategoryId = Uuid;

/// Unique location identifier.
pub type LocationId = Uuid;

/// Unique inventory item identifier.
pub type ItemId = Uuid;

/// A registered account. Owns its items and custom categories.
///
/// Credential verification and token issuance happen outside the core;
/// the store only persists the hash the authentication provider supplies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created: DateTime<Utc>,
}

/// A named grouping for items, either system-provided or user-created.
///
/// Invariant: `created_by` is `None` iff `is_default`. Names are unique
/// per owner, and default categories are globally unique by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub is_default: bool,
    /// None for default categories.
    pub created_by: Option<UserId>,
    pub created: DateTime<Utc>,
}

impl Category {
    /// A system-provided default category, visible to every user.
    pub fn system_default(name: &str) -> Self {
        Self {
            id: CategoryId::new_v4(),
            name: name.to_string(),
            is_default: true,
            created_by: None,
            created: Utc::now(),
        }
    }

    /// A custom category owned by `owner`.
    pub fn custom(name: &str, owner: UserId) -> Self {
        Self {
            id: CategoryId::new_v4(),
            name: name.to_string(),
            is_default: false,
            created_by: Some(owner),
            created: Utc::now(),
        }
    }
}

/// A physical place items can be assigned to (a column on the board).
///
/// Locations live in one global namespace shared by all users, unlike
/// categories. Exactly one location carries `is_default = true`
/// ("Unassigned"); bootstrap creates it and it is never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub is_default: bool,
    pub created: DateTime<Utc>,
}

impl Location {
    pub fn new(name: &str) -> Self {
        Self {
            id: LocationId::new_v4(),
            name: name.to_string(),
            is_default: false,
            created: Utc::now(),
        }
    }

    /// The single system default location.
    pub fn system_default(name: &str) -> Self {
        Self {
            id: LocationId::new_v4(),
            name: name.to_string(),
            is_default: true,
            created: Utc::now(),
        }
    }
}

/// An inventory item. Owned by exactly one user, never shared.
///
/// `location` is optional: an absent assignment means the item falls
/// back to the default location when grouped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub quantity: i64,
    pub price: f64,
    pub category: CategoryId,
    pub location: Option<LocationId>,
    pub owner: UserId,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Item {
    /// Build a new item from a draft, stamping ownership and timestamps.
    pub fn from_draft(draft: ItemDraft, owner: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: ItemId::new_v4(),
            name: draft.name,
            description: draft.description,
            quantity: draft.quantity,
            price: draft.price,
            category: draft.category,
            location: draft.location,
            owner,
            created: now,
            modified: now,
        }
    }
}

/// Caller-supplied fields for creating an item. The store stamps id,
/// owner, and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub quantity: i64,
    pub price: f64,
    pub category: CategoryId,
    #[serde(default)]
    pub location: Option<LocationId>,
}
