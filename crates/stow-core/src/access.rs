//! Ownership and visibility rules.
//!
//! Unauthorized access is indistinguishable from a missing record: store
//! backends answer both with `StoreError::NotFoundOrUnauthorized` so a
//! caller can never probe for the existence of another user's data.
//! These predicates are pure; the store backends enforce them.

use crate::entity::{Category, Item, UserId};

/// A category is visible if it is a system default or owned by the caller.
pub fn is_visible_category(owner: UserId, category: &Category) -> bool {
    category.is_default || category.created_by == Some(owner)
}

/// Defaults plus the caller's own custom categories.
pub fn visible_categories<'a>(owner: UserId, categories: &'a [Category]) -> Vec<&'a Category> {
    categories
        .iter()
        .filter(|c| is_visible_category(owner, c))
        .collect()
}

/// Items are never shared: only the owner sees them.
pub fn visible_items<'a>(owner: UserId, items: &'a [Item]) -> Vec<&'a Item> {
    items.iter().filter(|i| i.owner == owner).collect()
}

/// Only custom categories can be mutated, and only by their creator.
/// Default categories are immutable for every user.
pub fn can_mutate_category(owner: UserId, category: &Category) -> bool {
    category.created_by == Some(owner)
}

pub fn can_mutate_item(owner: UserId, item: &Item) -> bool {
    item.owner == owner
}
