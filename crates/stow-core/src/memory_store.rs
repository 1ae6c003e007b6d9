//! In-memory entity store. The test backend, and the fake remote for
//! client-layer tests.

use std::sync::Mutex;

use chrono::Utc;

use crate::access;
use crate::entity::{
    Category, CategoryId, Item, ItemDraft, ItemId, Location, LocationId, User, UserId,
};
use crate::store::{EntityKind, EntityStore, StoreError};
use crate::validate::{join_errors, validate_draft, validate_entity_name};

#[derive(Default)]
struct State {
    users: Vec<User>,
    categories: Vec<Category>,
    locations: Vec<Location>,
    items: Vec<Item>,
}

/// Memory-backed implementation of the EntityStore trait.
#[derive(Default)]
pub struct MemoryEntityStore {
    state: Mutex<State>,
}

impl MemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, State>, StoreError> {
        self.state
            .lock()
            .map_err(|e| StoreError::Storage(e.to_string()))
    }
}

impl EntityStore for MemoryEntityStore {
    fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        validate_entity_name("username", username)
            .map_err(|e| StoreError::Validation(e.to_string()))?;
        let mut state = self.lock()?;
        if state.users.iter().any(|u| u.email == email) {
            return Err(StoreError::DuplicateName {
                kind: EntityKind::User,
                name: email.to_string(),
            });
        }
        let user = User {
            id: UserId::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created: Utc::now(),
        };
        state.users.push(user.clone());
        Ok(user)
    }

    fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let state = self.lock()?;
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }

    fn categories_for(&self, owner: UserId) -> Result<Vec<Category>, StoreError> {
        let state = self.lock()?;
        Ok(access::visible_categories(owner, &state.categories)
            .into_iter()
            .cloned()
            .collect())
    }

    fn create_category(&self, owner: UserId, name: &str) -> Result<Category, StoreError> {
        validate_entity_name("name", name).map_err(|e| StoreError::Validation(e.to_string()))?;
        let mut state = self.lock()?;
        let clash = state
            .categories
            .iter()
            .any(|c| c.created_by == Some(owner) && c.name == name);
        if clash {
            return Err(StoreError::DuplicateName {
                kind: EntityKind::Category,
                name: name.to_string(),
            });
        }
        let category = Category::custom(name, owner);
        state.categories.push(category.clone());
        Ok(category)
    }

    fn create_default_category(&self, name: &str) -> Result<Category, StoreError> {
        validate_entity_name("name", name).map_err(|e| StoreError::Validation(e.to_string()))?;
        let mut state = self.lock()?;
        if state
            .categories
            .iter()
            .any(|c| c.is_default && c.name == name)
        {
            return Err(StoreError::DuplicateName {
                kind: EntityKind::Category,
                name: name.to_string(),
            });
        }
        let category = Category::system_default(name);
        state.categories.push(category.clone());
        Ok(category)
    }

    fn delete_category(&self, owner: UserId, id: CategoryId) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        // Same answer whether the category is missing, default, or
        // someone else's.
        let pos = state
            .categories
            .iter()
            .position(|c| c.id == id && access::can_mutate_category(owner, c))
            .ok_or(StoreError::NotFoundOrUnauthorized(EntityKind::Category))?;
        state.categories.remove(pos);
        Ok(())
    }

    fn locations(&self) -> Result<Vec<Location>, StoreError> {
        let state = self.lock()?;
        let mut locations = state.locations.clone();
        locations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(locations)
    }

    fn create_location(&self, name: &str) -> Result<Location, StoreError> {
        validate_entity_name("name", name).map_err(|e| StoreError::Validation(e.to_string()))?;
        let mut state = self.lock()?;
        if state.locations.iter().any(|l| l.name == name) {
            return Err(StoreError::DuplicateName {
                kind: EntityKind::Location,
                name: name.to_string(),
            });
        }
        let location = Location::new(name);
        state.locations.push(location.clone());
        Ok(location)
    }

    fn create_default_location(&self, name: &str) -> Result<Location, StoreError> {
        validate_entity_name("name", name).map_err(|e| StoreError::Validation(e.to_string()))?;
        let mut state = self.lock()?;
        // At most one default location, regardless of name.
        if state
            .locations
            .iter()
            .any(|l| l.name == name || l.is_default)
        {
            return Err(StoreError::DuplicateName {
                kind: EntityKind::Location,
                name: name.to_string(),
            });
        }
        let location = Location::system_default(name);
        state.locations.push(location.clone());
        Ok(location)
    }

    fn delete_location(&self, id: LocationId) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        let pos = state
            .locations
            .iter()
            .position(|l| l.id == id)
            .ok_or(StoreError::NotFoundOrUnauthorized(EntityKind::Location))?;
        if state.locations[pos].is_default {
            return Err(StoreError::Validation(
                "the default location cannot be deleted".into(),
            ));
        }
        state.locations.remove(pos);
        Ok(())
    }

    fn items_for(&self, owner: UserId) -> Result<Vec<Item>, StoreError> {
        let state = self.lock()?;
        Ok(access::visible_items(owner, &state.items)
            .into_iter()
            .cloned()
            .collect())
    }

    fn item(&self, owner: UserId, id: ItemId) -> Result<Item, StoreError> {
        let state = self.lock()?;
        state
            .items
            .iter()
            .find(|i| i.id == id && access::can_mutate_item(owner, i))
            .cloned()
            .ok_or(StoreError::NotFoundOrUnauthorized(EntityKind::Item))
    }

    fn create_item(&self, owner: UserId, draft: ItemDraft) -> Result<Item, StoreError> {
        validate_draft(&draft).map_err(|e| StoreError::Validation(join_errors(&e)))?;
        let mut state = self.lock()?;
        let item = Item::from_draft(draft, owner);
        state.items.push(item.clone());
        Ok(item)
    }

    fn update_item(&self, owner: UserId, item: Item) -> Result<Item, StoreError> {
        let draft = ItemDraft {
            name: item.name.clone(),
            description: item.description.clone(),
            quantity: item.quantity,
            price: item.price,
            category: item.category,
            location: item.location,
        };
        validate_draft(&draft).map_err(|e| StoreError::Validation(join_errors(&e)))?;

        let mut state = self.lock()?;
        let stored = state
            .items
            .iter_mut()
            .find(|i| i.id == item.id && access::can_mutate_item(owner, i))
            .ok_or(StoreError::NotFoundOrUnauthorized(EntityKind::Item))?;

        // The store is authoritative for ownership and timestamps.
        stored.name = item.name;
        stored.description = item.description;
        stored.quantity = item.quantity;
        stored.price = item.price;
        stored.category = item.category;
        stored.location = item.location;
        stored.modified = Utc::now();
        Ok(stored.clone())
    }

    fn delete_item(&self, owner: UserId, id: ItemId) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        let pos = state
            .items
            .iter()
            .position(|i| i.id == id && access::can_mutate_item(owner, i))
            .ok_or(StoreError::NotFoundOrUnauthorized(EntityKind::Item))?;
        state.items.remove(pos);
        Ok(())
    }
}
