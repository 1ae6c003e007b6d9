//! Create-then-select: while picking a category or location for an
//! item edit, the caller can create a new entity and have it selected
//! atomically. A failed create (duplicate name, remote down) reports
//! the error and keeps the prior selection; there is never a selection
//! pointing at an entity that was not created.

use stow_core::{Category, CategoryId, Location, LocationId};

use crate::remote::{RemoteError, RemoteInventory};

/// Location choice state for an in-progress item edit.
#[derive(Debug, Clone, Default)]
pub struct LocationPicker {
    options: Vec<Location>,
    selected: Option<LocationId>,
}

impl LocationPicker {
    pub fn new(options: Vec<Location>) -> Self {
        Self {
            options,
            selected: None,
        }
    }

    pub fn options(&self) -> &[Location] {
        &self.options
    }

    /// Select an existing option. Unknown ids are ignored and the
    /// previous selection stays.
    pub fn select(&mut self, id: LocationId) -> bool {
        if self.options.iter().any(|l| l.id == id) {
            self.selected = Some(id);
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&Location> {
        self.selected
            .and_then(|id| self.options.iter().find(|l| l.id == id))
    }

    /// Create a location remotely and select it in one step.
    pub fn create_and_select(
        &mut self,
        remote: &dyn RemoteInventory,
        name: &str,
    ) -> Result<Location, RemoteError> {
        let created = remote.create_location(name)?;
        self.options.push(created.clone());
        self.selected = Some(created.id);
        tracing::debug!(location = %created.id, "Created and selected location {:?}", name);
        Ok(created)
    }
}

/// Category choice state for an in-progress item edit.
#[derive(Debug, Clone, Default)]
pub struct CategoryPicker {
    options: Vec<Category>,
    selected: Option<CategoryId>,
}

impl CategoryPicker {
    pub fn new(options: Vec<Category>) -> Self {
        Self {
            options,
            selected: None,
        }
    }

    pub fn options(&self) -> &[Category] {
        &self.options
    }

    pub fn select(&mut self, id: CategoryId) -> bool {
        if self.options.iter().any(|c| c.id == id) {
            self.selected = Some(id);
            true
        } else {
            false
        }
    }

    pub fn selected(&self) -> Option<&Category> {
        self.selected
            .and_then(|id| self.options.iter().find(|c| c.id == id))
    }

    /// Create a custom category remotely and select it in one step.
    /// A `DuplicateName` answer is user-correctable: retry with another
    /// name, prior selection intact.
    pub fn create_and_select(
        &mut self,
        remote: &dyn RemoteInventory,
        name: &str,
    ) -> Result<Category, RemoteError> {
        let created = remote.create_category(name)?;
        self.options.push(created.clone());
        self.selected = Some(created.id);
        tracing::debug!(category = %created.id, "Created and selected category {:?}", name);
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::StoreRemote;
    use std::sync::Arc;
    use stow_core::{EntityStore, MemoryEntityStore};
    use uuid::Uuid;

    fn remote() -> (Arc<MemoryEntityStore>, StoreRemote) {
        let store = Arc::new(MemoryEntityStore::new());
        let owner = Uuid::new_v4();
        (store.clone(), StoreRemote::new(store, owner))
    }

    #[test]
    fn create_and_select_location() {
        let (_store, remote) = remote();
        let mut picker = LocationPicker::new(Vec::new());
        assert!(picker.selected().is_none());

        let created_id = picker.create_and_select(&remote, "Garage").unwrap().id;
        assert_eq!(picker.selected().map(|l| l.id), Some(created_id));
        assert_eq!(picker.options().len(), 1);
    }

    #[test]
    fn failed_create_keeps_prior_selection() {
        let (_store, remote) = remote();
        let mut picker = LocationPicker::new(Vec::new());

        let first = picker.create_and_select(&remote, "Garage").unwrap().id;

        // Same name again: the store answers DuplicateName.
        let err = picker.create_and_select(&remote, "Garage").unwrap_err();
        assert!(matches!(err, RemoteError::DuplicateName { .. }));

        assert_eq!(picker.selected().map(|l| l.id), Some(first));
        assert_eq!(picker.options().len(), 1);
    }

    #[test]
    fn select_rejects_unknown_ids() {
        let (store, remote) = remote();
        let garage = store.create_location("Garage").unwrap();
        let mut picker = LocationPicker::new(remote.fetch_locations().unwrap());

        assert!(picker.select(garage.id));
        assert!(!picker.select(Uuid::new_v4()));
        assert_eq!(picker.selected().map(|l| l.id), Some(garage.id));
    }

    #[test]
    fn category_picker_duplicate_is_correctable() {
        let (_store, remote) = remote();
        let mut picker = CategoryPicker::new(Vec::new());

        picker.create_and_select(&remote, "Tools").unwrap();
        let err = picker.create_and_select(&remote, "Tools").unwrap_err();
        assert!(err.to_string().contains("already exists"));

        // Retry with a corrected name succeeds and moves the selection.
        let fixed = picker.create_and_select(&remote, "Power Tools").unwrap().id;
        assert_eq!(picker.selected().map(|c| c.id), Some(fixed));
        assert_eq!(picker.options().len(), 2);
    }
}
