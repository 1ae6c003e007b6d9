//! Partitioning a flat item collection into location columns.

use std::collections::HashMap;

use stow_core::{Item, Location, LocationId};

/// One location column and the items assigned to it, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub location: Location,
    pub items: Vec<Item>,
}

/// The derived presentation of a user's inventory: columns in display
/// order (default location first, the rest case-insensitively by name).
///
/// Rebuilt from scratch on every render; nothing here is persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    pub columns: Vec<Column>,
}

/// Display order for containers: the default first, then the rest
/// case-insensitively by name.
pub fn sort_containers(locations: &[Location]) -> Vec<Location> {
    let mut sorted = locations.to_vec();
    sorted.sort_by(|a, b| {
        b.is_default
            .cmp(&a.is_default)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
    sorted
}

/// Partition items by location, keyed by container id.
///
/// An item with no location, or one whose location no longer exists,
/// lands in the default container's bucket (tolerant read, not an
/// error). Input order is preserved within each bucket: it reflects the
/// last server-returned order, the only ordering the data carries.
pub fn group_by_location(
    items: &[Item],
    containers: &[Location],
) -> HashMap<LocationId, Vec<Item>> {
    let mut buckets: HashMap<LocationId, Vec<Item>> = HashMap::new();
    let Some(fallback) = fallback_container(containers) else {
        return buckets;
    };

    for item in items {
        let key = item
            .location
            .filter(|id| containers.iter().any(|c| c.id == *id))
            .unwrap_or(fallback.id);
        buckets.entry(key).or_default().push(item.clone());
    }
    buckets
}

/// The container absent assignments fall back to: the one flagged
/// default, or failing that the first in the list.
pub fn fallback_container(containers: &[Location]) -> Option<&Location> {
    containers
        .iter()
        .find(|c| c.is_default)
        .or_else(|| containers.first())
}

impl Board {
    /// Build the board for a set of items and containers.
    ///
    /// With no containers at all the board is empty; bootstrap
    /// guarantees real deployments always have the default location.
    pub fn build(items: &[Item], containers: &[Location]) -> Self {
        let mut buckets = group_by_location(items, containers);
        let columns = sort_containers(containers)
            .into_iter()
            .map(|location| Column {
                items: buckets.remove(&location.id).unwrap_or_default(),
                location,
            })
            .collect();
        Self { columns }
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column(&self, id: LocationId) -> Option<&Column> {
        self.columns.iter().find(|c| c.location.id == id)
    }

    pub fn column_index(&self, id: LocationId) -> Option<usize> {
        self.columns.iter().position(|c| c.location.id == id)
    }

    /// The column an item is explicitly assigned to, when that column
    /// is on the board. None for unassigned items and for dangling
    /// references.
    pub fn assigned_column(&self, item: &Item) -> Option<LocationId> {
        item.location.filter(|id| self.column(*id).is_some())
    }

    /// The column absent assignments are displayed in: the default
    /// column, or the first one when no default exists.
    pub fn fallback_column(&self) -> Option<LocationId> {
        self.columns
            .iter()
            .find(|c| c.location.is_default)
            .or_else(|| self.columns.first())
            .map(|c| c.location.id)
    }

    /// The container an item currently sits in: its own assignment when
    /// that column exists, the fallback column otherwise.
    pub fn effective_location(&self, item: &Item) -> Option<LocationId> {
        self.assigned_column(item).or_else(|| self.fallback_column())
    }

    /// The nearest column other than `from`, walking forward through
    /// the display order first, then backward. None when `from` is the
    /// only column (or is not on the board).
    pub fn nearest_other_column(&self, from: LocationId) -> Option<LocationId> {
        let idx = self.column_index(from)?;
        self.columns[idx + 1..]
            .iter()
            .chain(self.columns[..idx].iter().rev())
            .map(|c| c.location.id)
            .next()
    }
}
