//! System bootstrap: the default category set and the single default
//! location. Safe to run on every startup; existing entities are left
//! alone.

use serde::Deserialize;

use crate::store::{EntityStore, StoreError};

/// Categories every fresh deployment starts with.
pub const DEFAULT_CATEGORIES: &[&str] =
    &["Electronic", "Food", "Beverage", "Games/Toys", "Clothing"];

/// Name of the catch-all location items fall back to.
pub const DEFAULT_LOCATION: &str = "Unassigned";

/// Bootstrap configuration, overridable from a TOML file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    pub default_categories: Vec<String>,
    pub default_location: String,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            default_categories: DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect(),
            default_location: DEFAULT_LOCATION.to_string(),
        }
    }
}

impl BootstrapConfig {
    /// Parse a TOML override. Missing keys keep their defaults.
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Load from `<config dir>/stow/bootstrap.toml`, falling back to the
    /// built-in defaults when the file is absent or unreadable.
    pub fn load() -> Self {
        let Some(path) = dirs::config_dir().map(|d| d.join("stow").join("bootstrap.toml")) else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(contents) => match Self::from_toml(&contents) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to parse {:?}: {}, using builtin defaults", path, e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}

/// Create the default categories and the default location if they do
/// not exist yet. Idempotent: duplicate-name answers mean an earlier
/// bootstrap already ran.
pub fn ensure_defaults(
    store: &dyn EntityStore,
    config: &BootstrapConfig,
) -> Result<(), StoreError> {
    tracing::info!("Starting default entity initialization");

    for name in &config.default_categories {
        match store.create_default_category(name) {
            Ok(_) => tracing::info!("Created default category: {}", name),
            Err(StoreError::DuplicateName { .. }) => {
                tracing::debug!("Default category already exists: {}", name);
            }
            Err(e) => return Err(e),
        }
    }

    // Exactly one default location may exist. Renaming
    // `default_location` in the config after an earlier bootstrap must
    // not create a second one, so check for any default first.
    match store.locations()?.into_iter().find(|l| l.is_default) {
        Some(existing) => {
            tracing::debug!("Default location already exists: {}", existing.name);
        }
        None => match store.create_default_location(&config.default_location) {
            Ok(_) => tracing::info!("Created default location: {}", config.default_location),
            Err(StoreError::DuplicateName { .. }) => {
                tracing::debug!(
                    "Default location already exists: {}",
                    config.default_location
                );
            }
            Err(e) => return Err(e),
        },
    }

    tracing::info!("Default entity initialization completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_store::MemoryEntityStore;
    use uuid::Uuid;

    #[test]
    fn bootstrap_creates_defaults() {
        let store = MemoryEntityStore::new();
        ensure_defaults(&store, &BootstrapConfig::default()).unwrap();

        let categories = store.categories_for(Uuid::new_v4()).unwrap();
        assert_eq!(categories.len(), DEFAULT_CATEGORIES.len());
        assert!(categories.iter().all(|c| c.is_default));

        let locations = store.locations().unwrap();
        assert_eq!(locations.len(), 1);
        assert!(locations[0].is_default);
        assert_eq!(locations[0].name, DEFAULT_LOCATION);
    }

    #[test]
    fn bootstrap_is_idempotent() {
        let store = MemoryEntityStore::new();
        let config = BootstrapConfig::default();
        ensure_defaults(&store, &config).unwrap();
        ensure_defaults(&store, &config).unwrap();

        assert_eq!(
            store.categories_for(Uuid::new_v4()).unwrap().len(),
            DEFAULT_CATEGORIES.len()
        );
        assert_eq!(store.locations().unwrap().len(), 1);
    }

    #[test]
    fn renamed_default_location_does_not_add_a_second_default() {
        let store = MemoryEntityStore::new();
        ensure_defaults(&store, &BootstrapConfig::default()).unwrap();

        let renamed = BootstrapConfig {
            default_location: "Inbox".into(),
            ..BootstrapConfig::default()
        };
        ensure_defaults(&store, &renamed).unwrap();

        let locations = store.locations().unwrap();
        assert_eq!(locations.len(), 1);
        assert!(locations[0].is_default);
        assert_eq!(locations[0].name, DEFAULT_LOCATION);
    }

    #[test]
    fn config_from_toml_overrides_defaults() {
        let config = BootstrapConfig::from_toml(
            r#"
            default_categories = ["Hardware", "Consumables"]
            default_location = "Backlog"
            "#,
        )
        .unwrap();
        assert_eq!(config.default_categories, vec!["Hardware", "Consumables"]);
        assert_eq!(config.default_location, "Backlog");
    }

    #[test]
    fn partial_toml_keeps_builtin_values() {
        let config = BootstrapConfig::from_toml(r#"default_location = "Inbox""#).unwrap();
        assert_eq!(config.default_location, "Inbox");
        assert_eq!(config.default_categories.len(), DEFAULT_CATEGORIES.len());
    }
}
