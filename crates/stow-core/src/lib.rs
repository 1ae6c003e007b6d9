//! stow-core: Entity model, authorization, and store protocol.
//!
//! Inventory data is owned per user: items and custom categories belong
//! to exactly one owner, while default categories and all locations are
//! system-wide. The `EntityStore` trait is the durable boundary; the
//! in-memory backend serves tests and the SQLite backend (feature
//! `sqlite`) serves real deployments.

pub mod access;
pub mod bootstrap;
pub mod entity;
pub mod memory_store;
pub mod store;
pub mod validate;

#[cfg(feature = "sqlite")]
pub mod sqlite_store;

pub use access::*;
pub use bootstrap::*;
pub use entity::*;
pub use memory_store::MemoryEntityStore;
pub use store::*;
pub use validate::*;

#[cfg(feature = "sqlite")]
pub use sqlite_store::SqliteEntityStore;
