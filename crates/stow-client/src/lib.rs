//! stow-client: the session layer a rendering surface talks to.
//!
//! Holds the caller's cached item/location/category collections, runs
//! the board engine over them, and reconciles confirmed remote updates
//! back into the cache. Local state only changes after the remote store
//! acknowledges a write (apply-after-confirm).

pub mod picker;
pub mod remote;
pub mod session;

pub use picker::*;
pub use remote::*;
pub use session::*;
