//! stow-board: Grouping and move-resolution engine.
//!
//! Pure and stateless: callers pass their item and location collections
//! in, the engine hands a derived board back. Nothing here touches a
//! store or holds hidden shared state.

pub mod board;
pub mod resolve;

pub use board::*;
pub use resolve::*;
