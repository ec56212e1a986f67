//! Derivations of what the UI should display.
//!
//! Nothing here mutates the store. [`visible`] and friends are pure functions over snapshot data;
//! [`Selection`] is plain state that the store carries so deletions can prune it.

mod filter;
mod selection;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use filter::*;
pub use selection::*;
