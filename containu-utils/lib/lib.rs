//! `containu-utils` is a library containing general utilities for the containu project.

#![warn(missing_docs)]

pub mod defaults;
pub mod env;
pub mod term;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use defaults::*;
pub use env::*;
pub use term::*;
