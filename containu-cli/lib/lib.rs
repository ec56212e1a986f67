//! `containu-cli` provides the argument parsing, styling and errors of the `containu` binary.

#![warn(missing_docs)]

mod error;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub mod args;
pub mod styles;

pub use args::*;
pub use error::*;
pub use styles::*;
