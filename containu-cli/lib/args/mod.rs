//! Command line arguments.

mod containu;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use containu::*;
