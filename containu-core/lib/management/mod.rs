//! Operations over the resource store.
//!
//! This module provides:
//! - [`LifecycleService`]: one simulated round trip per create, start, stop, restart or delete
//! - [`BatchCoordinator`]: concurrent fan-out of an operation over many containers
//! - [`StreamEmitter`]: cancellable live streams of logs and usage samples
//! - [`ResourceLocks`]: the per-id locks that keep operations on one container in order

mod batch;
mod lifecycle;
mod locks;
mod stream;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use batch::*;
pub use lifecycle::*;
pub use locks::*;
pub use stream::*;
