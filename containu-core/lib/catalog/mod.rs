//! Demo content used to seed the store.
//!
//! The core never depends on the behavior of its content provider: seed resources become the
//! initial state, message pools become filler for log streams and backfills, and shell outputs
//! answer `exec` calls.

mod demo;

use crate::models::{Container, ContainerImage, LogLevel, Network, Volume};

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use demo::*;

//--------------------------------------------------------------------------------------------------
// Traits
//--------------------------------------------------------------------------------------------------

/// A source of initial state and filler data.
pub trait ContentProvider: Send + Sync {
    /// Containers present at startup.
    fn containers(&self) -> Vec<Container>;

    /// Images present at startup.
    fn images(&self) -> Vec<ContainerImage>;

    /// Networks present at startup.
    fn networks(&self) -> Vec<Network>;

    /// Volumes present at startup.
    fn volumes(&self) -> Vec<Volume>;

    /// Messages used to backfill an empty log buffer.
    fn backlog_messages(&self) -> Vec<(String, LogLevel)>;

    /// Messages a live log stream draws from.
    fn stream_messages(&self) -> Vec<String>;

    /// Output of a shell command run inside a container.
    fn shell_output(&self, command: &str) -> String;
}
