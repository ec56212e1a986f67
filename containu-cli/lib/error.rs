use containu_core::ContainuError;
use thiserror::Error;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The result of a containu-cli operation.
pub type ContainuCliResult<T> = Result<T, ContainuCliError>;

/// An error that occurred while running a containu command.
#[derive(pretty_error_debug::Debug, Error)]
pub enum ContainuCliError {
    /// An error from the lifecycle layer.
    #[error(transparent)]
    Core(#[from] ContainuError),

    /// An I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Output could not be serialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// No resource matched the given name or id.
    #[error("no {kind} matches '{name}'")]
    UnknownResource {
        /// The kind of resource that was looked up
        kind: &'static str,

        /// The name or id that was looked up
        name: String,
    },

    /// An argument could not be interpreted.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// At least one unit of a batch failed.
    #[error("{0}")]
    BatchFailed(String),
}
