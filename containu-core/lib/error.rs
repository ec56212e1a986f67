use thiserror::Error;
use uuid::Uuid;

use crate::models::{ContainerStatus, ResourceKind};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The result of a containu-related operation.
pub type ContainuResult<T> = Result<T, ContainuError>;

/// An error that occurred during a containu operation.
#[derive(pretty_error_debug::Debug, Error)]
pub enum ContainuError {
    /// The operation referenced an id absent from the store.
    #[error("not found: {kind} {id}")]
    NotFound {
        /// The kind of resource that was looked up
        kind: ResourceKind,

        /// The id that was looked up
        id: Uuid,
    },

    /// A container with the same name already exists.
    #[error("duplicate name: a container named '{0}' already exists")]
    DuplicateName(String),

    /// The container's current status does not permit the operation.
    #[error("cannot {action} '{name}' while it is {status}")]
    InvalidTransition {
        /// The name of the container
        name: String,

        /// The status the container was in
        status: ContainerStatus,

        /// The operation that was attempted
        action: &'static str,
    },

    /// The simulated backend rejected the operation.
    #[error("failed to {action} '{name}'")]
    OperationFailed {
        /// The name of the container
        name: String,

        /// The operation that failed
        action: &'static str,
    },

    /// A command was sent to a container that is not running.
    #[error("container '{0}' is not running")]
    NotRunning(String),

    /// Built-in networks cannot be removed.
    #[error("network '{0}' is built in and cannot be removed")]
    BuiltinNetwork(String),

    /// The batch was cancelled before this unit was launched.
    #[error("cancelled before it was started")]
    Cancelled,

    /// A batch unit panicked while running.
    #[error("task panicked: {0}")]
    TaskPanicked(String),

    /// A lock guarding shared state was poisoned by a panic.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl ContainuError {
    /// Creates a [`ContainuError::NotFound`] for a container id.
    pub fn container_not_found(id: Uuid) -> Self {
        Self::NotFound {
            kind: ResourceKind::Container,
            id,
        }
    }

    /// Returns `true` if the error is a [`ContainuError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
