//! Error types for the worker bootstrap sequence.
//!
//! Errors are split by the layer that raises them so callers can tell a
//! recoverable connection problem (reported as a value, never retried here)
//! from a fatal configuration problem.

use crate::lifecycle::LifecycleState;
use crate::partition::EntityId;

/// Classified reason for a failed connection attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectFailure {
    /// The handshake did not complete within the configured timeout
    #[error("Connection attempt timed out after {0} ms")]
    Timeout(u64),

    /// The receptionist endpoint could not be found or reached
    #[error("Receptionist discovery failed: {0}")]
    DiscoveryFailed(String),

    /// The backend refused the worker's credentials or security settings
    #[error("Credentials rejected: {0}")]
    CredentialsRejected(String),

    /// The backend answered with something that is not a valid handshake reply
    #[error("Malformed handshake response: {0}")]
    MalformedResponse(String),

    /// Any other transport-level failure
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Fatal configuration errors raised while bootstrapping a connected worker.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Singleton load balancing already set for anchor entity {0}")]
    DuplicateSingleton(EntityId),

    #[error("Unknown component set: {0}")]
    UnknownComponentSet(String),

    #[error("Partition scheme already installed for anchor entity {0}")]
    AlreadyInstalled(EntityId),

    #[error("No singleton load balancing configured")]
    MissingSingleton,

    #[error("Worker has already been bootstrapped")]
    AlreadyBootstrapped,

    #[error("Failed to register subsystem {unit}: {reason}")]
    Registration { unit: String, reason: String },
}

/// Errors reported by an external partitioning subsystem.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InstallError {
    #[error("Partition scheme already installed for anchor entity {0}")]
    AlreadyInstalled(EntityId),

    #[error("Load balancing subsystem unreachable: {0}")]
    Unreachable(String),
}

/// Invalid use of the worker lifecycle state machine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("Invalid lifecycle transition from {from:?} to {to:?}")]
    InvalidTransition { from: LifecycleState, to: LifecycleState },

    #[error("Auxiliary resources can only be attached while connected (current state: {0:?})")]
    NotConnected(LifecycleState),
}

/// Top-level error returned by [`crate::WorkerConnector::start`].
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("Connection failed: {0}")]
    Connect(#[from] ConnectFailure),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    #[error("Worker connector has already been started")]
    AlreadyStarted,
}

impl From<InstallError> for BootstrapError {
    fn from(err: InstallError) -> Self {
        match err {
            InstallError::AlreadyInstalled(anchor) => {
                BootstrapError::Configuration(ConfigurationError::AlreadyInstalled(anchor))
            }
            // Treated as a connection-class failure; no retry policy is applied here.
            InstallError::Unreachable(reason) => BootstrapError::Connect(ConnectFailure::Transport(reason)),
        }
    }
}

impl BootstrapError {
    /// Returns true when the failure came from the connection layer.
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, BootstrapError::Connect(_))
    }
}
