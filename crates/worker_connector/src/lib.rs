//! # Worker Connector - Connection & Load-Balancing Bootstrap
//!
//! Bootstrap and lifecycle control for a simulation worker joining a
//! spatially-partitioned simulation. The crate decides *how* a worker
//! connects (based on its execution context), drives the single asynchronous
//! connect attempt, and once connected registers the worker's subsystems and
//! installs the load-balancing partition scheme.
//!
//! ## Design Philosophy
//!
//! The connector contains **no simulation logic** and **no wire format**. It
//! talks to the outside world through narrow seams:
//!
//! * [`Transport`] - performs the receptionist handshake (the external SDK)
//! * [`WorkerSession`] - the live session, exposing a [`Scheduler`] and a
//!   [`PartitionInstaller`]
//! * [`FlowInitializer`] / [`ParameterInitializer`] - externally supplied
//!   customization for headless deployments
//!
//! ## Bootstrap Flow
//!
//! 1. [`ConnectionFlowSelector`] consults [`SecurityPolicy`] and the
//!    [`ExecutionContext`] and produces a `(ConnectionFlow, ConnectionParameters)` pair
//! 2. [`ConnectionOrchestrator`] runs exactly one connect attempt
//! 3. On success, [`WorkerBootstrapper`] registers subsystems and installs the
//!    partition scheme built by [`PartitionConfiguration`]
//! 4. [`LifecycleManager`] owns the session until an explicit shutdown
//!
//! [`WorkerConnector`] composes the four steps:
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # use worker_connector::*;
//! # async fn example(transport: Arc<dyn Transport>, recipe: LoadBalancingRecipe, sets: ComponentSetRegistry) -> Result<(), BootstrapError> {
//! let selector = ConnectionFlowSelector::new("UnityGameLogic");
//! let bootstrapper = WorkerBootstrapper::new(recipe, sets)
//!     .with_unit(Arc::new(NamedSubsystem::new("CubeMovementSystem")));
//! let mut connector = WorkerConnector::new(selector, ConnectionOrchestrator::new(transport), bootstrapper);
//!
//! connector.start(ExecutionContext::Interactive).await?;
//! // ... run until asked to stop ...
//! connector.shutdown().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! * **Connection errors** are values ([`ConnectionResult::Failed`]) and are
//!   never retried here
//! * **Configuration errors** ([`ConfigurationError`]) are fatal: the session
//!   is torn down instead of being left half-configured

pub use bootstrap::{BootstrapReport, WorkerBootstrapper};
pub use connector::WorkerConnector;
pub use error::{BootstrapError, ConfigurationError, ConnectFailure, InstallError, LifecycleError};
pub use flow::{ConnectionFlow, ReceptionistSettings, DEFAULT_RECEPTIONIST_HOST, DEFAULT_RECEPTIONIST_PORT};
pub use identity::WorkerIdentity;
pub use initializer::{FlowInitializer, NoCustomization, ParameterInitializer};
pub use lifecycle::{AuxiliaryResource, LifecycleManager, LifecycleState};
pub use orchestrator::{ConnectionOrchestrator, ConnectionResult};
pub use parameters::{ChannelSettings, ConnectionParameters, LinkProtocol, NetworkParameters, DEFAULT_CONNECTION_TIMEOUT};
pub use partition::{
    ComponentId, ComponentSet, ComponentSetRegistry, EntityId, EntityLoadBalancingMap,
    PartitionConfiguration, PartitionInstaller, PartitionScheme, SINGLETON_ANCHOR,
};
pub use recipe::{ClientLoadBalancing, EntityOverride, LoadBalancingRecipe};
pub use scheduler::{LocalScheduler, NamedSubsystem, Scheduler, SchedulerError, Subsystem, SubsystemHandle, SubsystemRegistry};
pub use security::{ExecutionContext, SecurityMode, SecurityPolicy};
pub use selector::ConnectionFlowSelector;
pub use session::{Transport, WorkerSession};

pub mod bootstrap;
pub mod connector;
pub mod error;
pub mod flow;
pub mod identity;
pub mod initializer;
pub mod lifecycle;
pub mod orchestrator;
pub mod parameters;
pub mod partition;
pub mod recipe;
pub mod scheduler;
pub mod security;
pub mod selector;
pub mod session;

#[cfg(test)]
mod test_support;
