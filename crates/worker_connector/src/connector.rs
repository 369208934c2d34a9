//! The full connect-and-bootstrap sequence.

use crate::bootstrap::{BootstrapReport, WorkerBootstrapper};
use crate::error::{BootstrapError, LifecycleError};
use crate::lifecycle::{AuxiliaryResource, LifecycleManager, LifecycleState};
use crate::orchestrator::{ConnectionOrchestrator, ConnectionResult};
use crate::security::ExecutionContext;
use crate::selector::ConnectionFlowSelector;
use tracing::{error, info};

/// Connects a worker and bootstraps it.
///
/// A connector starts at most once. When bootstrap fails after the connection
/// was established, the session is shut down before the error is returned.
pub struct WorkerConnector {
    selector: ConnectionFlowSelector,
    orchestrator: ConnectionOrchestrator,
    bootstrapper: WorkerBootstrapper,
    lifecycle: LifecycleManager,
}

impl WorkerConnector {
    pub fn new(
        selector: ConnectionFlowSelector,
        orchestrator: ConnectionOrchestrator,
        bootstrapper: WorkerBootstrapper,
    ) -> Self {
        Self {
            selector,
            orchestrator,
            bootstrapper,
            lifecycle: LifecycleManager::new(),
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    pub fn lifecycle(&self) -> &LifecycleManager {
        &self.lifecycle
    }

    /// Selects a flow for `context`, connects and bootstraps the worker.
    pub async fn start(&mut self, context: ExecutionContext) -> Result<BootstrapReport, BootstrapError> {
        self.lifecycle.begin_connecting().map_err(|e| match e {
            LifecycleError::InvalidTransition { .. } => BootstrapError::AlreadyStarted,
            other => BootstrapError::Lifecycle(other),
        })?;

        let (flow, parameters) = self.selector.select(context);
        info!("🚀 Starting {} worker ({} context)", self.selector.worker_type(), context);

        let session = match self.orchestrator.connect(flow, parameters).await {
            ConnectionResult::Established(session) => session,
            ConnectionResult::Failed(reason) => {
                self.lifecycle.connection_failed(reason.clone())?;
                self.lifecycle.shutdown().await;
                return Err(BootstrapError::Connect(reason));
            }
        };

        self.lifecycle.connection_established(session)?;

        let outcome = match self.lifecycle.session() {
            Some(session) => self.bootstrapper.on_connected(session).await,
            None => Err(BootstrapError::Lifecycle(LifecycleError::NotConnected(self.lifecycle.state()))),
        };

        match outcome {
            Ok(report) => {
                info!(
                    "✅ Worker ready: {} subsystems registered, load balancing installed",
                    report.subsystems.len()
                );
                Ok(report)
            }
            Err(e) => {
                error!("❌ Bootstrap failed, tearing down session: {}", e);
                self.lifecycle.shutdown().await;
                Err(e)
            }
        }
    }

    /// Attaches an auxiliary resource to the running worker.
    pub fn attach(&mut self, resource: Box<dyn AuxiliaryResource>) -> Result<(), LifecycleError> {
        self.lifecycle.attach(resource)
    }

    /// Shuts the worker down. Safe to call in any state.
    pub async fn shutdown(&mut self) {
        self.lifecycle.shutdown().await;
    }
}
