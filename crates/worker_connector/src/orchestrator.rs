//! Asynchronous connect attempt.

use crate::error::ConnectFailure;
use crate::flow::ConnectionFlow;
use crate::parameters::ConnectionParameters;
use crate::session::{Transport, WorkerSession};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Outcome of a connect attempt. Both variants are terminal.
pub enum ConnectionResult {
    Established(Box<dyn WorkerSession>),
    Failed(ConnectFailure),
}

impl ConnectionResult {
    pub fn is_established(&self) -> bool {
        matches!(self, ConnectionResult::Established(_))
    }

    /// Converts into a `Result`, which is handier with `?`.
    pub fn into_result(self) -> Result<Box<dyn WorkerSession>, ConnectFailure> {
        match self {
            ConnectionResult::Established(session) => Ok(session),
            ConnectionResult::Failed(reason) => Err(reason),
        }
    }
}

impl fmt::Debug for ConnectionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionResult::Established(session) => {
                f.debug_tuple("Established").field(&session.worker_id()).finish()
            }
            ConnectionResult::Failed(reason) => f.debug_tuple("Failed").field(reason).finish(),
        }
    }
}

/// Drives a single connect attempt through a [`Transport`].
#[derive(Clone)]
pub struct ConnectionOrchestrator {
    transport: Arc<dyn Transport>,
}

impl ConnectionOrchestrator {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Runs exactly one connect attempt.
    ///
    /// The attempt is bounded by `parameters.network.connection_timeout`.
    /// Failures are returned as [`ConnectionResult::Failed`] and never retried.
    pub async fn connect(&self, flow: ConnectionFlow, parameters: ConnectionParameters) -> ConnectionResult {
        let timeout = parameters.network.connection_timeout;
        info!(
            "🔌 Connecting worker {} via {} flow (timeout {} ms)",
            parameters.worker_id(),
            flow.name(),
            timeout_millis(timeout)
        );

        let attempt = match &flow {
            ConnectionFlow::Receptionist(settings) => self.transport.connect_receptionist(settings, &parameters),
        };

        let outcome = match tokio::time::timeout(timeout, attempt).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ConnectFailure::Timeout(timeout_millis(timeout))),
        };

        match outcome {
            Ok(session) => {
                info!("✅ Worker {} connected", session.worker_id());
                ConnectionResult::Established(session)
            }
            Err(reason) => {
                warn!("❌ Worker {} failed to connect: {}", parameters.worker_id(), reason);
                ConnectionResult::Failed(reason)
            }
        }
    }
}

/// Whole milliseconds in `timeout`, saturating at `u64::MAX`.
fn timeout_millis(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::ExecutionContext;
    use crate::selector::ConnectionFlowSelector;
    use crate::test_support::{LocalTransport, TransportBehavior};

    #[tokio::test]
    async fn test_successful_connect() {
        let transport = Arc::new(LocalTransport::new(TransportBehavior::Accept));
        let orchestrator = ConnectionOrchestrator::new(transport.clone());
        let (flow, parameters) = ConnectionFlowSelector::new("UnityGameLogic").select(ExecutionContext::Interactive);
        let worker_id = parameters.worker_id();

        let result = orchestrator.connect(flow, parameters).await;

        assert!(result.is_established());
        assert_eq!(result.into_result().unwrap().worker_id(), worker_id);
        assert_eq!(transport.attempts(), 1);
    }

    #[tokio::test]
    async fn test_failure_is_not_retried() {
        let failure = ConnectFailure::DiscoveryFailed("no receptionist".to_string());
        let transport = Arc::new(LocalTransport::new(TransportBehavior::Fail(failure.clone())));
        let orchestrator = ConnectionOrchestrator::new(transport.clone());
        let (flow, parameters) = ConnectionFlowSelector::new("UnityGameLogic").select(ExecutionContext::Interactive);

        let result = orchestrator.connect(flow, parameters).await;

        assert_eq!(result.into_result().err(), Some(failure));
        assert_eq!(transport.attempts(), 1);
    }

    #[tokio::test]
    async fn test_hanging_handshake_times_out() {
        let transport = Arc::new(LocalTransport::new(TransportBehavior::Hang));
        let orchestrator = ConnectionOrchestrator::new(transport.clone());
        let selector = ConnectionFlowSelector::new("UnityGameLogic").with_parameter_initializer(
            |parameters: &mut ConnectionParameters| {
                parameters.network.connection_timeout = Duration::from_millis(25);
                None
            },
        );
        let (flow, parameters) = selector.select(ExecutionContext::Headless);

        let result = orchestrator.connect(flow, parameters).await;

        assert_eq!(result.into_result().err(), Some(ConnectFailure::Timeout(25)));
        assert_eq!(transport.attempts(), 1);
    }

    #[test]
    fn test_timeout_millis_saturates() {
        assert_eq!(timeout_millis(Duration::from_millis(25)), 25);
        assert_eq!(timeout_millis(Duration::MAX), u64::MAX);
    }
}
