//! Ownership and teardown of the connected worker.
//!
//! The lifecycle follows a fixed state machine:
//!
//! ```text
//! Unstarted -> Connecting -> Connected -> ShuttingDown -> Terminated
//!                        \-> ConnectFailed -> Terminated
//! ```
//!
//! There is no way back from `Terminated`; retrying requires a new manager.

use crate::error::{ConnectFailure, LifecycleError};
use crate::session::WorkerSession;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    Unstarted,
    Connecting,
    Connected,
    ConnectFailed,
    ShuttingDown,
    Terminated,
}

/// A locally created resource that must be released before the session goes away.
pub trait AuxiliaryResource: Send {
    fn name(&self) -> &str;

    fn release(&mut self) -> Result<(), String>;
}

/// Owns the live session and its auxiliary resources until shutdown.
pub struct LifecycleManager {
    state: LifecycleState,
    session: Option<Box<dyn WorkerSession>>,
    auxiliaries: Vec<Box<dyn AuxiliaryResource>>,
    failure: Option<ConnectFailure>,
}

impl Default for LifecycleManager {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleManager {
    pub fn new() -> Self {
        Self {
            state: LifecycleState::Unstarted,
            session: None,
            auxiliaries: Vec::new(),
            failure: None,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == LifecycleState::Connected
    }

    pub fn session(&self) -> Option<&dyn WorkerSession> {
        self.session.as_deref()
    }

    /// The failure recorded by [`LifecycleManager::connection_failed`], if any.
    pub fn failure(&self) -> Option<&ConnectFailure> {
        self.failure.as_ref()
    }

    pub fn auxiliary_count(&self) -> usize {
        self.auxiliaries.len()
    }

    fn transition(&mut self, expected: LifecycleState, to: LifecycleState) -> Result<(), LifecycleError> {
        if self.state != expected {
            return Err(LifecycleError::InvalidTransition { from: self.state, to });
        }
        debug!("Lifecycle {:?} -> {:?}", self.state, to);
        self.state = to;
        Ok(())
    }

    /// `Unstarted -> Connecting`.
    pub fn begin_connecting(&mut self) -> Result<(), LifecycleError> {
        self.transition(LifecycleState::Unstarted, LifecycleState::Connecting)
    }

    /// `Connecting -> Connected`; takes ownership of `session`.
    pub fn connection_established(&mut self, session: Box<dyn WorkerSession>) -> Result<(), LifecycleError> {
        self.transition(LifecycleState::Connecting, LifecycleState::Connected)?;
        self.session = Some(session);
        Ok(())
    }

    /// `Connecting -> ConnectFailed`.
    pub fn connection_failed(&mut self, reason: ConnectFailure) -> Result<(), LifecycleError> {
        self.transition(LifecycleState::Connecting, LifecycleState::ConnectFailed)?;
        self.failure = Some(reason);
        Ok(())
    }

    /// Hands an auxiliary resource to the manager. Only valid while connected.
    pub fn attach(&mut self, resource: Box<dyn AuxiliaryResource>) -> Result<(), LifecycleError> {
        if self.state != LifecycleState::Connected {
            return Err(LifecycleError::NotConnected(self.state));
        }
        debug!("Attached auxiliary resource {}", resource.name());
        self.auxiliaries.push(resource);
        Ok(())
    }

    /// Releases everything the manager owns.
    ///
    /// Auxiliary resources are released in reverse attach order, then the
    /// session is disconnected. Calling this on a manager that never
    /// connected, or calling it twice, does nothing. A failed connection is
    /// moved to `Terminated` without touching any session.
    pub async fn shutdown(&mut self) {
        match self.state {
            LifecycleState::Connected => {}
            LifecycleState::ConnectFailed => {
                self.state = LifecycleState::Terminated;
                debug!("Lifecycle ConnectFailed -> Terminated");
                return;
            }
            LifecycleState::Connecting => {
                warn!("Shutdown requested while connecting; the attempt is abandoned by dropping it");
                return;
            }
            LifecycleState::Unstarted | LifecycleState::ShuttingDown | LifecycleState::Terminated => return,
        }

        self.state = LifecycleState::ShuttingDown;
        info!("🛑 Shutting down worker");

        while let Some(mut resource) = self.auxiliaries.pop() {
            match resource.release() {
                Ok(()) => debug!("Released auxiliary resource {}", resource.name()),
                Err(e) => warn!("⚠️ Failed to release auxiliary resource {}: {}", resource.name(), e),
            }
        }

        if let Some(mut session) = self.session.take() {
            let worker_id = session.worker_id().to_string();
            session.disconnect().await;
            info!("👋 Worker {} disconnected", worker_id);
        }

        self.state = LifecycleState::Terminated;
    }
}

impl Drop for LifecycleManager {
    fn drop(&mut self) {
        if self.session.is_some() {
            warn!("LifecycleManager dropped while still connected; call shutdown() to disconnect cleanly");
        }
    }
}
