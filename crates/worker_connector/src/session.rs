//! Seams to the external connection SDK.
//!
//! The connector never speaks the backend protocol itself. A [`Transport`]
//! performs the handshake and yields a [`WorkerSession`], which in turn exposes
//! the session-owned capabilities the bootstrapper needs.

use crate::error::ConnectFailure;
use crate::flow::ReceptionistSettings;
use crate::parameters::ConnectionParameters;
use crate::partition::PartitionInstaller;
use crate::scheduler::Scheduler;
use async_trait::async_trait;

/// Performs connection handshakes against the backend.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Connects to the receptionist described by `settings`.
    ///
    /// Implementations make a single attempt; retries are not expected.
    async fn connect_receptionist(
        &self,
        settings: &ReceptionistSettings,
        parameters: &ConnectionParameters,
    ) -> Result<Box<dyn WorkerSession>, ConnectFailure>;
}

/// A live worker session.
#[async_trait]
pub trait WorkerSession: Send + Sync {
    fn worker_id(&self) -> &str;

    /// Scheduler subsystems are registered into.
    fn scheduler(&self) -> &dyn Scheduler;

    /// Load-balancing subsystem the partition scheme is installed into.
    fn partition_installer(&self) -> &dyn PartitionInstaller;

    /// Tears the session down. Called exactly once by the lifecycle manager.
    async fn disconnect(&mut self);
}
