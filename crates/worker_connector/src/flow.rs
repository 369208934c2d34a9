//! Connection flows: how a worker finds and joins the backend.

use crate::identity::WorkerIdentity;

pub const DEFAULT_RECEPTIONIST_HOST: &str = "127.0.0.1";
pub const DEFAULT_RECEPTIONIST_PORT: u16 = 7777;

/// Discovery target for the receptionist flow.
///
/// Host and port can be customized by a [`crate::FlowInitializer`]; the worker
/// id cannot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceptionistSettings {
    pub host: String,
    pub port: u16,
    worker_id: String,
}

impl ReceptionistSettings {
    /// Settings for the well-known local receptionist.
    pub fn new(identity: &WorkerIdentity) -> Self {
        Self {
            host: DEFAULT_RECEPTIONIST_HOST.to_string(),
            port: DEFAULT_RECEPTIONIST_PORT,
            worker_id: identity.worker_id(),
        }
    }

    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    /// `host:port` of the receptionist.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// The strategy used to connect, with its strategy-specific settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionFlow {
    /// Connect directly to a receptionist endpoint
    Receptionist(ReceptionistSettings),
}

impl ConnectionFlow {
    pub fn name(&self) -> &'static str {
        match self {
            ConnectionFlow::Receptionist(_) => "receptionist",
        }
    }

    pub fn worker_id(&self) -> &str {
        match self {
            ConnectionFlow::Receptionist(settings) => settings.worker_id(),
        }
    }
}
