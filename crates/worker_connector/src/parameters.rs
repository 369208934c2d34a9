//! Connection parameters handed to the transport.

use crate::identity::WorkerIdentity;
use crate::security::SecurityMode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default bound on a single connect attempt.
pub const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Link protocol used for the worker connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LinkProtocol {
    #[default]
    Kcp,
    Tcp,
}

impl fmt::Display for LinkProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkProtocol::Kcp => write!(f, "kcp"),
            LinkProtocol::Tcp => write!(f, "tcp"),
        }
    }
}

impl FromStr for LinkProtocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "kcp" | "modularkcp" => Ok(LinkProtocol::Kcp),
            "tcp" | "modulartcp" => Ok(LinkProtocol::Tcp),
            other => Err(format!("Invalid link protocol: {other}. Must be one of: kcp, tcp")),
        }
    }
}

/// Per-channel transport settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSettings {
    pub security: SecurityMode,
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self { security: SecurityMode::Secure }
    }
}

/// Network section of the connection parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkParameters {
    pub link_protocol: LinkProtocol,
    pub kcp: ChannelSettings,
    pub tcp: ChannelSettings,
    /// Connect using the externally visible address of the receptionist
    pub use_external_ip: bool,
    pub connection_timeout: Duration,
}

impl Default for NetworkParameters {
    fn default() -> Self {
        Self {
            link_protocol: LinkProtocol::default(),
            kcp: ChannelSettings::default(),
            tcp: ChannelSettings::default(),
            use_external_ip: false,
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
        }
    }
}

impl NetworkParameters {
    /// Applies `mode` to every transport channel.
    pub fn set_security(&mut self, mode: SecurityMode) {
        self.kcp.security = mode;
        self.tcp.security = mode;
    }

    /// Settings of the channel selected by `link_protocol`.
    pub fn active_channel(&self) -> &ChannelSettings {
        match self.link_protocol {
            LinkProtocol::Kcp => &self.kcp,
            LinkProtocol::Tcp => &self.tcp,
        }
    }

    /// Returns true when every channel uses `mode`.
    pub fn all_channels(&self, mode: SecurityMode) -> bool {
        self.kcp.security == mode && self.tcp.security == mode
    }
}

/// Parameters for one connect attempt.
///
/// Built by [`crate::ConnectionFlowSelector`] and consumed by
/// [`crate::ConnectionOrchestrator::connect`]. The identity is fixed at
/// construction; initializers can only touch the public sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParameters {
    identity: WorkerIdentity,
    pub network: NetworkParameters,
    pub enable_protocol_logging: bool,
}

impl ConnectionParameters {
    pub fn new(identity: WorkerIdentity) -> Self {
        Self {
            identity,
            network: NetworkParameters::default(),
            enable_protocol_logging: false,
        }
    }

    pub fn identity(&self) -> &WorkerIdentity {
        &self.identity
    }

    pub fn worker_type(&self) -> &str {
        self.identity.worker_type()
    }

    pub fn worker_id(&self) -> String {
        self.identity.worker_id()
    }
}
