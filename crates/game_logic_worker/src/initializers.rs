//! Command-line initializers for deployed workers.
//!
//! Headless workers learn where the receptionist lives and how to connect from
//! the `[connection]` config section merged with command-line overrides.

use crate::config::ConnectionSettings;
use worker_connector::{ConnectionParameters, FlowInitializer, ParameterInitializer, ReceptionistSettings, SecurityMode};

/// Points the receptionist flow at the configured host and port.
#[derive(Debug, Clone)]
pub struct CommandLineFlowInitializer {
    host: Option<String>,
    port: Option<u16>,
}

impl CommandLineFlowInitializer {
    pub fn new(settings: &ConnectionSettings) -> Self {
        Self {
            host: settings.receptionist_host.clone(),
            port: settings.receptionist_port,
        }
    }
}

impl FlowInitializer for CommandLineFlowInitializer {
    fn initialize(&self, settings: &mut ReceptionistSettings) {
        if let Some(host) = &self.host {
            settings.host = host.clone();
        }
        if let Some(port) = self.port {
            settings.port = port;
        }
    }
}

/// Applies link protocol, timeout and logging overrides.
///
/// The requested security type is handed back to the selector rather than
/// written to the channels directly.
#[derive(Debug, Clone)]
pub struct CommandLineParameterInitializer {
    settings: ConnectionSettings,
}

impl CommandLineParameterInitializer {
    pub fn new(settings: &ConnectionSettings) -> Self {
        Self {
            settings: settings.clone(),
        }
    }
}

impl ParameterInitializer for CommandLineParameterInitializer {
    fn initialize(&self, parameters: &mut ConnectionParameters) -> Option<SecurityMode> {
        if let Some(protocol) = self.settings.link_protocol {
            parameters.network.link_protocol = protocol;
        }
        parameters.network.connection_timeout = self.settings.connection_timeout();
        parameters.network.use_external_ip = self.settings.use_external_ip;
        parameters.enable_protocol_logging = self.settings.enable_protocol_logging;
        self.settings.security_type
    }
}
