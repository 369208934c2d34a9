//! Connection flow selection.

use crate::flow::{ConnectionFlow, ReceptionistSettings};
use crate::identity::WorkerIdentity;
use crate::initializer::{FlowInitializer, NoCustomization, ParameterInitializer};
use crate::parameters::ConnectionParameters;
use crate::security::{ExecutionContext, SecurityPolicy};
use tracing::debug;

/// Chooses the connection flow and builds its parameters for an execution context.
///
/// Selection is total over [`ExecutionContext`] and never fails. The external
/// initializers are only consulted for headless workers.
pub struct ConnectionFlowSelector {
    worker_type: String,
    flow_initializer: Box<dyn FlowInitializer>,
    parameter_initializer: Box<dyn ParameterInitializer>,
}

impl ConnectionFlowSelector {
    /// Creates a selector for `worker_type` with no external customization.
    pub fn new(worker_type: impl Into<String>) -> Self {
        Self {
            worker_type: worker_type.into(),
            flow_initializer: Box::new(NoCustomization),
            parameter_initializer: Box::new(NoCustomization),
        }
    }

    /// Sets the initializer that customizes the discovery target in headless mode.
    pub fn with_flow_initializer(mut self, initializer: impl FlowInitializer + 'static) -> Self {
        self.flow_initializer = Box::new(initializer);
        self
    }

    /// Sets the initializer that customizes connection parameters in headless mode.
    pub fn with_parameter_initializer(mut self, initializer: impl ParameterInitializer + 'static) -> Self {
        self.parameter_initializer = Box::new(initializer);
        self
    }

    pub fn worker_type(&self) -> &str {
        &self.worker_type
    }

    /// Builds the flow and parameters for `context`.
    ///
    /// Every call generates a fresh [`WorkerIdentity`]. Headless channel
    /// security is whatever the parameter initializer left on the channels,
    /// unless it returned a mode, which is then applied to every channel.
    pub fn select(&self, context: ExecutionContext) -> (ConnectionFlow, ConnectionParameters) {
        let identity = WorkerIdentity::generate(self.worker_type.as_str());
        let mut settings = ReceptionistSettings::new(&identity);
        let mut parameters = ConnectionParameters::new(identity);

        match context {
            ExecutionContext::Interactive => {
                parameters.network.set_security(SecurityPolicy::resolve(context, None));
            }
            ExecutionContext::Headless => {
                self.flow_initializer.initialize(&mut settings);
                // Channels default to secure; only an explicit request changes them all.
                if let Some(mode) = self.parameter_initializer.initialize(&mut parameters) {
                    parameters.network.set_security(SecurityPolicy::resolve(context, Some(mode)));
                }
            }
        }
        let security = parameters.network.active_channel().security;

        debug!(
            "Selected receptionist flow for {} worker {} -> {} ({}, {})",
            context,
            parameters.worker_id(),
            settings.address(),
            parameters.network.link_protocol,
            security
        );

        (ConnectionFlow::Receptionist(settings), parameters)
    }
}
