//! Pluggable customization of flows and parameters.
//!
//! Headless workers receive their discovery target and connection tuning from
//! an external source (command line, environment). The selector accepts
//! anything implementing these traits, including plain closures.

use crate::flow::ReceptionistSettings;
use crate::parameters::ConnectionParameters;
use crate::security::SecurityMode;

/// Customizes the receptionist discovery target.
pub trait FlowInitializer: Send + Sync {
    fn initialize(&self, settings: &mut ReceptionistSettings);
}

/// Customizes connection parameters.
pub trait ParameterInitializer: Send + Sync {
    /// Applies overrides to `parameters`.
    ///
    /// Returns the security mode the external source asked for, if any. A
    /// returned mode is resolved through [`crate::SecurityPolicy`] and applied
    /// to every channel; with `None` the channels keep what was written here.
    fn initialize(&self, parameters: &mut ConnectionParameters) -> Option<SecurityMode>;
}

impl<F> FlowInitializer for F
where
    F: Fn(&mut ReceptionistSettings) + Send + Sync,
{
    fn initialize(&self, settings: &mut ReceptionistSettings) {
        self(settings)
    }
}

impl<F> ParameterInitializer for F
where
    F: Fn(&mut ConnectionParameters) -> Option<SecurityMode> + Send + Sync,
{
    fn initialize(&self, parameters: &mut ConnectionParameters) -> Option<SecurityMode> {
        self(parameters)
    }
}

/// Identity initializer: leaves everything untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCustomization;

impl FlowInitializer for NoCustomization {
    fn initialize(&self, _settings: &mut ReceptionistSettings) {}
}

impl ParameterInitializer for NoCustomization {
    fn initialize(&self, _parameters: &mut ConnectionParameters) -> Option<SecurityMode> {
        None
    }
}
