//! Post-connection bootstrap: subsystem registration and load balancing.

use crate::error::{BootstrapError, ConfigurationError};
use crate::partition::{ComponentSetRegistry, PartitionScheme};
use crate::recipe::LoadBalancingRecipe;
use crate::scheduler::{SchedulerError, Subsystem, SubsystemHandle, SubsystemRegistry};
use crate::session::WorkerSession;
use std::sync::Arc;
use tracing::{error, info};

/// What a successful bootstrap did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapReport {
    /// Registered subsystems, in registration order
    pub subsystems: Vec<SubsystemHandle>,
    /// The installed partition scheme
    pub scheme: PartitionScheme,
}

/// Configures a freshly connected worker.
///
/// Holds the fixed, ordered list of subsystem units and the load-balancing
/// recipe. [`WorkerBootstrapper::on_connected`] may run only once.
pub struct WorkerBootstrapper {
    units: Vec<Arc<dyn Subsystem>>,
    recipe: LoadBalancingRecipe,
    component_sets: ComponentSetRegistry,
    bootstrapped: bool,
}

impl WorkerBootstrapper {
    pub fn new(recipe: LoadBalancingRecipe, component_sets: ComponentSetRegistry) -> Self {
        Self {
            units: Vec::new(),
            recipe,
            component_sets,
            bootstrapped: false,
        }
    }

    pub fn with_unit(mut self, unit: Arc<dyn Subsystem>) -> Self {
        self.units.push(unit);
        self
    }

    pub fn with_units(mut self, units: impl IntoIterator<Item = Arc<dyn Subsystem>>) -> Self {
        self.units.extend(units);
        self
    }

    pub fn recipe(&self) -> &LoadBalancingRecipe {
        &self.recipe
    }

    pub fn is_bootstrapped(&self) -> bool {
        self.bootstrapped
    }

    /// Registers every subsystem and installs the partition scheme on `session`.
    ///
    /// The recipe is resolved before anything is registered, so an unknown
    /// component set fails without touching the scheduler. Every error is
    /// fatal: the caller is expected to tear the session down.
    pub async fn on_connected(&mut self, session: &dyn WorkerSession) -> Result<BootstrapReport, BootstrapError> {
        if self.bootstrapped {
            return Err(ConfigurationError::AlreadyBootstrapped.into());
        }
        self.bootstrapped = true;

        info!("🏗️ Bootstrapping worker {}", session.worker_id());

        let configuration = self.recipe.configure(&self.component_sets).map_err(|e| {
            error!("❌ Invalid load balancing configuration: {}", e);
            e
        })?;

        let mut registry = SubsystemRegistry::new(session.scheduler());
        for unit in &self.units {
            registry.get_or_create(unit.clone()).map_err(|e| {
                error!("❌ Subsystem registration failed: {}", e);
                match e {
                    SchedulerError::Rejected { unit, reason } => ConfigurationError::Registration { unit, reason },
                }
            })?;
        }
        info!("✅ Registered {} subsystems", registry.len());

        let scheme = configuration.install(session.partition_installer()).await?;

        Ok(BootstrapReport {
            subsystems: registry.handles(),
            scheme,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InstallError;
    use crate::scheduler::NamedSubsystem;
    use crate::test_support::{playground_recipe, playground_sets, LocalSession};
    use crate::ConnectFailure;

    fn bootstrapper(units: &[&str]) -> WorkerBootstrapper {
        WorkerBootstrapper::new(playground_recipe(), playground_sets()).with_units(
            units
                .iter()
                .map(|name| Arc::new(NamedSubsystem::new(*name)) as Arc<dyn Subsystem>),
        )
    }

    #[tokio::test]
    async fn test_duplicate_units_register_once() {
        let session = LocalSession::new("UnityGameLogic-test");
        let mut bootstrapper = bootstrapper(&["DisconnectSystem", "CubeMovementSystem", "DisconnectSystem"]);

        let report = bootstrapper.on_connected(&session).await.unwrap();

        assert_eq!(report.subsystems.len(), 2);
        assert_eq!(session.scheduler.registration_count("DisconnectSystem"), 1);
        assert_eq!(session.scheduler.registration_count("CubeMovementSystem"), 1);
    }

    #[tokio::test]
    async fn test_second_bootstrap_is_rejected() {
        let session = LocalSession::new("UnityGameLogic-test");
        let mut bootstrapper = bootstrapper(&["DisconnectSystem"]);
        assert!(!bootstrapper.is_bootstrapped());

        bootstrapper.on_connected(&session).await.unwrap();
        assert!(bootstrapper.is_bootstrapped());
        let second = bootstrapper.on_connected(&session).await;

        assert!(matches!(
            second,
            Err(BootstrapError::Configuration(ConfigurationError::AlreadyBootstrapped))
        ));
        assert_eq!(session.installer.install_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_set_registers_nothing() {
        let session = LocalSession::new("UnityGameLogic-test");
        let mut recipe = playground_recipe();
        recipe.default_component_set = "NoSuchSet".to_string();
        let mut bootstrapper = WorkerBootstrapper::new(recipe, playground_sets())
            .with_unit(Arc::new(NamedSubsystem::new("DisconnectSystem")));

        let result = bootstrapper.on_connected(&session).await;

        assert!(matches!(
            result,
            Err(BootstrapError::Configuration(ConfigurationError::UnknownComponentSet(ref name))) if name == "NoSuchSet"
        ));
        assert_eq!(session.scheduler.total_registrations(), 0);
        assert_eq!(session.installer.install_count(), 0);
    }

    #[tokio::test]
    async fn test_rejected_unit_is_fatal() {
        let session = LocalSession::new("UnityGameLogic-test").with_rejected_unit("MetricSendSystem");
        let mut bootstrapper = bootstrapper(&["DisconnectSystem", "MetricSendSystem"]);

        let result = bootstrapper.on_connected(&session).await;

        assert!(matches!(
            result,
            Err(BootstrapError::Configuration(ConfigurationError::Registration { ref unit, .. })) if unit == "MetricSendSystem"
        ));
        assert_eq!(session.installer.install_count(), 0);
    }

    #[tokio::test]
    async fn test_installer_already_installed() {
        let session = LocalSession::new("UnityGameLogic-test").with_install_error(InstallError::AlreadyInstalled(
            crate::SINGLETON_ANCHOR,
        ));
        let mut bootstrapper = bootstrapper(&["DisconnectSystem"]);

        let result = bootstrapper.on_connected(&session).await;

        assert!(matches!(
            result,
            Err(BootstrapError::Configuration(ConfigurationError::AlreadyInstalled(_)))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_installer_is_a_connection_error() {
        let session = LocalSession::new("UnityGameLogic-test")
            .with_install_error(InstallError::Unreachable("load balancer offline".to_string()));
        let mut bootstrapper = bootstrapper(&["DisconnectSystem"]);

        let result = bootstrapper.on_connected(&session).await;

        assert!(matches!(result, Err(BootstrapError::Connect(ConnectFailure::Transport(_)))));
    }
}
