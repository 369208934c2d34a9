//! Main application logic and lifecycle management.
//!
//! The `Application` loads configuration, builds the worker connector and
//! drives it from start to graceful shutdown.

use crate::{
    bridge::BridgeTransport,
    cli::CliArgs,
    config::AppConfig,
    initializers::{CommandLineFlowInitializer, CommandLineParameterInitializer},
    level::LevelInstance,
    logging::display_banner,
    signals::{wait_for_shutdown_signal, wait_for_shutdown_signal_silent},
    subsystems::game_logic_subsystems,
};
use std::future::Future;
use std::sync::Arc;
use tracing::{error, info, warn};
use worker_connector::{
    BootstrapError, BootstrapReport, ConnectionFlowSelector, ConnectionOrchestrator, ExecutionContext, Transport,
    WorkerBootstrapper, WorkerConnector,
};

/// The game logic worker application.
///
/// Owns the merged configuration and the [`WorkerConnector`]; the connector in
/// turn owns the session once started.
pub struct Application {
    config: AppConfig,
    context: ExecutionContext,
    connector: WorkerConnector,
}

impl Application {
    /// Creates a new application instance.
    ///
    /// 1. Load configuration from file (creating default if missing)
    /// 2. Apply command-line argument overrides
    /// 3. Validate merged configuration
    /// 4. Display startup banner
    /// 5. Build the connector over the WebSocket bridge
    pub async fn new(args: CliArgs) -> Result<Self, Box<dyn std::error::Error>> {
        info!("🔧 Loading configuration from: {}", args.config_path.display());
        let mut config = AppConfig::load_from_file(&args.config_path).await?;

        if let Some(host) = args.receptionist_host {
            config.connection.receptionist_host = Some(host);
        }

        if let Some(port) = args.receptionist_port {
            config.connection.receptionist_port = Some(port);
        }

        if let Some(protocol) = args.link_protocol {
            config.connection.link_protocol = Some(protocol);
        }

        if let Some(security) = args.security_type {
            config.connection.security_type = Some(security);
        }

        if let Some(log_level) = args.log_level {
            config.logging.level = log_level;
        }

        if args.json_logs {
            config.logging.json_format = true;
        }

        if let Err(e) = config.validate() {
            return Err(format!("Configuration validation failed: {e}").into());
        } else {
            info!("✅ Configuration loaded and validated successfully");
        }

        display_banner(&config.worker.worker_type);

        let context = config.execution_context(args.headless);
        Ok(Self::with_transport(config, context, Arc::new(BridgeTransport::new())))
    }

    /// Builds the application over an arbitrary transport.
    pub fn with_transport(config: AppConfig, context: ExecutionContext, transport: Arc<dyn Transport>) -> Self {
        let selector = ConnectionFlowSelector::new(config.worker.worker_type.clone())
            .with_flow_initializer(CommandLineFlowInitializer::new(&config.connection))
            .with_parameter_initializer(CommandLineParameterInitializer::new(&config.connection));

        let bootstrapper = WorkerBootstrapper::new(config.load_balancing.clone(), config.component_set_registry())
            .with_units(game_logic_subsystems());

        let connector = WorkerConnector::new(selector, ConnectionOrchestrator::new(transport), bootstrapper);

        Self {
            config,
            context,
            connector,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn context(&self) -> ExecutionContext {
        self.context
    }

    pub fn connector(&self) -> &WorkerConnector {
        &self.connector
    }

    /// Connects and bootstraps the worker, then instantiates the configured level.
    pub async fn start(&mut self) -> Result<BootstrapReport, BootstrapError> {
        let report = self.connector.start(self.context).await?;

        if let Some(level) = &self.config.worker.level {
            if let Err(e) = self.connector.attach(Box::new(LevelInstance::instantiate(level.clone()))) {
                self.connector.shutdown().await;
                return Err(e.into());
            }
        }

        info!("⏱️ Target frame rate: {} Hz", self.config.worker.target_frame_rate);
        Ok(report)
    }

    /// Releases the level and disconnects the session.
    pub async fn shutdown(&mut self) {
        self.connector.shutdown().await;
    }

    /// Runs the worker until a shutdown signal is received.
    pub async fn run(mut self) -> Result<(), Box<dyn std::error::Error>> {
        info!("🌟 Starting {} worker", self.config.worker.worker_type);
        self.log_configuration_summary();

        let report = self.start().await?;
        info!(
            "✅ Worker is now running with {} subsystems",
            report.subsystems.len()
        );
        self.serve_until(wait_for_shutdown_signal()).await
    }

    /// Keeps the started worker running until `stop` resolves, then shuts it down.
    ///
    /// The worker is shut down even when `stop` fails.
    pub async fn serve_until<F>(&mut self, stop: F) -> Result<(), Box<dyn std::error::Error>>
    where
        F: Future<Output = Result<(), Box<dyn std::error::Error>>>,
    {
        info!("🛑 Press Ctrl+C to gracefully shutdown");

        if let Err(e) = stop.await {
            error!("❌ Failed to wait for shutdown signal: {e}");
            self.shutdown().await;
            return Err(e);
        }

        // merciless shutdown
        tokio::spawn(async move {
            if let Err(e) = wait_for_shutdown_signal_silent().await {
                error!("Failed to set up merciless shutdown signal handler: {e}");
                return;
            }

            warn!("Shutdown handler received again! I'll make this quick.");
            std::process::exit(1);
        });

        info!("🛑 Shutdown signal received, beginning graceful shutdown...");
        self.shutdown().await;

        info!("✅ Worker shutdown complete");
        Ok(())
    }

    fn log_configuration_summary(&self) {
        let connection = &self.config.connection;
        info!("📋 Configuration Summary:");
        info!("  🧭 Execution context: {}", self.context);
        if self.context.is_headless() {
            info!(
                "  🌐 Receptionist: {}:{}",
                connection.receptionist_host.as_deref().unwrap_or(worker_connector::DEFAULT_RECEPTIONIST_HOST),
                connection.receptionist_port.unwrap_or(worker_connector::DEFAULT_RECEPTIONIST_PORT)
            );
            info!("  ⏱️ Connection timeout: {}ms", connection.connection_timeout_ms);
        }
        info!(
            "  ⚖️ Partition workers: {}",
            self.config.load_balancing.partition_worker_types.join(", ")
        );
        info!("  🗺️ Level: {}", self.config.worker.level.as_deref().unwrap_or("none"));
    }
}
