//! # Game Logic Worker - Main Entry Point
//!
//! Simulation worker that joins a spatially-partitioned simulation through a
//! receptionist, registers its gameplay subsystems and installs the
//! load-balancing partition scheme.
//!
//! ## Quick Start
//!
//! ```bash
//! # Local development: connects insecurely to 127.0.0.1:7777
//! game_logic_worker
//!
//! # Deployed worker
//! game_logic_worker --headless --receptionist-host 10.0.4.2 --receptionist-port 22000 --link-protocol tcp
//!
//! # JSON logging for production
//! game_logic_worker --headless --json-logs
//! ```
//!
//! ## Configuration
//!
//! The worker loads configuration from a TOML file (default: `worker.toml`).
//! If the file doesn't exist, a default configuration will be created.
//!
//! ## Signal Handling
//!
//! The worker handles graceful shutdown on:
//! - SIGINT (Ctrl+C)
//! - SIGTERM (Unix systems)

use tracing::error;

mod app;
mod bridge;
mod cli;
mod config;
mod initializers;
mod level;
mod logging;
mod signals;
mod subsystems;

#[cfg(test)]
mod test_receptionist;

pub use app::Application;
pub use bridge::{BridgeMessage, BridgeSession, BridgeTransport, ConnectRequest};
pub use cli::CliArgs;
pub use config::{AppConfig, ComponentSetSettings, ConnectionSettings, LoggingSettings, WorkerSettings, UNITY_GAME_LOGIC};
pub use level::LevelInstance;

/// Runs the game logic worker.
///
/// Parses the command line, initializes logging and runs the application
/// until shutdown. Called from `main` inside the tokio runtime.
///
/// # Exit Codes
///
/// * **0**: Successful execution and shutdown
/// * **1**: Error during startup, connection, bootstrap or runtime
pub async fn init() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Load configuration to get logging settings
    let mut config = AppConfig::load_from_file(&args.config_path)
        .await
        .unwrap_or_default();
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }

    if let Err(e) = logging::setup_logging(&config.logging, args.json_logs) {
        eprintln!("❌ Failed to setup logging: {e}");
        std::process::exit(1);
    }

    match Application::new(args).await {
        Ok(app) => {
            if let Err(e) = app.run().await {
                error!("❌ Application error: {e}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            error!("❌ Failed to start application: {e}");
            std::process::exit(1);
        }
    }

    Ok(())
}
