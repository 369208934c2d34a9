//! Configuration management for the game logic worker.
//!
//! This module handles loading, validation, and conversion of worker
//! configuration from TOML files and command-line arguments.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use worker_connector::{
    ClientLoadBalancing, ComponentId, ComponentSet, ComponentSetRegistry, EntityOverride, ExecutionContext,
    LinkProtocol, LoadBalancingRecipe, SecurityMode, SINGLETON_ANCHOR,
};

/// Worker type of the game logic worker.
pub const UNITY_GAME_LOGIC: &str = "UnityGameLogic";

/// Worker configuration loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Worker identity and runtime settings
    pub worker: WorkerSettings,
    /// Connection settings applied to headless workers
    #[serde(default)]
    pub connection: ConnectionSettings,
    /// Logging configuration settings
    pub logging: LoggingSettings,
    /// Load-balancing recipe installed after connecting
    pub load_balancing: LoadBalancingRecipe,
    /// Component sets referenced by the load-balancing recipe
    #[serde(default)]
    pub component_sets: Vec<ComponentSetSettings>,
}

/// Worker identity and runtime settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerSettings {
    /// Worker type presented to the backend
    pub worker_type: String,
    /// Execution context when `--headless` is not given
    #[serde(default = "default_context")]
    pub context: ExecutionContext,
    /// Target simulation tick rate
    #[serde(default = "default_target_frame_rate")]
    pub target_frame_rate: u32,
    /// Level instantiated once the worker is connected
    #[serde(default)]
    pub level: Option<String>,
}

/// Connection settings fed to the command-line initializers.
///
/// Only consulted for headless workers; interactive workers always connect
/// to the local receptionist without security.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionSettings {
    /// Receptionist host (None keeps the local default)
    #[serde(default)]
    pub receptionist_host: Option<String>,
    /// Receptionist port (None keeps the local default)
    #[serde(default)]
    pub receptionist_port: Option<u16>,
    #[serde(default)]
    pub link_protocol: Option<LinkProtocol>,
    /// Channel security (None means secure)
    #[serde(default)]
    pub security_type: Option<SecurityMode>,
    /// Connection timeout in milliseconds
    #[serde(default = "default_connection_timeout_ms")]
    pub connection_timeout_ms: u64,
    #[serde(default)]
    pub use_external_ip: bool,
    #[serde(default)]
    pub enable_protocol_logging: bool,
}

/// Logging system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: String,
    /// Whether to output logs in JSON format
    pub json_format: bool,
}

/// A named component set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentSetSettings {
    pub name: String,
    pub components: Vec<u32>,
}

fn default_context() -> ExecutionContext {
    ExecutionContext::Interactive
}

fn default_target_frame_rate() -> u32 {
    60
}

/// Default for connection_timeout_ms
pub fn default_connection_timeout_ms() -> u64 {
    10_000
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            receptionist_host: None,
            receptionist_port: None,
            link_protocol: None,
            security_type: None,
            connection_timeout_ms: default_connection_timeout_ms(),
            use_external_ip: false,
            enable_protocol_logging: false,
        }
    }
}

impl ConnectionSettings {
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_millis(self.connection_timeout_ms)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            worker: WorkerSettings {
                worker_type: UNITY_GAME_LOGIC.to_string(),
                context: default_context(),
                target_frame_rate: default_target_frame_rate(),
                level: None,
            },
            connection: ConnectionSettings::default(),
            logging: LoggingSettings {
                level: "info".to_string(),
                json_format: false,
            },
            load_balancing: LoadBalancingRecipe {
                singleton_anchor: SINGLETON_ANCHOR,
                default_component_set: "DefaultServerSet".to_string(),
                partition_worker_types: vec!["UnityClient".to_string(), "MobileClient".to_string()],
                client_load_balancing: vec![ClientLoadBalancing {
                    entity_type: "Character".to_string(),
                    component_set: "PlayerClientSet".to_string(),
                }],
                overrides: vec![EntityOverride {
                    entity_type: "Character".to_string(),
                    component_set: "PlayerServerSet".to_string(),
                }],
            },
            component_sets: vec![
                // Position, TransformInternal, Launchable, CubeColor, Score
                ComponentSetSettings {
                    name: "DefaultServerSet".to_string(),
                    components: vec![54, 11000, 12000, 12003, 12004],
                },
                // Position, TransformInternal, PlayerHeartbeatServer, Launcher, Score
                ComponentSetSettings {
                    name: "PlayerServerSet".to_string(),
                    components: vec![54, 11000, 13000, 12001, 12004],
                },
                // TransformInternal, PlayerHeartbeatClient, PlayerInput, ClientRotation
                ComponentSetSettings {
                    name: "PlayerClientSet".to_string(),
                    components: vec![11000, 13001, 12002, 12005],
                },
            ],
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    ///
    /// If the file doesn't exist, creates a default configuration file at the
    /// specified path and returns the default configuration.
    pub async fn load_from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        if path.exists() {
            let content = tokio::fs::read_to_string(path).await?;
            let config: AppConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            let default_config = AppConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            tokio::fs::write(path, toml_content).await?;
            info!("Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    /// The execution context, with `--headless` taking precedence.
    pub fn execution_context(&self, headless_flag: bool) -> ExecutionContext {
        if headless_flag {
            ExecutionContext::Headless
        } else {
            self.worker.context
        }
    }

    /// Builds the component set registry from `component_sets`.
    pub fn component_set_registry(&self) -> ComponentSetRegistry {
        self.component_sets
            .iter()
            .fold(ComponentSetRegistry::new(), |registry, set| {
                registry.with_set(ComponentSet::new(
                    set.name.clone(),
                    set.components.iter().copied().map(ComponentId),
                ))
            })
    }

    /// Validates the configuration for consistency and correctness.
    pub fn validate(&self) -> Result<(), String> {
        if self.worker.worker_type.trim().is_empty() {
            return Err("Worker type cannot be empty".to_string());
        }

        if self.worker.target_frame_rate == 0 {
            return Err("worker.target_frame_rate must be greater than 0".to_string());
        }

        if self.connection.receptionist_port == Some(0) {
            return Err("connection.receptionist_port must be greater than 0".to_string());
        }

        if self.connection.connection_timeout_ms == 0 {
            return Err("connection.connection_timeout_ms must be greater than 0".to_string());
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {valid_levels:?}",
                &self.logging.level
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for set in &self.component_sets {
            if !seen.insert(set.name.as_str()) {
                return Err(format!("Duplicate component set: {}", set.name));
            }
        }

        if self.load_balancing.partition_worker_types.iter().any(|w| w.trim().is_empty()) {
            return Err("load_balancing.partition_worker_types cannot contain empty names".to_string());
        }

        for name in self.load_balancing.referenced_sets() {
            if !seen.contains(name) {
                return Err(format!("Unknown component set referenced by load_balancing: {name}"));
            }
        }

        Ok(())
    }
}
