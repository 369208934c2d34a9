//! Subsystems the game logic worker registers once connected.

use std::sync::Arc;
use worker_connector::{NamedSubsystem, Subsystem};

/// Transform sync, player lifecycle and object creation, then the gameplay systems.
pub const GAME_LOGIC_SUBSYSTEMS: [&str; 10] = [
    "TransformSynchronizationSystems",
    "PlayerLifecycleSystems",
    "GameObjectCreationSystems",
    "DisconnectSystem",
    "TriggerColorChangeSystem",
    "ProcessLaunchCommandSystem",
    "ProcessRechargeSystem",
    "MetricSendSystem",
    "ProcessScoresSystem",
    "CubeMovementSystem",
];

pub fn game_logic_subsystems() -> Vec<Arc<dyn Subsystem>> {
    GAME_LOGIC_SUBSYSTEMS
        .iter()
        .map(|name| Arc::new(NamedSubsystem::new(*name)) as Arc<dyn Subsystem>)
        .collect()
}
