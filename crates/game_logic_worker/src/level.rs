//! The level instance owned by a connected worker.

use tracing::{debug, info};
use worker_connector::AuxiliaryResource;

/// A level instantiated after the worker connects.
///
/// Attached to the lifecycle so it is destroyed before the session goes away.
#[derive(Debug)]
pub struct LevelInstance {
    name: String,
    origin: [f32; 3],
    destroyed: bool,
}

impl LevelInstance {
    /// Instantiates `name` at the world origin.
    pub fn instantiate(name: impl Into<String>) -> Self {
        let level = Self {
            name: name.into(),
            origin: [0.0, 0.0, 0.0],
            destroyed: false,
        };
        info!("🗺️ Instantiated level {} at {:?}", level.name, level.origin);
        level
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

impl AuxiliaryResource for LevelInstance {
    fn name(&self) -> &str {
        &self.name
    }

    fn release(&mut self) -> Result<(), String> {
        if self.destroyed {
            return Err(format!("level {} already destroyed", self.name));
        }
        self.destroyed = true;
        debug!("Destroyed level {}", self.name);
        Ok(())
    }
}
