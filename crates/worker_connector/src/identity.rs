//! Worker identity generation.

use std::fmt;
use uuid::Uuid;

/// The identity a worker presents to the backend.
///
/// Fields are private: once generated the identity cannot be changed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkerIdentity {
    worker_type: String,
    instance_suffix: String,
}

impl WorkerIdentity {
    /// Generates a new identity for `worker_type` with a random instance suffix.
    pub fn generate(worker_type: impl Into<String>) -> Self {
        Self {
            worker_type: worker_type.into(),
            instance_suffix: Uuid::new_v4().to_string(),
        }
    }

    pub fn worker_type(&self) -> &str {
        &self.worker_type
    }

    pub fn instance_suffix(&self) -> &str {
        &self.instance_suffix
    }

    /// The full worker id, `{worker_type}-{instance_suffix}`.
    pub fn worker_id(&self) -> String {
        format!("{}-{}", self.worker_type, self.instance_suffix)
    }
}

impl fmt::Display for WorkerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.worker_type, self.instance_suffix)
    }
}
