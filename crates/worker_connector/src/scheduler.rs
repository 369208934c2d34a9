//! Subsystem registration against the session scheduler.
//!
//! Subsystems are opaque units: the connector only cares that each one is
//! registered exactly once. Execution order is up to the scheduler.

use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

/// An opaque behavioral unit run by the session scheduler.
pub trait Subsystem: Send + Sync {
    fn name(&self) -> &str;
}

/// A subsystem that is nothing but a name.
///
/// Useful when the behavior lives entirely in the host runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedSubsystem {
    name: String,
}

impl NamedSubsystem {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Subsystem for NamedSubsystem {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Handle to a registered subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubsystemHandle {
    name: String,
    slot: usize,
}

impl SubsystemHandle {
    pub fn new(name: impl Into<String>, slot: usize) -> Self {
        Self { name: name.into(), slot }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scheduler-assigned slot of the subsystem.
    pub fn slot(&self) -> usize {
        self.slot
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    #[error("Scheduler rejected subsystem {unit}: {reason}")]
    Rejected { unit: String, reason: String },
}

/// Registration capability of the external session runtime.
pub trait Scheduler: Send + Sync {
    fn register(&self, unit: Arc<dyn Subsystem>) -> Result<SubsystemHandle, SchedulerError>;
}

/// Local bookkeeping on top of a [`Scheduler`].
///
/// Makes registration idempotent even when the scheduler itself is not: a
/// unit already registered through this registry returns its existing handle
/// and the scheduler is not called again.
pub struct SubsystemRegistry<'a> {
    scheduler: &'a dyn Scheduler,
    registered: HashMap<String, SubsystemHandle>,
    order: Vec<String>,
}

impl<'a> SubsystemRegistry<'a> {
    pub fn new(scheduler: &'a dyn Scheduler) -> Self {
        Self {
            scheduler,
            registered: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Registers `unit` unless a unit with the same name is already present.
    pub fn get_or_create(&mut self, unit: Arc<dyn Subsystem>) -> Result<SubsystemHandle, SchedulerError> {
        if let Some(handle) = self.registered.get(unit.name()) {
            debug!("Subsystem {} already registered, reusing slot {}", unit.name(), handle.slot());
            return Ok(handle.clone());
        }

        let name = unit.name().to_string();
        let handle = self.scheduler.register(unit)?;
        debug!("Registered subsystem {} in slot {}", name, handle.slot());
        self.registered.insert(name.clone(), handle.clone());
        self.order.push(name);
        Ok(handle)
    }

    /// Handles in registration order.
    pub fn handles(&self) -> Vec<SubsystemHandle> {
        self.order
            .iter()
            .filter_map(|name| self.registered.get(name).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// In-process scheduler with get-or-create semantics.
///
/// Stands in for the runtime scheduler when the transport does not provide one.
#[derive(Default)]
pub struct LocalScheduler {
    units: DashMap<String, (SubsystemHandle, Arc<dyn Subsystem>)>,
    next_slot: AtomicUsize,
}

impl LocalScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.units.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Registered subsystem names ordered by slot.
    pub fn names(&self) -> Vec<String> {
        let mut entries: Vec<(usize, String)> = self
            .units
            .iter()
            .map(|entry| (entry.value().0.slot(), entry.key().clone()))
            .collect();
        entries.sort();
        entries.into_iter().map(|(_, name)| name).collect()
    }
}

impl Scheduler for LocalScheduler {
    fn register(&self, unit: Arc<dyn Subsystem>) -> Result<SubsystemHandle, SchedulerError> {
        let entry = self.units.entry(unit.name().to_string()).or_insert_with(|| {
            let slot = self.next_slot.fetch_add(1, Ordering::Relaxed);
            (SubsystemHandle::new(unit.name(), slot), unit.clone())
        });
        Ok(entry.value().0.clone())
    }
}
