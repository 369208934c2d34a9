//! Test doubles for the transport, session, scheduler and installer seams.

use crate::error::{ConnectFailure, InstallError};
use crate::flow::ReceptionistSettings;
use crate::lifecycle::AuxiliaryResource;
use crate::parameters::ConnectionParameters;
use crate::partition::{ComponentId, ComponentSet, ComponentSetRegistry, PartitionInstaller, PartitionScheme, SINGLETON_ANCHOR};
use crate::recipe::{ClientLoadBalancing, EntityOverride, LoadBalancingRecipe};
use crate::scheduler::{Scheduler, SchedulerError, Subsystem, SubsystemHandle};
use crate::security::SecurityMode;
use crate::session::{Transport, WorkerSession};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub fn playground_sets() -> ComponentSetRegistry {
    ComponentSetRegistry::new()
        .with_set(ComponentSet::new("DefaultServerSet", [54, 11000, 12000].map(ComponentId)))
        .with_set(ComponentSet::new("PlayerServerSet", [54, 11000, 13000].map(ComponentId)))
        .with_set(ComponentSet::new("PlayerClientSet", [11000, 13001].map(ComponentId)))
}

pub fn playground_recipe() -> LoadBalancingRecipe {
    LoadBalancingRecipe {
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
    }
}

/// Scheduler that counts every call it receives.
#[derive(Default)]
pub struct RecordingScheduler {
    calls: Mutex<Vec<String>>,
    rejected: Option<String>,
}

impl RecordingScheduler {
    pub fn rejecting(unit: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            rejected: Some(unit.to_string()),
        }
    }

    pub fn registration_count(&self, name: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|n| n.as_str() == name).count()
    }

    pub fn total_registrations(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn registered(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Scheduler for RecordingScheduler {
    fn register(&self, unit: Arc<dyn Subsystem>) -> Result<SubsystemHandle, SchedulerError> {
        if self.rejected.as_deref() == Some(unit.name()) {
            return Err(SchedulerError::Rejected {
                unit: unit.name().to_string(),
                reason: "malformed component set reference".to_string(),
            });
        }
        let mut calls = self.calls.lock().unwrap();
        calls.push(unit.name().to_string());
        Ok(SubsystemHandle::new(unit.name(), calls.len() - 1))
    }
}

/// Installer that stores every scheme it is given.
#[derive(Default)]
pub struct RecordingInstaller {
    schemes: Mutex<Vec<PartitionScheme>>,
    error: Option<InstallError>,
}

impl RecordingInstaller {
    pub fn install_count(&self) -> usize {
        self.schemes.lock().unwrap().len()
    }

    pub fn last_scheme(&self) -> Option<PartitionScheme> {
        self.schemes.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl PartitionInstaller for RecordingInstaller {
    async fn install(&self, scheme: &PartitionScheme) -> Result<(), InstallError> {
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        self.schemes.lock().unwrap().push(scheme.clone());
        Ok(())
    }
}

/// In-memory session with observable side effects.
pub struct LocalSession {
    worker_id: String,
    pub scheduler: Arc<RecordingScheduler>,
    pub installer: Arc<RecordingInstaller>,
    pub disconnects: Arc<AtomicUsize>,
    events: Option<Arc<Mutex<Vec<String>>>>,
}

impl LocalSession {
    pub fn new(worker_id: &str) -> Self {
        Self {
            worker_id: worker_id.to_string(),
            scheduler: Arc::new(RecordingScheduler::default()),
            installer: Arc::new(RecordingInstaller::default()),
            disconnects: Arc::new(AtomicUsize::new(0)),
            events: None,
        }
    }

    pub fn with_rejected_unit(mut self, unit: &str) -> Self {
        self.scheduler = Arc::new(RecordingScheduler::rejecting(unit));
        self
    }

    pub fn with_install_error(mut self, error: InstallError) -> Self {
        self.installer = Arc::new(RecordingInstaller {
            schemes: Mutex::new(Vec::new()),
            error: Some(error),
        });
        self
    }

    pub fn with_event_log(mut self, events: Arc<Mutex<Vec<String>>>) -> Self {
        self.events = Some(events);
        self
    }
}

#[async_trait]
impl WorkerSession for LocalSession {
    fn worker_id(&self) -> &str {
        &self.worker_id
    }

    fn scheduler(&self) -> &dyn Scheduler {
        self.scheduler.as_ref()
    }

    fn partition_installer(&self) -> &dyn PartitionInstaller {
        self.installer.as_ref()
    }

    async fn disconnect(&mut self) {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        if let Some(events) = &self.events {
            events.lock().unwrap().push("disconnect".to_string());
        }
    }
}

#[derive(Debug, Clone)]
pub enum TransportBehavior {
    Accept,
    Fail(ConnectFailure),
    /// Never completes the handshake
    Hang,
    /// Rejects any channel that is not secure
    RequireSecure,
}

/// Observable state shared by every session a [`LocalTransport`] creates.
#[derive(Clone, Default)]
pub struct SessionProbe {
    pub scheduler: Arc<RecordingScheduler>,
    pub installer: Arc<RecordingInstaller>,
    pub disconnects: Arc<AtomicUsize>,
}

/// Transport double standing in for a local deployment.
pub struct LocalTransport {
    behavior: TransportBehavior,
    attempts: AtomicUsize,
    probe: SessionProbe,
    install_error: Option<InstallError>,
    seen: Mutex<HashMap<String, (String, SecurityMode)>>,
}

impl LocalTransport {
    pub fn new(behavior: TransportBehavior) -> Self {
        Self {
            behavior,
            attempts: AtomicUsize::new(0),
            probe: SessionProbe::default(),
            install_error: None,
            seen: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_install_error(mut self, error: InstallError) -> Self {
        self.install_error = Some(error);
        self
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn probe(&self) -> SessionProbe {
        self.probe.clone()
    }

    /// Receptionist address and active channel security seen for `worker_id`.
    pub fn seen(&self, worker_id: &str) -> Option<(String, SecurityMode)> {
        self.seen.lock().unwrap().get(worker_id).cloned()
    }
}

#[async_trait]
impl Transport for LocalTransport {
    async fn connect_receptionist(
        &self,
        settings: &ReceptionistSettings,
        parameters: &ConnectionParameters,
    ) -> Result<Box<dyn WorkerSession>, ConnectFailure> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().insert(
            settings.worker_id().to_string(),
            (settings.address(), parameters.network.active_channel().security),
        );

        match &self.behavior {
            TransportBehavior::Accept => {}
            TransportBehavior::Fail(reason) => return Err(reason.clone()),
            TransportBehavior::Hang => std::future::pending::<()>().await,
            TransportBehavior::RequireSecure => {
                if !parameters.network.all_channels(SecurityMode::Secure) {
                    return Err(ConnectFailure::CredentialsRejected(
                        "insecure channels are not accepted".to_string(),
                    ));
                }
            }
        }

        let installer = match &self.install_error {
            Some(error) => Arc::new(RecordingInstaller {
                schemes: Mutex::new(Vec::new()),
                error: Some(error.clone()),
            }),
            None => self.probe.installer.clone(),
        };

        Ok(Box::new(LocalSession {
            worker_id: settings.worker_id().to_string(),
            scheduler: self.probe.scheduler.clone(),
            installer,
            disconnects: self.probe.disconnects.clone(),
            events: None,
        }))
    }
}

/// Auxiliary resource that logs its release.
pub struct TrackedResource {
    name: String,
    log: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl TrackedResource {
    pub fn new(name: &str, log: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            name: name.to_string(),
            log,
            fail: false,
        }
    }

    pub fn failing(name: &str, log: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            fail: true,
            ..Self::new(name, log)
        }
    }
}

impl AuxiliaryResource for TrackedResource {
    fn name(&self) -> &str {
        &self.name
    }

    fn release(&mut self) -> Result<(), String> {
        self.log.lock().unwrap().push(format!("release:{}", self.name));
        if self.fail {
            Err("already destroyed".to_string())
        } else {
            Ok(())
        }
    }
}
