//! Load-balancing partition configuration.
//!
//! Declares which worker types take part in partition management, which
//! component set each entity type exposes, and the canonical singleton
//! assignment. Nothing here performs I/O: the finished [`PartitionScheme`] is
//! handed to an external [`PartitionInstaller`].

use crate::error::{ConfigurationError, InstallError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use tracing::{debug, info};

/// Identifier of a simulated entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub i64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Well-known entity that owns the canonical partition assignment.
pub const SINGLETON_ANCHOR: EntityId = EntityId(1);

/// Identifier of a replicated component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(pub u32);

/// A named set of component ids an owning worker is allowed to see or modify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentSet {
    name: String,
    components: BTreeSet<ComponentId>,
}

impl ComponentSet {
    pub fn new(name: impl Into<String>, components: impl IntoIterator<Item = ComponentId>) -> Self {
        Self {
            name: name.into(),
            components: components.into_iter().collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn components(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.components.iter().copied()
    }

    pub fn contains(&self, component: ComponentId) -> bool {
        self.components.contains(&component)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// Component sets known to this worker, looked up by name.
#[derive(Debug, Clone, Default)]
pub struct ComponentSetRegistry {
    sets: HashMap<String, ComponentSet>,
}

impl ComponentSetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `set`, returning the set previously registered under the same name.
    pub fn register(&mut self, set: ComponentSet) -> Option<ComponentSet> {
        self.sets.insert(set.name().to_string(), set)
    }

    pub fn with_set(mut self, set: ComponentSet) -> Self {
        self.register(set);
        self
    }

    /// Looks up a set by name; unknown names are a configuration error.
    pub fn get(&self, name: &str) -> Result<&ComponentSet, ConfigurationError> {
        self.sets
            .get(name)
            .ok_or_else(|| ConfigurationError::UnknownComponentSet(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sets.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

/// Default component set plus per-entity-type overrides.
///
/// An override replaces the default for its entity type only. Registering a
/// second override for the same entity type replaces the first; sets are never
/// merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityLoadBalancingMap {
    default_set: ComponentSet,
    overrides: BTreeMap<String, ComponentSet>,
}

impl EntityLoadBalancingMap {
    pub fn new(default_set: ComponentSet) -> Self {
        Self {
            default_set,
            overrides: BTreeMap::new(),
        }
    }

    pub fn add_override(mut self, entity_type: impl Into<String>, set: ComponentSet) -> Self {
        let entity_type = entity_type.into();
        if let Some(previous) = self.overrides.insert(entity_type.clone(), set) {
            debug!("Override for {} replaced (was {})", entity_type, previous.name());
        }
        self
    }

    /// The component set in effect for `entity_type`.
    pub fn resolve(&self, entity_type: &str) -> &ComponentSet {
        self.overrides.get(entity_type).unwrap_or(&self.default_set)
    }

    pub fn default_set(&self) -> &ComponentSet {
        &self.default_set
    }

    pub fn overrides(&self) -> impl Iterator<Item = (&str, &ComponentSet)> + '_ {
        self.overrides.iter().map(|(entity_type, set)| (entity_type.as_str(), set))
    }

    pub fn is_overridden(&self, entity_type: &str) -> bool {
        self.overrides.contains_key(entity_type)
    }
}

/// The finished, installable partition configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionScheme {
    pub partition_worker_types: Vec<String>,
    pub client_load_balancing: BTreeMap<String, ComponentSet>,
    pub singletons: BTreeMap<EntityId, EntityLoadBalancingMap>,
}

impl PartitionScheme {
    /// Assignment anchored at `anchor`, if any.
    pub fn singleton(&self, anchor: EntityId) -> Option<&EntityLoadBalancingMap> {
        self.singletons.get(&anchor)
    }
}

/// Load-balancing subsystem that accepts a [`PartitionScheme`].
#[async_trait]
pub trait PartitionInstaller: Send + Sync {
    async fn install(&self, scheme: &PartitionScheme) -> Result<(), InstallError>;
}

/// Builder for a [`PartitionScheme`]; operations apply in call order.
#[derive(Debug, Clone, Default)]
pub struct PartitionConfiguration {
    partition_worker_types: Vec<String>,
    client_load_balancing: BTreeMap<String, ComponentSet>,
    singletons: BTreeMap<EntityId, EntityLoadBalancingMap>,
}

impl PartitionConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares worker types taking part in partition ownership.
    ///
    /// Worker types already declared are ignored.
    pub fn add_partition_management<I, S>(&mut self, worker_types: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for worker_type in worker_types {
            let worker_type = worker_type.into();
            if !self.partition_worker_types.contains(&worker_type) {
                self.partition_worker_types.push(worker_type);
            }
        }
        self
    }

    /// Declares the component set exposed by `entity_type` when a client-class worker owns it.
    pub fn add_client_load_balancing(&mut self, entity_type: impl Into<String>, client_set: ComponentSet) -> &mut Self {
        self.client_load_balancing.insert(entity_type.into(), client_set);
        self
    }

    /// Installs the canonical assignment anchored at `anchor`.
    ///
    /// Fails if an assignment was already set for the same anchor.
    pub fn set_singleton_load_balancing(
        &mut self,
        anchor: EntityId,
        assignment: EntityLoadBalancingMap,
    ) -> Result<&mut Self, ConfigurationError> {
        if self.singletons.contains_key(&anchor) {
            return Err(ConfigurationError::DuplicateSingleton(anchor));
        }
        self.singletons.insert(anchor, assignment);
        Ok(self)
    }

    pub fn partition_worker_types(&self) -> &[String] {
        &self.partition_worker_types
    }

    /// Finishes the configuration. At least one singleton assignment is required.
    pub fn build(self) -> Result<PartitionScheme, ConfigurationError> {
        if self.singletons.is_empty() {
            return Err(ConfigurationError::MissingSingleton);
        }

        Ok(PartitionScheme {
            partition_worker_types: self.partition_worker_types,
            client_load_balancing: self.client_load_balancing,
            singletons: self.singletons,
        })
    }

    /// Builds the scheme and hands it to `installer`.
    pub async fn install(self, installer: &dyn PartitionInstaller) -> Result<PartitionScheme, crate::BootstrapError> {
        let scheme = self.build()?;
        installer.install(&scheme).await?;

        info!(
            "⚖️ Installed load balancing: {} partition worker types, {} client entity types, {} singleton anchors",
            scheme.partition_worker_types.len(),
            scheme.client_load_balancing.len(),
            scheme.singletons.len()
        );
        Ok(scheme)
    }
}
