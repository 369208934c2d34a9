//! Name-based description of a worker's load-balancing setup.
//!
//! A recipe refers to component sets by name so it can live in a config file;
//! [`LoadBalancingRecipe::configure`] resolves the names against a
//! [`ComponentSetRegistry`].

use crate::error::ConfigurationError;
use crate::partition::{ComponentSetRegistry, EntityId, EntityLoadBalancingMap, PartitionConfiguration, SINGLETON_ANCHOR};
use serde::{Deserialize, Serialize};

/// Client-side visibility for one entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientLoadBalancing {
    pub entity_type: String,
    pub component_set: String,
}

/// Override of the default server set for one entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityOverride {
    pub entity_type: String,
    pub component_set: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBalancingRecipe {
    /// Entity anchoring the canonical assignment
    #[serde(default = "default_singleton_anchor")]
    pub singleton_anchor: EntityId,
    /// Component set applied to entity types without an override
    pub default_component_set: String,
    /// Worker types taking part in partition ownership
    #[serde(default)]
    pub partition_worker_types: Vec<String>,
    #[serde(default)]
    pub client_load_balancing: Vec<ClientLoadBalancing>,
    /// Applied in order; later entries win for the same entity type
    #[serde(default)]
    pub overrides: Vec<EntityOverride>,
}

fn default_singleton_anchor() -> EntityId {
    SINGLETON_ANCHOR
}

impl LoadBalancingRecipe {
    /// Names of every component set the recipe refers to.
    pub fn referenced_sets(&self) -> Vec<&str> {
        let mut names = vec![self.default_component_set.as_str()];
        names.extend(self.client_load_balancing.iter().map(|c| c.component_set.as_str()));
        names.extend(self.overrides.iter().map(|o| o.component_set.as_str()));
        names
    }

    /// Resolves the recipe into a ready-to-install [`PartitionConfiguration`].
    pub fn configure(&self, registry: &ComponentSetRegistry) -> Result<PartitionConfiguration, ConfigurationError> {
        let mut configuration = PartitionConfiguration::new();
        configuration.add_partition_management(self.partition_worker_types.iter().cloned());

        for client in &self.client_load_balancing {
            let set = registry.get(&client.component_set)?.clone();
            configuration.add_client_load_balancing(client.entity_type.clone(), set);
        }

        let mut assignment = EntityLoadBalancingMap::new(registry.get(&self.default_component_set)?.clone());
        for entry in &self.overrides {
            assignment = assignment.add_override(entry.entity_type.clone(), registry.get(&entry.component_set)?.clone());
        }

        configuration.set_singleton_load_balancing(self.singleton_anchor, assignment)?;
        Ok(configuration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::{ComponentId, ComponentSet};

    fn registry() -> ComponentSetRegistry {
        ComponentSetRegistry::new()
            .with_set(ComponentSet::new("DefaultServerSet", [ComponentId(54)]))
            .with_set(ComponentSet::new("PlayerServerSet", [ComponentId(54), ComponentId(13000)]))
            .with_set(ComponentSet::new("PlayerClientSet", [ComponentId(13001)]))
    }

    fn recipe() -> LoadBalancingRecipe {
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

    #[test]
    fn test_configure_resolves_sets() {
        let scheme = recipe().configure(&registry()).unwrap().build().unwrap();
        let assignment = scheme.singleton(SINGLETON_ANCHOR).unwrap();

        assert_eq!(assignment.default_set().name(), "DefaultServerSet");
        assert_eq!(assignment.resolve("Character").name(), "PlayerServerSet");
        assert_eq!(scheme.client_load_balancing["Character"].name(), "PlayerClientSet");
        assert_eq!(scheme.partition_worker_types, vec!["UnityClient", "MobileClient"]);
    }

    #[test]
    fn test_unknown_set_is_fatal() {
        let mut recipe = recipe();
        recipe.overrides[0].component_set = "MissingSet".to_string();

        assert_eq!(
            recipe.configure(&registry()).err(),
            Some(ConfigurationError::UnknownComponentSet("MissingSet".to_string()))
        );
    }

    #[test]
    fn test_referenced_sets() {
        assert_eq!(
            recipe().referenced_sets(),
            vec!["DefaultServerSet", "PlayerClientSet", "PlayerServerSet"]
        );
    }
}
