//! Canonical plugin registry: a single registry that both phases draw from,
//! so adding a plugin is a one-line change here rather than a change to the
//! phase loop. Seeded from the built-in plugins each phase crate ships, with
//! `register_*` methods for callers that want to add more.

use codegraph_core::{CodeGraphError, GraphStore, Result};
use codegraph_enrich::EnrichmentPlugin;
use codegraph_validate::ValidationPlugin;
use std::collections::HashMap;

use crate::topo::topo_sort;

pub struct PluginRegistry<S: GraphStore> {
    enrichment: HashMap<String, Box<dyn EnrichmentPlugin<S>>>,
    validation: HashMap<String, Box<dyn ValidationPlugin<S>>>,
}

impl<S: GraphStore + 'static> Default for PluginRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: GraphStore + 'static> PluginRegistry<S> {
    pub fn new() -> Self {
        let mut registry = Self {
            enrichment: HashMap::new(),
            validation: HashMap::new(),
        };
        for plugin in codegraph_enrich::default_plugins::<S>() {
            registry.enrichment.insert(plugin.name().to_string(), plugin);
        }
        for plugin in codegraph_validate::default_plugins::<S>() {
            registry.validation.insert(plugin.name().to_string(), plugin);
        }
        registry
    }

    pub fn register_enrichment(&mut self, plugin: Box<dyn EnrichmentPlugin<S>>) {
        self.enrichment.insert(plugin.name().to_string(), plugin);
    }

    pub fn register_validation(&mut self, plugin: Box<dyn ValidationPlugin<S>>) {
        self.validation.insert(plugin.name().to_string(), plugin);
    }

    /// Resolves `names` (the workspace config's `plugins.enrichment` list,
    /// empty meaning "every registered plugin") against the registry and
    /// returns them ordered so each plugin follows its declared
    /// dependencies.
    pub fn enrichment_plugins(&self, names: &[String]) -> Result<Vec<&dyn EnrichmentPlugin<S>>> {
        let selected = self.select_names(names, self.enrichment.keys());
        let sorted = topo_sort(&selected, |n| {
            self.enrichment
                .get(n)
                .map(|p| p.dependencies().iter().map(|d| d.to_string()).collect())
                .unwrap_or_default()
        })?;
        sorted
            .into_iter()
            .map(|name| {
                self.enrichment
                    .get(&name)
                    .map(|p| p.as_ref())
                    .ok_or_else(|| CodeGraphError::Plugin(format!("unknown enrichment plugin '{name}'")))
            })
            .collect()
    }

    pub fn validation_plugins(&self, names: &[String]) -> Result<Vec<&dyn ValidationPlugin<S>>> {
        let selected = self.select_names(names, self.validation.keys());
        let sorted = topo_sort(&selected, |n| {
            self.validation
                .get(n)
                .map(|p| p.dependencies().iter().map(|d| d.to_string()).collect())
                .unwrap_or_default()
        })?;
        sorted
            .into_iter()
            .map(|name| {
                self.validation
                    .get(&name)
                    .map(|p| p.as_ref())
                    .ok_or_else(|| CodeGraphError::Plugin(format!("unknown validation plugin '{name}'")))
            })
            .collect()
    }

    fn select_names<'a>(&self, configured: &[String], all: impl Iterator<Item = &'a String>) -> Vec<String> {
        if configured.is_empty() {
            let mut names: Vec<String> = all.cloned().collect();
            names.sort();
            names
        } else {
            configured.to_vec()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_storage::mem::MemoryGraphStore;

    #[test]
    fn empty_config_selects_every_registered_plugin_sorted() {
        let registry = PluginRegistry::<MemoryGraphStore>::new();
        let plugins = registry.enrichment_plugins(&[]).unwrap();
        let names: Vec<&str> = plugins.iter().map(|p| p.name()).collect();
        let mut expected = names.clone();
        expected.sort();
        assert_eq!(names, expected);
        assert!(names.contains(&"ImportExportLinker"));
    }

    #[test]
    fn dependency_ordering_is_respected() {
        let registry = PluginRegistry::<MemoryGraphStore>::new();
        let names = vec!["InstanceOfResolver".to_string(), "ImportExportLinker".to_string()];
        let plugins = registry.enrichment_plugins(&names).unwrap();
        let order: Vec<&str> = plugins.iter().map(|p| p.name()).collect();
        let linker_pos = order.iter().position(|n| *n == "ImportExportLinker").unwrap();
        let resolver_pos = order.iter().position(|n| *n == "InstanceOfResolver").unwrap();
        assert!(linker_pos < resolver_pos);
    }

    #[test]
    fn unknown_plugin_name_errors() {
        let registry = PluginRegistry::<MemoryGraphStore>::new();
        let err = registry.enrichment_plugins(&["DoesNotExist".to_string()]).unwrap_err();
        assert!(err.to_string().contains("unknown"));
    }
}
