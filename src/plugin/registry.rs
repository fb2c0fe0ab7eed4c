//! Plugin registry.
//!
//! # Responsibilities
//! - Hold every plugin known to the process, keyed by name
//! - Reject duplicate and empty names
//! - Hand out snapshots for ordering and mounting
//!
//! # Design Decisions
//! - Storage order is irrelevant; callers must order snapshots themselves
//! - Bootstrap consumes the registry, so nothing can register after mounting starts

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::plugin::PluginUnit;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A plugin with this name is already registered.
    #[error("plugin {0:?} is already registered")]
    DuplicateName(String),

    #[error("plugin name must not be empty")]
    EmptyName,
}

#[derive(Default)]
pub struct Registry {
    plugins: HashMap<String, Arc<dyn PluginUnit>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plugin. The registry is left unchanged on error.
    pub fn register(&mut self, plugin: Arc<dyn PluginUnit>) -> Result<(), RegistryError> {
        let name = plugin.name().to_string();
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.plugins.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }

        tracing::debug!(plugin = %name, "Plugin registered");
        self.plugins.insert(name, plugin);
        Ok(())
    }

    /// Copy of all registered plugins, in no particular order.
    pub fn snapshot(&self) -> Vec<Arc<dyn PluginUnit>> {
        self.plugins.values().cloned().collect()
    }

    /// Registered plugin names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.plugins.keys().cloned().collect();
        names.sort();
        names
    }

    /// Human readable plugin listing.
    pub fn describe(&self) -> String {
        let names = self.names();
        let mut out = format!("{} registered plugin(s):", names.len());
        for name in names {
            out.push_str("\n  - ");
            out.push_str(&name);
        }
        out
    }

    pub fn contains(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
