//! Plugin registry keyed on platform name
//!
//! Platform implementations register under a plugin name and the platform
//! tags they implement; callers resolve by name and the platform they are
//! running on.

use crate::plugin::LocationPlugin;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Name and supported platforms a plugin declares when registering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginRegistration {
    pub name: String,
    pub platforms: Vec<String>,
}

impl PluginRegistration {
    pub fn new(name: impl Into<String>, platforms: &[&str]) -> Self {
        Self {
            name: name.into(),
            platforms: platforms.iter().map(|p| p.to_string()).collect(),
        }
    }
}

#[derive(Default)]
pub struct PluginRegistry {
    /// (plugin name, platform tag) -> implementation
    plugins: RwLock<HashMap<(String, String), Arc<dyn LocationPlugin>>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `plugin` for every platform in `registration`. A later
    /// registration for the same name and platform replaces the earlier one.
    pub fn register(&self, registration: &PluginRegistration, plugin: Arc<dyn LocationPlugin>) {
        let mut plugins = self.plugins.write();
        for platform in &registration.platforms {
            let key = (registration.name.clone(), platform.clone());
            if plugins.insert(key, Arc::clone(&plugin)).is_some() {
                tracing::warn!(
                    "Plugin {} re-registered for platform {}",
                    registration.name,
                    platform
                );
            } else {
                tracing::info!("Registered plugin {} for platform {}", registration.name, platform);
            }
        }
    }

    pub fn resolve(&self, name: &str, platform: &str) -> Option<Arc<dyn LocationPlugin>> {
        self.plugins
            .read()
            .get(&(name.to_string(), platform.to_string()))
            .cloned()
    }

    /// Platform tags registered for `name`, sorted
    pub fn platforms(&self, name: &str) -> Vec<String> {
        let mut platforms: Vec<String> = self
            .plugins
            .read()
            .keys()
            .filter(|(n, _)| n == name)
            .map(|(_, p)| p.clone())
            .collect();
        platforms.sort();
        platforms
    }

    pub fn unregister(&self, name: &str, platform: &str) -> bool {
        self.plugins
            .write()
            .remove(&(name.to_string(), platform.to_string()))
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.plugins.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("entries", &self.len())
            .finish()
    }
}
