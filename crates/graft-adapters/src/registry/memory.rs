//! In-memory plugin registry with built-in plugins.

use std::{
    collections::BTreeMap,
    path::Path,
    sync::{Arc, RwLock},
};

use tracing::{info, instrument};

use graft_core::{
    application::{ApplicationError, ports::PluginRegistry},
    domain::{DomainValidator, PluginDescriptor, PluginId},
    error::GraftResult,
};

use crate::{builtin_plugins, plugin_loader::ManifestPluginLoader};

/// Thread-safe in-memory plugin registry. Clones share contents.
#[derive(Clone, Default)]
pub struct InMemoryRegistry {
    inner: Arc<RwLock<BTreeMap<PluginId, PluginDescriptor>>>,
}

impl InMemoryRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in plugins loaded.
    pub fn with_builtin() -> GraftResult<Self> {
        let registry = Self::new();
        registry.load_builtin()?;
        Ok(registry)
    }

    pub fn load_builtin(&self) -> GraftResult<()> {
        for plugin in builtin_plugins::all()? {
            self.insert(plugin)?;
        }
        Ok(())
    }

    /// Load every `plugin.toml` under `dir`. A manifest plugin with the id
    /// of an existing plugin replaces it.
    #[instrument(skip(self), fields(dir = %dir.display()))]
    pub fn load_dir(&self, dir: &Path) -> GraftResult<usize> {
        let plugins = ManifestPluginLoader::new(dir).load_all()?;
        let count = plugins.len();
        for plugin in plugins {
            self.insert(plugin)?;
        }
        info!(count, "plugins loaded from directory");
        Ok(count)
    }

    /// Number of plugins.
    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PluginRegistry for InMemoryRegistry {
    fn get(&self, id: &PluginId) -> GraftResult<PluginDescriptor> {
        let inner = self.inner.read().map_err(|_| ApplicationError::RegistryLock)?;

        inner.get(id).cloned().ok_or_else(|| {
            ApplicationError::PluginNotFound { id: id.to_string() }.into()
        })
    }

    fn list(&self) -> GraftResult<Vec<PluginDescriptor>> {
        let inner = self.inner.read().map_err(|_| ApplicationError::RegistryLock)?;
        Ok(inner.values().cloned().collect())
    }

    fn insert(&self, plugin: PluginDescriptor) -> GraftResult<()> {
        // Validate before insertion
        DomainValidator::validate_plugin(&plugin)?;

        let mut inner = self.inner.write().map_err(|_| ApplicationError::RegistryLock)?;
        inner.insert(plugin.id.clone(), plugin);
        Ok(())
    }
}
