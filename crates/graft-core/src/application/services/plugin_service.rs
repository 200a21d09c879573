//! Plugin Service - registry management operations.
//!
//! Handles plugin lookup and registration. Separated from ScaffoldService
//! so the CLI can list and inspect plugins without a project on disk.

use crate::{
    application::ports::PluginRegistry,
    domain::{DomainValidator, PluginDescriptor, PluginId, ProjectKind},
    error::GraftResult,
};

/// Service for plugin operations.
pub struct PluginService {
    registry: Box<dyn PluginRegistry>,
}

impl PluginService {
    pub fn new(registry: Box<dyn PluginRegistry>) -> Self {
        Self { registry }
    }

    /// Get a plugin by id.
    pub fn get(&self, id: &PluginId) -> GraftResult<PluginDescriptor> {
        self.registry.get(id)
    }

    /// Validate and add (or replace) a plugin.
    pub fn register(&self, plugin: PluginDescriptor) -> GraftResult<()> {
        DomainValidator::validate_plugin(&plugin)?;
        self.registry.insert(plugin)
    }

    /// Plugins that support `kind`.
    pub fn for_kind(&self, kind: ProjectKind) -> GraftResult<Vec<PluginDescriptor>> {
        Ok(self
            .registry
            .list()?
            .into_iter()
            .filter(|p| p.supports(kind))
            .collect())
    }

    /// List all plugins.
    pub fn list(&self) -> GraftResult<Vec<PluginDescriptor>> {
        self.registry.list()
    }
}
