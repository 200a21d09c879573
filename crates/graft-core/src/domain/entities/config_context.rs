//! The `ConfigContext` value and its typestate builder.
//!
//! A `ConfigContext` is the immutable description of one composition run:
//! which kind of project is being extended, whether it uses static typing,
//! and which plugins were requested, in order. Every renderer, modification
//! and dependency resolver receives it read-only.
//!
//! # Typestate builder
//!
//! The builder uses two phantom marker types (`NoKind` / `HasKind`) to enforce
//! at *compile time* that the project kind is set before anything else.
//! Runtime validation (`validate`) still runs at `build()` for the invariants
//! the type system cannot express.
//!
//! Whether each requested plugin exists and supports the kind is checked by
//! the orchestrator at run start, since only it can see the registry.

use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;

use crate::domain::{
    error::DomainError,
    value_objects::{PluginId, ProjectKind},
};

// ── Value ─────────────────────────────────────────────────────────────────────

/// Read-only context shared by every plugin in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigContext {
    project_kind: ProjectKind,
    uses_static_typing: bool,
    active_plugins: Vec<PluginId>,
}

impl ConfigContext {
    /// Start building a new `ConfigContext`.
    pub fn builder() -> ConfigContextBuilder<NoKind> {
        ConfigContextBuilder::new()
    }

    pub const fn project_kind(&self) -> ProjectKind {
        self.project_kind
    }

    pub const fn uses_static_typing(&self) -> bool {
        self.uses_static_typing
    }

    /// Requested plugins in application order.
    pub fn active_plugins(&self) -> &[PluginId] {
        &self.active_plugins
    }

    /// Whether `plugin` takes part in this run.
    pub fn is_active(&self, plugin: &PluginId) -> bool {
        self.active_plugins.contains(plugin)
    }

    /// Validate the context's internal consistency.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.active_plugins.is_empty() {
            return Err(DomainError::InvalidConfig(
                "at least one plugin must be requested".into(),
            ));
        }

        let mut seen = HashSet::new();
        for id in &self.active_plugins {
            if !seen.insert(id) {
                return Err(DomainError::InvalidConfig(format!(
                    "plugin '{id}' was requested more than once"
                )));
            }
        }

        Ok(())
    }
}

impl fmt::Display for ConfigContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lang = if self.uses_static_typing { "ts" } else { "js" };
        let plugins: Vec<&str> = self.active_plugins.iter().map(PluginId::as_str).collect();
        write!(f, "{} ({lang}) + [{}]", self.project_kind, plugins.join(", "))
    }
}

// ── Typestate markers ─────────────────────────────────────────────────────────

/// Marker: project kind has not yet been set.
pub struct NoKind;
/// Marker: project kind has been set.
pub struct HasKind;

// ── Builder ───────────────────────────────────────────────────────────────────

/// Typestate builder for [`ConfigContext`].
pub struct ConfigContextBuilder<K> {
    project_kind: Option<ProjectKind>,
    uses_static_typing: bool,
    active_plugins: Vec<PluginId>,
    _marker: PhantomData<K>,
}

impl ConfigContextBuilder<NoKind> {
    pub fn new() -> Self {
        Self {
            project_kind: None,
            uses_static_typing: true,
            active_plugins: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Set the project kind. This transitions the builder to `HasKind`.
    pub fn project_kind(self, kind: ProjectKind) -> ConfigContextBuilder<HasKind> {
        ConfigContextBuilder {
            project_kind: Some(kind),
            uses_static_typing: self.uses_static_typing,
            active_plugins: self.active_plugins,
            _marker: PhantomData,
        }
    }
}

impl Default for ConfigContextBuilder<NoKind> {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigContextBuilder<HasKind> {
    /// TypeScript (`true`, the default) or plain JavaScript.
    pub fn static_typing(mut self, enabled: bool) -> Self {
        self.uses_static_typing = enabled;
        self
    }

    /// Append one plugin to the run.
    pub fn plugin(mut self, id: PluginId) -> Self {
        self.active_plugins.push(id);
        self
    }

    /// Append several plugins, preserving their order.
    pub fn plugins(mut self, ids: impl IntoIterator<Item = PluginId>) -> Self {
        self.active_plugins.extend(ids);
        self
    }

    /// Build and validate.
    pub fn build(self) -> Result<ConfigContext, DomainError> {
        let project_kind = self
            .project_kind
            .ok_or_else(|| DomainError::InvalidConfig("project kind is required".into()))?;

        let ctx = ConfigContext {
            project_kind,
            uses_static_typing: self.uses_static_typing,
            active_plugins: self.active_plugins,
        };
        ctx.validate()?;
        Ok(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_defaults() {
        let ctx = ConfigContext::builder()
            .project_kind(ProjectKind::NextApp)
            .plugin(PluginId::new("dataFetching"))
            .build()
            .unwrap();

        assert_eq!(ctx.project_kind(), ProjectKind::NextApp);
        assert!(ctx.uses_static_typing());
        assert_eq!(ctx.active_plugins().len(), 1);
        assert_eq!(ctx.to_string(), "next (ts) + [dataFetching]");
    }

    #[test]
    fn rejects_empty_plugin_list() {
        let err = ConfigContext::builder()
            .project_kind(ProjectKind::ReactVite)
            .build()
            .unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn rejects_duplicate_plugins() {
        let err = ConfigContext::builder()
            .project_kind(ProjectKind::ReactCra)
            .plugins([PluginId::new("a"), PluginId::new("b"), PluginId::new("a")])
            .build()
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidConfig(msg) if msg.contains("'a'")));
    }
}
