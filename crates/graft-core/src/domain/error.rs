// ============================================================================
// domain/error.rs - COMPOSITION ERROR DOMAIN
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (collected into run reports)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
///
/// Only the configuration variants are fatal to a run. Everything raised
/// while rendering, writing, modifying or aggregating is collected against
/// the plugin that caused it and the run continues.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Configuration Errors (fatal, raised before any work is done)
    // ========================================================================
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown plugin '{plugin}'")]
    UnknownPlugin {
        plugin: String,
        available: Vec<String>,
    },

    #[error("Plugin '{plugin}' does not support project kind '{kind}'")]
    UnsupportedProjectKind {
        plugin: String,
        kind: String,
        supported: Vec<String>,
    },

    #[error("Invalid plugin definition: {0}")]
    InvalidPlugin(String),

    // ========================================================================
    // File Tree Errors
    // ========================================================================
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("File {path} already exists (written by {existing_owner}); {new_owner} cannot overwrite it")]
    DuplicateFile {
        path: String,
        existing_owner: String,
        new_owner: String,
    },

    #[error("File not found in tree: {path}")]
    FileNotFound { path: String },

    #[error("Alias '{alias}' is not bound to any file")]
    AliasNotFound { alias: String },

    #[error("Alias '{alias}' is already bound to {existing}, cannot rebind to {requested}")]
    AliasConflict {
        alias: String,
        existing: String,
        requested: String,
    },

    // ========================================================================
    // Modification Errors
    // ========================================================================
    #[error("Anchor {anchor:?} not found in '{alias}' ({path})")]
    AnchorNotFound {
        alias: String,
        path: String,
        anchor: String,
    },

    #[error("'{target}' was already modified by this plugin")]
    RedundantModification { target: String },

    // ========================================================================
    // Dependency Errors
    // ========================================================================
    #[error("Conflicting versions of '{package}': {existing} (from {declared_by}) vs {requested}")]
    DependencyConflict {
        package: String,
        existing: String,
        requested: String,
        declared_by: String,
    },

    #[error("Invalid package spec '{spec}': {reason}")]
    InvalidPackage { spec: String, reason: String },
}

impl DomainError {
    /// Whether this error must abort the run instead of being collected.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig(_) | Self::UnknownPlugin { .. } | Self::UnsupportedProjectKind { .. }
        )
    }

    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidConfig(msg) => vec![
                "Check the plugins and project kind you passed".into(),
                format!("Details: {msg}"),
            ],
            Self::UnknownPlugin { available, .. } => {
                let mut s = vec!["Run 'graft list' to see installed plugins".into()];
                if !available.is_empty() {
                    s.push(format!("Available: {}", available.join(", ")));
                }
                s
            }
            Self::UnsupportedProjectKind { plugin, supported, .. } => vec![
                format!("'{plugin}' supports: {}", supported.join(", ")),
                "Pass --kind to override project detection".into(),
            ],
            Self::DuplicateFile { path, .. } => vec![
                format!("Two sources want to create {path}"),
                "Drop one of the plugins, or remove the existing file and re-run".into(),
            ],
            Self::AliasNotFound { alias } => vec![
                format!("The base project has no file registered as '{alias}'"),
                "Check that the project kind matches the project on disk".into(),
            ],
            Self::AnchorNotFound { path, anchor, .. } => vec![
                format!("Expected {anchor:?} somewhere in {path}"),
                "The file may have been edited by hand; restore the anchor and re-run".into(),
            ],
            Self::DependencyConflict { package, .. } => vec![
                format!("Two plugins need incompatible versions of '{package}'"),
                "Install a version manually that satisfies both, or drop one plugin".into(),
            ],
            Self::InvalidPlugin(_) | Self::InvalidPackage { .. } => vec![
                "The plugin definition is malformed".into(),
                "Check its plugin.toml against 'graft list --verbose' output".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidConfig(_)
            | Self::InvalidPlugin(_)
            | Self::InvalidPath { .. }
            | Self::InvalidPackage { .. } => ErrorCategory::Validation,
            Self::UnsupportedProjectKind { .. }
            | Self::DependencyConflict { .. }
            | Self::AliasConflict { .. } => ErrorCategory::Compatibility,
            Self::UnknownPlugin { .. }
            | Self::FileNotFound { .. }
            | Self::AliasNotFound { .. }
            | Self::AnchorNotFound { .. } => ErrorCategory::NotFound,
            Self::DuplicateFile { .. } | Self::RedundantModification { .. } => {
                ErrorCategory::Conflict
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Compatibility,
    NotFound,
    Conflict,
}
