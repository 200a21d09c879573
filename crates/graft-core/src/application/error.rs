//! Application layer errors.
//!
//! These errors represent failures in orchestration, not composition logic.
//! Composition errors are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// Plugin not in the registry.
    #[error("Plugin not found: {id}")]
    PluginNotFound { id: String },

    /// Registry access failed (lock poisoned, etc.).
    #[error("Plugin registry error")]
    RegistryLock,

    /// A plugin manifest could not be loaded.
    #[error("Failed to load plugin manifest {path}: {reason}")]
    ManifestInvalid { path: PathBuf, reason: String },

    /// The project directory does not look like the requested kind.
    #[error("No {kind} project found at {path}")]
    ProjectNotFound { path: PathBuf, kind: String },

    /// The package manager exited unsuccessfully.
    #[error("Package installation failed ({command}): {reason}")]
    InstallFailed { command: String, reason: String },

    /// Validation failed (application-level, not domain).
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
            ],
            Self::PluginNotFound { id } => vec![
                format!("No plugin named '{id}' is installed"),
                "Try: graft list".into(),
            ],
            Self::RegistryLock => vec![
                "The plugin registry is locked".into(),
                "Try again in a moment".into(),
            ],
            Self::ManifestInvalid { path, .. } => vec![
                format!("Fix or remove {}", path.display()),
                "Run with -v to see which field failed".into(),
            ],
            Self::ProjectNotFound { path, kind } => vec![
                format!("Expected a {kind} project in {}", path.display()),
                "Run graft from the project root, or pass --kind".into(),
            ],
            Self::InstallFailed { command, .. } => vec![
                format!("Re-run manually: {command}"),
                "Or use --no-install and install the packages yourself".into(),
            ],
            Self::ValidationFailed(_) => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::FilesystemError { .. } | Self::RegistryLock | Self::InstallFailed { .. } => {
                ErrorCategory::Internal
            }
            Self::PluginNotFound { .. } | Self::ProjectNotFound { .. } => ErrorCategory::NotFound,
            Self::ManifestInvalid { .. } => ErrorCategory::Configuration,
            Self::ValidationFailed(_) => ErrorCategory::Validation,
        }
    }
}
