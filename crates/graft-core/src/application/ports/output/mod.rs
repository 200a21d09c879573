//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `graft-adapters` crate provides implementations.

use std::path::Path;

use crate::domain::{DependencyLedger, FileTree, PluginDescriptor, PluginId, ProjectKind, ProjectPath};
use crate::error::GraftResult;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `graft_adapters::filesystem::LocalFilesystem` (production)
/// - `graft_adapters::filesystem::MemoryFilesystem` (testing)
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> GraftResult<()>;

    /// Write content to a file, replacing it if it exists.
    fn write_file(&self, path: &Path, content: &str) -> GraftResult<()>;

    /// Read a UTF-8 file.
    fn read_file(&self, path: &Path) -> GraftResult<String>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;
}

/// Port for plugin lookup.
///
/// Implemented by:
/// - `graft_adapters::registry::InMemoryRegistry` (built-in and manifest plugins)
#[cfg_attr(test, mockall::automock)]
pub trait PluginRegistry: Send + Sync {
    /// Get a plugin by id.
    fn get(&self, id: &PluginId) -> GraftResult<PluginDescriptor>;

    /// List all available plugins, sorted by id.
    fn list(&self) -> GraftResult<Vec<PluginDescriptor>>;

    /// Insert or replace a plugin.
    fn insert(&self, plugin: PluginDescriptor) -> GraftResult<()>;
}

/// Port that loads the generated project plugins are applied to.
///
/// Implemented by:
/// - `graft_adapters::project::ProjectReader` (any `Filesystem`)
#[cfg_attr(test, mockall::automock)]
pub trait BaseProjectSource: Send + Sync {
    /// Seed a tree with the project's aliased files plus any of `extra`
    /// that already exist, and bind the aliases.
    fn load(&self, root: &Path, kind: ProjectKind, extra: &[ProjectPath]) -> GraftResult<FileTree>;
}

/// Port that installs the aggregated packages.
///
/// Implemented by:
/// - `graft_adapters::installer::CommandInstaller` (npm, yarn, pnpm, bun)
/// - `graft_adapters::installer::RecordingInstaller` (dry runs and tests)
#[cfg_attr(test, mockall::automock)]
pub trait PackageInstaller: Send + Sync {
    /// Install every ledger entry into the project at `root`.
    fn install(&self, root: &Path, ledger: &DependencyLedger) -> GraftResult<()>;
}
