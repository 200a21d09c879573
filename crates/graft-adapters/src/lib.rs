//! Infrastructure adapters for Graft.
//!
//! This crate implements the ports defined in `graft_core::application::ports`.
//! It contains all external dependencies and I/O operations, plus the
//! plugins that ship with Graft.

pub mod builtin_plugins;
pub mod filesystem;
pub mod installer;
pub mod plugin_loader;
pub mod project;
pub mod registry;

// Re-export commonly used adapters
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use installer::{CommandInstaller, InstallCommand, PackageManager, RecordingInstaller};
pub use plugin_loader::ManifestPluginLoader;
pub use project::{LocalProjectReader, ProjectReader};
pub use registry::InMemoryRegistry;
