//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `graft-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `Filesystem`: File operations
//!   - `PluginRegistry`: Plugin lookup
//!   - `BaseProjectSource`: Loading the project to extend
//!   - `PackageInstaller`: Running the package manager
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (Defined in CLI layer, implemented by services)

pub mod output;

pub use output::{BaseProjectSource, Filesystem, PackageInstaller, PluginRegistry};

#[cfg(test)]
pub use output::{MockBaseProjectSource, MockFilesystem, MockPackageInstaller, MockPluginRegistry};
