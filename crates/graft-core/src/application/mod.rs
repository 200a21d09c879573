//! Application layer for Graft.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (PluginOrchestrator, ScaffoldService, PluginService)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! composition rules itself. Those live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

// Re-export main services
pub use services::{
    PluginFailure, PluginInfo, PluginOrchestrator, PluginService, PluginSummary, RunPhase,
    RunReport, ScaffoldOptions, ScaffoldOutcome, ScaffoldService,
};

// Re-export port traits (for adapter implementation)
pub use ports::{BaseProjectSource, Filesystem, PackageInstaller, PluginRegistry};

pub use error::ApplicationError;
