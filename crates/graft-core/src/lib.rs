//! Graft Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for Graft, a
//! plugin-driven tool that composes features into an existing frontend
//! project, following hexagonal (ports and adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            graft-cli (CLI)              │
//! │     (Implements Driving Ports)          │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │ (ScaffoldService, PluginOrchestrator)   │
//! │         Orchestrates Use Cases          │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │ (Registry, Filesystem, Source, Install) │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │     graft-adapters (Infrastructure)     │
//! │ (InMemoryRegistry, LocalFilesystem, ..) │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │ (FileTree, ModificationEngine, Ledger)  │
//! │         No I/O, no logging              │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use graft_core::prelude::*;
//!
//! // 1. Describe the run
//! let ctx = ConfigContext::builder()
//!     .project_kind(ProjectKind::NextApp)
//!     .plugin(PluginId::new("dataFetching"))
//!     .build()?;
//!
//! // 2. Use application service (with injected adapters)
//! let service = ScaffoldService::new(orchestrator, source, filesystem, installer);
//! let outcome = service.scaffold(&ctx, "./my-app".as_ref(), ScaffoldOptions::default())?;
//! for failure in &outcome.report.failures {
//!     eprintln!("{failure}");
//! }
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        PluginOrchestrator, PluginService, RunPhase, RunReport, ScaffoldOptions,
        ScaffoldOutcome, ScaffoldService,
        ports::{BaseProjectSource, Filesystem, PackageInstaller, PluginRegistry},
    };
    pub use crate::domain::{
        ConfigContext, DependencyKind, DependencyLedger, FileContent, FileSpec, FileTree,
        FileType, LogicalFileAlias, ModificationSpec, PackageSpec, PluginDescriptor, PluginId,
        ProjectKind, ProjectPath,
    };
    pub use crate::error::{GraftError, GraftResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
