// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for Graft.
//!
//! This module contains pure composition logic. All I/O (reading the base
//! project, writing files, running package managers) is handled via ports
//! defined in the application layer.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: No filesystem, network, or process calls
//! - **No tracing**: Observability belongs to the application and CLI layers
//! - **Value semantics**: Context, paths and specs are Clone + PartialEq
//!
// Public API - what the world sees
pub mod dependencies;
pub mod entities;
pub mod error;
pub mod modification;
pub mod rendering;
pub mod value_objects;

// Private implementation details - not visible outside domain
mod validation;

// Re-exports for convenience
pub use entities::{
    common::ProjectPath,
    config_context::{ConfigContext, ConfigContextBuilder, HasKind, NoKind},
    file_tree::{FileState, FileTree, HistoryEntry, Operation, Owner, WriteOutcome},
    plugin::{
        ContentFn, ContentSource, DependencyResolver, FileContent, FileSpec, ModificationSpec,
        PackageSpec, PluginDescriptor, PluginDescriptorBuilder, PluginMetadata,
    },
};

pub use dependencies::{DependencyAggregator, DependencyLedger, LedgerEntry, VersionConstraint};
pub use error::{DomainError, ErrorCategory};
pub use modification::{ModificationEngine, ModificationOutcome};
pub use rendering::{ContentRenderer, Placeholders, RenderedFile};
pub use validation::DomainValidator;

pub use value_objects::{DependencyKind, FileType, LogicalFileAlias, PluginId, ProjectKind};
