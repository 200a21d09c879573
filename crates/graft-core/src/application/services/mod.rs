//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "add these plugins to a project".

pub mod orchestrator;
pub mod plugin_service;
pub mod scaffold_service;

pub use orchestrator::{PluginFailure, PluginOrchestrator, PluginSummary, RunPhase, RunReport};
pub use plugin_service::PluginService;
pub use scaffold_service::{PluginInfo, ScaffoldOptions, ScaffoldOutcome, ScaffoldService};
