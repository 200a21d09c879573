//! Plugin Orchestrator - runs the composition state machine.
//!
//! ```text
//! Init -> Rendering/Writing -> Modifying -> Aggregating -> Done
//!   \
//!    -> Aborted   (invalid configuration only)
//! ```
//!
//! - `Init` validates the context and resolves every requested plugin
//! - `Rendering`/`Writing` render and write each plugin's files, plugin by
//!   plugin; a failed write skips that plugin's remaining files
//! - `Modifying` applies each plugin's modifications, after every file exists
//! - `Aggregating` merges every plugin's packages into one ledger
//!
//! Plugins are always processed in the order they were requested. All tree
//! mutations happen on this one thread, in that order.
//!
//! Every error after `Init` is collected into the [`RunReport`] against the
//! plugin that caused it; the run always reaches `Done`.

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{
    application::ports::PluginRegistry,
    domain::{
        ConfigContext, ContentRenderer, DependencyAggregator, DependencyLedger, DomainError,
        DomainValidator, FileTree, LogicalFileAlias, ModificationEngine, ModificationOutcome,
        PluginDescriptor, PluginId, ProjectPath, WriteOutcome,
    },
    error::{GraftError, GraftResult},
};

/// States of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunPhase {
    Init,
    Rendering,
    Writing,
    Modifying,
    Aggregating,
    Done,
    Aborted,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Init => "init",
            Self::Rendering => "rendering",
            Self::Writing => "writing",
            Self::Modifying => "modifying",
            Self::Aggregating => "aggregating",
            Self::Done => "done",
            Self::Aborted => "aborted",
        };
        f.write_str(s)
    }
}

/// A collected, non-fatal error.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginFailure {
    pub plugin: PluginId,
    pub phase: RunPhase,
    pub error: DomainError,
}

impl fmt::Display for PluginFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} failed: {}", self.plugin, self.phase, self.error)
    }
}

/// What one plugin did during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginSummary {
    pub plugin: PluginId,
    pub created: Vec<ProjectPath>,
    /// Files that already held the rendered content.
    pub unchanged: Vec<ProjectPath>,
    pub modified: Vec<LogicalFileAlias>,
    /// Modifications whose effect was already present.
    pub already_applied: Vec<LogicalFileAlias>,
}

impl PluginSummary {
    fn new(plugin: PluginId) -> Self {
        Self {
            plugin,
            created: Vec::new(),
            unchanged: Vec::new(),
            modified: Vec::new(),
            already_applied: Vec::new(),
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub context: ConfigContext,
    pub phase: RunPhase,
    pub tree: FileTree,
    pub ledger: DependencyLedger,
    /// Collected errors, in the order they occurred.
    pub failures: Vec<PluginFailure>,
    /// One entry per plugin, in run order.
    pub plugins: Vec<PluginSummary>,
}

impl RunReport {
    /// True when no error was collected.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures_for<'a>(&'a self, plugin: &'a PluginId) -> impl Iterator<Item = &'a PluginFailure> {
        self.failures.iter().filter(move |f| &f.plugin == plugin)
    }

    pub fn summary_for(&self, plugin: &PluginId) -> Option<&PluginSummary> {
        self.plugins
            .iter()
            .find(|s| &s.plugin == plugin)
    }
}

/// Runs plugins against a file tree.
///
/// The registry is injected, so different runs (and tests) can use different
/// plugin sets side by side.
pub struct PluginOrchestrator {
    registry: Box<dyn PluginRegistry>,
}

impl PluginOrchestrator {
    pub fn new(registry: Box<dyn PluginRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &dyn PluginRegistry {
        self.registry.as_ref()
    }

    /// `Init`: validate the context and fetch its plugins in run order.
    pub fn resolve(&self, ctx: &ConfigContext) -> GraftResult<Vec<PluginDescriptor>> {
        let available = self.registry.list()?;
        DomainValidator::resolve_selection(ctx, &available).map_err(GraftError::from)
    }

    /// Every path the run would write, without touching a tree.
    pub fn planned_paths(&self, ctx: &ConfigContext) -> GraftResult<Vec<ProjectPath>> {
        let mut paths = Vec::new();
        for plugin in self.resolve(ctx)? {
            paths.extend(ContentRenderer::target_paths(ctx, &plugin)?);
        }
        paths.sort();
        paths.dedup();
        Ok(paths)
    }

    /// Run every plugin of `ctx` against `tree`.
    ///
    /// Returns `Err` only for an invalid configuration (the run is aborted
    /// before the tree is touched) or a registry failure.
    #[instrument(skip_all, fields(context = %ctx))]
    pub fn run(&self, ctx: &ConfigContext, tree: FileTree) -> GraftResult<RunReport> {
        let run_id = Uuid::new_v4();
        debug!(%run_id, phase = %RunPhase::Init, "Starting run");

        let plugins = match self.resolve(ctx) {
            Ok(p) => p,
            Err(e) => {
                warn!(%run_id, phase = %RunPhase::Aborted, error = %e, "Run aborted");
                return Err(e);
            }
        };

        let mut report = RunReport {
            run_id,
            context: ctx.clone(),
            phase: RunPhase::Init,
            tree,
            ledger: DependencyLedger::new(),
            failures: Vec::new(),
            plugins: plugins
                .iter()
                .map(|p| PluginSummary::new(p.id.clone()))
                .collect(),
        };

        for (idx, plugin) in plugins.iter().enumerate() {
            if let Some(msg) = &plugin.metadata.initializing_message {
                info!(plugin = %plugin.id, "{msg}");
            }
            Self::create_files(ctx, plugin, &mut report, idx);
        }

        report.phase = RunPhase::Modifying;
        for (idx, plugin) in plugins.iter().enumerate() {
            Self::apply_modifications(plugin, &mut report, idx);
        }

        report.phase = RunPhase::Aggregating;
        let (ledger, conflicts) = DependencyAggregator::aggregate(ctx, &plugins);
        report.ledger = ledger;
        for (plugin, error) in conflicts {
            Self::collect(&mut report, &plugin, RunPhase::Aggregating, error);
        }

        report.phase = RunPhase::Done;
        info!(
            %run_id,
            files = report.tree.changed_by_plugins().count(),
            packages = report.ledger.len(),
            failures = report.failures.len(),
            "Run finished"
        );
        Ok(report)
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    fn create_files(ctx: &ConfigContext, plugin: &PluginDescriptor, report: &mut RunReport, idx: usize) {
        for spec in &plugin.files {
            report.phase = RunPhase::Rendering;
            let rendered = match ContentRenderer::render_file(ctx, spec) {
                Ok(r) => r,
                Err(error) => {
                    Self::collect(report, &plugin.id, RunPhase::Rendering, error);
                    return;
                }
            };

            report.phase = RunPhase::Writing;
            match report.tree.write(&rendered.path, rendered.content, &plugin.id) {
                Ok(WriteOutcome::Created) => {
                    debug!(plugin = %plugin.id, path = %rendered.path, "Created");
                    report.plugins[idx].created.push(rendered.path.clone());
                }
                Ok(WriteOutcome::Unchanged) => {
                    debug!(plugin = %plugin.id, path = %rendered.path, "Already up to date");
                    report.plugins[idx].unchanged.push(rendered.path.clone());
                }
                Err(error) => {
                    // Remaining files of this plugin are skipped.
                    Self::collect(report, &plugin.id, RunPhase::Writing, error);
                    return;
                }
            }

            if let Some(alias) = rendered.alias {
                if let Err(error) = report.tree.bind_alias(alias, rendered.path) {
                    Self::collect(report, &plugin.id, RunPhase::Writing, error);
                }
            }
        }
    }

    fn apply_modifications(plugin: &PluginDescriptor, report: &mut RunReport, idx: usize) {
        let mut seen = HashSet::new();
        for (alias, spec) in &plugin.modifications {
            if !seen.insert(alias) {
                let error = DomainError::RedundantModification {
                    target: alias.to_string(),
                };
                Self::collect(report, &plugin.id, RunPhase::Modifying, error);
                continue;
            }

            match ModificationEngine::apply(&mut report.tree, alias, spec, &plugin.id) {
                Ok(ModificationOutcome::Applied) => {
                    debug!(plugin = %plugin.id, %alias, "Modified");
                    report.plugins[idx].modified.push(alias.clone());
                }
                Ok(ModificationOutcome::AlreadyApplied) => {
                    debug!(plugin = %plugin.id, %alias, "Modification already present");
                    report.plugins[idx].already_applied.push(alias.clone());
                }
                Ok(ModificationOutcome::NoOp) => {}
                Err(error) => Self::collect(report, &plugin.id, RunPhase::Modifying, error),
            }
        }
    }

    fn collect(report: &mut RunReport, plugin: &PluginId, phase: RunPhase, error: DomainError) {
        warn!(plugin = %plugin, %phase, error = %error, "Plugin step failed");
        report.failures.push(PluginFailure {
            plugin: plugin.clone(),
            phase,
            error,
        });
    }
}
