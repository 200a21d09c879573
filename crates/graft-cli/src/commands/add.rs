//! Implementation of the `graft add` command.
//!
//! Responsibility: translate CLI arguments and config into a
//! `ConfigContext`, wire the adapters into a `ScaffoldService`, and display
//! the run report. No composition logic lives here.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use graft_adapters::{
    CommandInstaller, InMemoryRegistry, LocalFilesystem, LocalProjectReader, PackageManager,
    RecordingInstaller,
};
use graft_core::{
    application::{PluginSummary, RunPhase, ports::PackageInstaller},
    domain::{DependencyLedger, PluginId, ProjectKind},
    prelude::*,
};

use crate::{
    cli::{AddArgs, OutputFormat, global::GlobalArgs},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Execute the `graft add` command.
///
/// Dispatch sequence:
/// 1. Resolve kind, typing, package manager and install from flags + config
/// 2. Build the plugin registry (built-ins plus `plugins.directory`)
/// 3. Confirm with the user unless `--yes`, `--dry-run` or `--quiet`
/// 4. Run the scaffold service
/// 5. Print (or serialise) the report; exit 5 if any plugin failed
#[instrument(skip_all, fields(plugins = ?args.plugins, dir = %args.dir.display()))]
pub fn execute(
    args: AddArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    // 1. Resolve the run
    let settings = Settings::resolve(&args, &config)?;
    let ctx = build_context(&args.plugins, &settings)?;
    debug!(context = %ctx, manager = %settings.manager, install = settings.install, "Run resolved");

    // 2. Plugins
    let registry = build_registry(&config, &output)?;

    // 3. Confirm
    if !global.quiet && !args.yes && !args.dry_run && output.format() != OutputFormat::Json {
        show_plan(&ctx, &args.dir, &settings, &output)?;
        if !confirm()? {
            return Err(CliError::Cancelled);
        }
    }

    for id in ctx.active_plugins() {
        if let Some(message) = registry
            .get(id)
            .ok()
            .and_then(|p| p.metadata.initializing_message)
        {
            output.info(&message)?;
        }
    }

    // 4. Scaffold
    let installer: Box<dyn PackageInstaller> = if args.dry_run {
        Box::new(RecordingInstaller::new(settings.manager))
    } else {
        Box::new(CommandInstaller::new(settings.manager).quiet(output.is_quiet()))
    };
    let service = ScaffoldService::new(
        PluginOrchestrator::new(Box::new(registry)),
        Box::new(LocalProjectReader::local()),
        Box::new(LocalFilesystem::new()),
        installer,
    );

    let spinner = output.spinner(format!("Applying {} plugin(s)...", ctx.active_plugins().len()));
    let outcome = service.scaffold(
        &ctx,
        &args.dir,
        ScaffoldOptions {
            dry_run: args.dry_run,
            install: settings.install,
        },
    );
    spinner.finish_and_clear();
    let outcome = outcome?;

    info!(
        run_id = %outcome.report.run_id,
        written = outcome.written.len(),
        failures = outcome.report.failures.len(),
        "Scaffold finished"
    );

    // 5. Report
    let summary = RunSummary::new(&outcome, &args.dir, args.dry_run, settings.manager);
    if let Some(path) = &args.report {
        write_report(path, &summary)?;
    }
    if output.format() == OutputFormat::Json {
        output.json(&summary)?;
    } else {
        show_outcome(&outcome, &summary, &output)?;
    }

    if outcome.report.is_success() {
        Ok(())
    } else {
        let mut plugins: Vec<&str> = Vec::new();
        for failure in &outcome.report.failures {
            if !plugins.contains(&failure.plugin.as_str()) {
                plugins.push(failure.plugin.as_str());
            }
        }
        Err(CliError::PartialFailure {
            failed: outcome.report.failures.len(),
            plugins: plugins.join(", "),
        })
    }
}

// ── Resolution ────────────────────────────────────────────────────────────────

/// Flag values with config fallbacks applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Settings {
    kind: ProjectKind,
    typescript: bool,
    manager: PackageManager,
    install: bool,
}

impl Settings {
    fn resolve(args: &AddArgs, config: &AppConfig) -> CliResult<Self> {
        let kind = args
            .kind
            .map(ProjectKind::from)
            .or(config.defaults.project_kind)
            .ok_or(CliError::MissingProjectKind)?;

        Ok(Self {
            kind,
            typescript: args.static_typing().unwrap_or(config.defaults.typescript),
            manager: args
                .package_manager
                .map(PackageManager::from)
                .unwrap_or(config.defaults.package_manager),
            install: config.install.enabled && !args.no_install,
        })
    }
}

fn build_context(plugins: &[String], settings: &Settings) -> CliResult<ConfigContext> {
    let ids = plugins
        .iter()
        .map(|p| PluginId::parse(p.as_str()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| CliError::Core(e.into()))?;

    ConfigContext::builder()
        .project_kind(settings.kind)
        .static_typing(settings.typescript)
        .plugins(ids)
        .build()
        .map_err(|e| CliError::Core(e.into()))
}

/// Built-in plugins, then the configured plugin directory (if it exists).
pub(crate) fn build_registry(config: &AppConfig, output: &OutputManager) -> CliResult<InMemoryRegistry> {
    let registry = InMemoryRegistry::with_builtin()?;

    if let Some(dir) = &config.plugins.directory {
        if dir.is_dir() {
            let count = registry.load_dir(dir)?;
            debug!(count, dir = %dir.display(), "User plugins loaded");
        } else {
            warn!(dir = %dir.display(), "Plugin directory does not exist");
            output.warning(&format!(
                "Plugin directory {} does not exist, using built-in plugins only",
                dir.display()
            ))?;
        }
    }

    Ok(registry)
}

// ── Report ────────────────────────────────────────────────────────────────────

/// Serialisable view of one run, for `--report` and `--output-format json`.
#[derive(Debug, Serialize)]
struct RunSummary<'a> {
    run_id: Uuid,
    finished_at: DateTime<Utc>,
    root: &'a Path,
    project_kind: ProjectKind,
    typescript: bool,
    dry_run: bool,
    phase: RunPhase,
    success: bool,
    plugins: &'a [PluginSummary],
    failures: Vec<FailureEntry>,
    dependencies: &'a DependencyLedger,
    /// Commands that ran, or would run on a real invocation.
    install_commands: Vec<String>,
    installed: bool,
    written: &'a [PathBuf],
}

#[derive(Debug, Serialize)]
struct FailureEntry {
    plugin: String,
    phase: RunPhase,
    message: String,
}

impl<'a> RunSummary<'a> {
    fn new(outcome: &'a ScaffoldOutcome, root: &'a Path, dry_run: bool, manager: PackageManager) -> Self {
        let report = &outcome.report;
        Self {
            run_id: report.run_id,
            finished_at: Utc::now(),
            root,
            project_kind: report.context.project_kind(),
            typescript: report.context.uses_static_typing(),
            dry_run,
            phase: report.phase,
            success: report.is_success(),
            plugins: &report.plugins,
            failures: report
                .failures
                .iter()
                .map(|f| FailureEntry {
                    plugin: f.plugin.to_string(),
                    phase: f.phase,
                    message: f.error.to_string(),
                })
                .collect(),
            dependencies: &report.ledger,
            install_commands: manager
                .plan(&report.ledger)
                .iter()
                .map(ToString::to_string)
                .collect(),
            installed: outcome.installed,
            written: &outcome.written,
        }
    }
}

fn write_report(path: &Path, summary: &RunSummary<'_>) -> CliResult<()> {
    let json = serde_json::to_string_pretty(summary).map_err(|e| CliError::InvalidInput {
        message: format!("could not serialise the run report: {e}"),
        source: Some(Box::new(e)),
    })?;
    std::fs::write(path, json).map_err(|e| CliError::IoError {
        message: format!("Failed to write report to '{}'", path.display()),
        source: e,
    })
}

// ── UI helpers ────────────────────────────────────────────────────────────────

fn show_plan(ctx: &ConfigContext, dir: &Path, settings: &Settings, out: &OutputManager) -> CliResult<()> {
    let plugins: Vec<&str> = ctx.active_plugins().iter().map(PluginId::as_str).collect();

    out.header("Plan")?;
    out.print(&format!("  Plugins:         {}", plugins.join(", ")))?;
    out.print(&format!("  Project kind:    {}", settings.kind))?;
    out.print(&format!(
        "  Language:        {}",
        if settings.typescript { "TypeScript" } else { "JavaScript" }
    ))?;
    out.print(&format!("  Location:        {}", dir.display()))?;
    out.print(&format!(
        "  Install:         {}",
        if settings.install {
            settings.manager.as_str()
        } else {
            "skipped"
        }
    ))?;
    out.print("")?;
    Ok(())
}

fn show_outcome(outcome: &ScaffoldOutcome, summary: &RunSummary<'_>, out: &OutputManager) -> CliResult<()> {
    let report = &outcome.report;

    for plugin in &report.plugins {
        out.header(plugin.plugin.as_str())?;
        for path in &plugin.created {
            out.success(&format!("created   {path}"))?;
        }
        for alias in &plugin.modified {
            out.success(&format!("modified  {alias}"))?;
        }
        for path in &plugin.unchanged {
            out.info(&format!("unchanged {path}"))?;
        }
        for alias in &plugin.already_applied {
            out.info(&format!("unchanged {alias} (already applied)"))?;
        }
    }

    for failure in &report.failures {
        out.error(&failure.to_string())?;
    }

    out.print("")?;
    if summary.dry_run {
        out.info(&format!(
            "Dry run: {} file(s) would be written",
            report.tree.changed_by_plugins().count()
        ))?;
        for command in &summary.install_commands {
            out.info(&format!("would run: {command}"))?;
        }
        return Ok(());
    }

    out.success(&format!("{} file(s) written", outcome.written.len()))?;
    if outcome.installed {
        out.success(&format!("{} package(s) installed", report.ledger.len()))?;
    } else if !report.ledger.is_empty() {
        out.info("Package installation skipped; run:")?;
        for command in &summary.install_commands {
            out.print(&format!("  {command}"))?;
        }
    }
    Ok(())
}

#[cfg(feature = "interactive")]
fn confirm() -> CliResult<bool> {
    use std::io::IsTerminal;

    if !std::io::stdin().is_terminal() {
        return Ok(true);
    }
    dialoguer::Confirm::new()
        .with_prompt("Continue?")
        .default(true)
        .interact()
        .map_err(|e| CliError::IoError {
            message: "failed to read confirmation input".into(),
            source: std::io::Error::other(e),
        })
}

#[cfg(not(feature = "interactive"))]
fn confirm() -> CliResult<bool> {
    use std::io::{self, IsTerminal, Write};

    if !io::stdin().is_terminal() {
        return Ok(true);
    }

    print!("Continue? [Y/n] ");
    io::stdout().flush().map_err(|e| CliError::IoError {
        message: "failed to flush stdout".into(),
        source: e,
    })?;

    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .map_err(|e| CliError::IoError {
            message: "failed to read confirmation input".into(),
            source: e,
        })?;

    let input = input.trim().to_ascii_lowercase();
    Ok(input.is_empty() || input == "y" || input == "yes")
}

// ── Tests ─────────────────────────────────────────────────────────────────────
