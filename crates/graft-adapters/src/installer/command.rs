//! Runs the project's package manager.

use std::{
    fmt,
    path::Path,
    process::{Command, Stdio},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use graft_core::{
    application::{ApplicationError, ports::PackageInstaller},
    domain::{DependencyKind, DependencyLedger},
    error::GraftResult,
};

/// Supported package managers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    #[default]
    Npm,
    Yarn,
    Pnpm,
    Bun,
}

impl PackageManager {
    pub const ALL: [PackageManager; 4] = [Self::Npm, Self::Yarn, Self::Pnpm, Self::Bun];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Yarn => "yarn",
            Self::Pnpm => "pnpm",
            Self::Bun => "bun",
        }
    }

    /// Subcommand and flags adding packages of `kind`.
    fn add_args(&self, kind: DependencyKind) -> &'static [&'static str] {
        match (self, kind) {
            (Self::Npm, DependencyKind::Runtime) => &["install"],
            (Self::Npm, DependencyKind::Dev) => &["install", "--save-dev"],
            (Self::Yarn, DependencyKind::Runtime) => &["add"],
            (Self::Yarn, DependencyKind::Dev) => &["add", "--dev"],
            (Self::Pnpm, DependencyKind::Runtime) => &["add"],
            (Self::Pnpm, DependencyKind::Dev) => &["add", "--save-dev"],
            (Self::Bun, DependencyKind::Runtime) => &["add"],
            (Self::Bun, DependencyKind::Dev) => &["add", "--dev"],
        }
    }

    /// Commands installing `ledger`: runtime packages first, empty groups
    /// skipped.
    pub fn plan(&self, ledger: &DependencyLedger) -> Vec<InstallCommand> {
        [DependencyKind::Runtime, DependencyKind::Dev]
            .into_iter()
            .filter_map(|kind| {
                let packages = ledger.install_args(kind);
                if packages.is_empty() {
                    return None;
                }
                let mut args: Vec<String> =
                    self.add_args(kind).iter().map(ToString::to_string).collect();
                args.extend(packages);
                Some(InstallCommand {
                    program: self.as_str().to_string(),
                    args,
                })
            })
            .collect()
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageManager {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|pm| pm.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown package manager '{s}' (npm, yarn, pnpm, bun)"))
    }
}

/// One package manager invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl fmt::Display for InstallCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.program, self.args.join(" "))
    }
}

/// Installs through the package manager binary on `PATH`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandInstaller {
    manager: PackageManager,
    /// Hide the package manager's own output.
    quiet: bool,
}

impl CommandInstaller {
    pub fn new(manager: PackageManager) -> Self {
        Self {
            manager,
            quiet: false,
        }
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn manager(&self) -> PackageManager {
        self.manager
    }
}

impl PackageInstaller for CommandInstaller {
    #[instrument(skip_all, fields(manager = %self.manager, root = %root.display()))]
    fn install(&self, root: &Path, ledger: &DependencyLedger) -> GraftResult<()> {
        for command in self.manager.plan(ledger) {
            info!(%command, "Installing packages");
            let mut process = Command::new(&command.program);
            process.args(&command.args).current_dir(root);
            if self.quiet {
                process.stdout(Stdio::null()).stderr(Stdio::null());
            }

            let status = process.status().map_err(|e| ApplicationError::InstallFailed {
                command: command.to_string(),
                reason: e.to_string(),
            })?;
            if !status.success() {
                return Err(ApplicationError::InstallFailed {
                    command: command.to_string(),
                    reason: status.to_string(),
                }
                .into());
            }
        }
        Ok(())
    }
}
