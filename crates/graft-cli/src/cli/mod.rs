//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "graft",
    bin_name = "graft",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "\u{1f331} Compose features into frontend projects",
    long_about = "Graft applies plugins (files, anchored edits and packages) \
                  to an existing Next.js or React project.",
    after_help = "EXAMPLES:\n\
        \x20 graft add dataFetching --kind next\n\
        \x20 graft add httpClient --dir ./web --kind react-vite --js\n\
        \x20 graft list --kind next\n\
        \x20 graft completions bash > /usr/share/bash-completion/completions/graft",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply plugins to a project.
    #[command(
        visible_alias = "a",
        about = "Apply plugins to a project",
        after_help = "EXAMPLES:\n\
            \x20 graft add dataFetching\n\
            \x20 graft add httpClient dataFetching --dir ./web --yes\n\
            \x20 graft add httpClient --kind react-cra --package-manager pnpm --dry-run"
    )]
    Add(AddArgs),

    /// List available plugins.
    #[command(
        visible_alias = "ls",
        about = "List available plugins",
        after_help = "EXAMPLES:\n\
            \x20 graft list\n\
            \x20 graft list --kind react-vite\n\
            \x20 graft list --format json"
    )]
    List(ListArgs),

    /// Initialise a Graft configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 graft init           # default location\n\
            \x20 graft init --local   # .graft.toml in CWD"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 graft completions bash > ~/.local/share/bash-completion/completions/graft\n\
            \x20 graft completions zsh  > ~/.zfunc/_graft\n\
            \x20 graft completions fish > ~/.config/fish/completions/graft.fish"
    )]
    Completions(CompletionsArgs),

    /// Manage the Graft configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 graft config get defaults.project_kind\n\
            \x20 graft config set defaults.package_manager pnpm\n\
            \x20 graft config list"
    )]
    Config(ConfigCommands),
}

// ── add ───────────────────────────────────────────────────────────────────────

/// Arguments for `graft add`.
#[derive(Debug, Args)]
pub struct AddArgs {
    /// Plugins to apply, in order.
    #[arg(value_name = "PLUGIN", required = true, num_args = 1.., help = "Plugin ids, applied in order")]
    pub plugins: Vec<String>,

    /// Project root.
    #[arg(
        short = 'd',
        long = "dir",
        value_name = "DIR",
        default_value = ".",
        help = "Project directory"
    )]
    pub dir: PathBuf,

    /// Project kind. Falls back to `defaults.project_kind`.
    #[arg(short = 'k', long = "kind", value_enum, help = "Project kind")]
    pub kind: Option<KindArg>,

    /// Generate TypeScript.
    #[arg(long = "ts", conflicts_with = "js", help = "Generate TypeScript files")]
    pub ts: bool,

    /// Generate JavaScript.
    #[arg(long = "js", help = "Generate JavaScript files")]
    pub js: bool,

    /// Package manager used to install dependencies.
    #[arg(
        short = 'p',
        long = "package-manager",
        value_enum,
        help = "Package manager (npm, yarn, pnpm, bun)"
    )]
    pub package_manager: Option<PackageManagerArg>,

    /// Write files but do not install packages.
    #[arg(long = "no-install", help = "Skip package installation")]
    pub no_install: bool,

    /// Compose in memory and print the plan.
    #[arg(long = "dry-run", help = "Show what would change without writing")]
    pub dry_run: bool,

    /// Skip the confirmation prompt.
    #[arg(short = 'y', long = "yes", help = "Skip confirmation")]
    pub yes: bool,

    /// Write the run report as JSON.
    #[arg(long = "report", value_name = "FILE", help = "Write a JSON run report")]
    pub report: Option<PathBuf>,
}

impl AddArgs {
    /// `Some(true)` for `--ts`, `Some(false)` for `--js`.
    pub fn static_typing(&self) -> Option<bool> {
        match (self.ts, self.js) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

// ── list ──────────────────────────────────────────────────────────────────────

/// Arguments for `graft list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only plugins supporting this kind.
    #[arg(short = 'k', long = "kind", value_enum, help = "Filter by project kind")]
    pub kind: Option<KindArg>,

    /// Output format.
    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: ListFormat,
}

/// Output format for the `list` command.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ListFormat {
    /// Human-readable table.
    Table,
    /// One id per line.
    List,
    /// JSON array.
    Json,
    /// CSV rows.
    Csv,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `graft init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Write to `.graft.toml` in the current directory.
    #[arg(
        long = "local",
        help = "Create local configuration in current directory"
    )]
    pub local: bool,

    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `graft completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `graft config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `defaults.project_kind`.
        key: String,
    },
    /// Set a configuration key to a value.
    Set {
        /// Dotted key path.
        key: String,
        /// New value.
        value: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the active configuration file.
    Path,
}

// ── value enums ───────────────────────────────────────────────────────────────

/// Project kinds accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    #[value(name = "next", alias = "nextjs")]
    Next,
    #[value(name = "react-vite", alias = "vite")]
    ReactVite,
    #[value(name = "react-cra", alias = "cra")]
    ReactCra,
}

impl From<KindArg> for graft_core::domain::ProjectKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Next => Self::NextApp,
            KindArg::ReactVite => Self::ReactVite,
            KindArg::ReactCra => Self::ReactCra,
        }
    }
}

/// Package managers accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PackageManagerArg {
    Npm,
    Yarn,
    Pnpm,
    Bun,
}

impl From<PackageManagerArg> for graft_adapters::PackageManager {
    fn from(pm: PackageManagerArg) -> Self {
        match pm {
            PackageManagerArg::Npm => Self::Npm,
            PackageManagerArg::Yarn => Self::Yarn,
            PackageManagerArg::Pnpm => Self::Pnpm,
            PackageManagerArg::Bun => Self::Bun,
        }
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────
