//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables: `GRAFT__SECTION__KEY`, e.g.
//!    `GRAFT__DEFAULTS__PROJECT_KIND=next`
//! 3. Config file: `--config FILE`, else `.graft.toml` in the current
//!    directory, else the platform config directory
//! 4. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use graft_adapters::PackageManager;
use graft_core::domain::ProjectKind;

use crate::cli::OutputFormat;
use crate::error::{CliError, CliResult};

/// Name of the per-project configuration file.
pub const LOCAL_CONFIG_FILE: &str = ".graft.toml";

const ENV_PREFIX: &str = "GRAFT";

/// Every key accepted by `graft config get|set`.
pub const KEYS: [&str; 8] = [
    "defaults.project_kind",
    "defaults.typescript",
    "defaults.package_manager",
    "install.enabled",
    "plugins.directory",
    "output.no_color",
    "output.format",
    "logging.file",
];

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Values used when `graft add` flags are omitted.
    pub defaults: Defaults,
    pub install: InstallConfig,
    /// Where user plugins (`plugin.toml` manifests) live.
    pub plugins: PluginsConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_kind: Option<ProjectKind>,
    pub typescript: bool,
    pub package_manager: PackageManager,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            project_kind: None,
            typescript: true,
            package_manager: PackageManager::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    pub enabled: bool,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Also write logs to this file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration: defaults, then the config file, then the
    /// environment.
    ///
    /// An explicit `config_file` must exist; the implicit locations are
    /// optional.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        Self::build(config_file, true)
    }

    /// Defaults plus the config file, without environment overrides. Used by
    /// `config set` so that environment values are never persisted.
    pub fn load_file(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        Self::build(config_file, false)
    }

    fn build(config_file: Option<&PathBuf>, with_env: bool) -> anyhow::Result<Self> {
        let defaults = toml::to_string(&Self::default())
            .context("failed to serialise default configuration")?;

        let path = Self::active_path(config_file);
        let mut builder = Config::builder()
            .add_source(File::from_str(&defaults, FileFormat::Toml))
            .add_source(
                File::from(path.as_path())
                    .format(FileFormat::Toml)
                    .required(config_file.is_some()),
            );

        if with_env {
            builder = builder.add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );
        }

        builder
            .build()
            .and_then(Config::try_deserialize)
            .with_context(|| format!("failed to load configuration from {}", path.display()))
    }

    /// The file `load` reads and `config set` writes.
    pub fn active_path(config_file: Option<&PathBuf>) -> PathBuf {
        if let Some(path) = config_file {
            return path.clone();
        }
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.is_file() {
            local
        } else {
            Self::config_path()
        }
    }

    /// Path to the user-wide configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.graft.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("rs", "graft", "graft")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE))
    }

    /// Write this configuration as TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> CliResult<()> {
        let toml = toml::to_string_pretty(self).map_err(|e| CliError::ConfigError {
            message: format!("Failed to serialise config: {e}"),
            source: Some(Box::new(e)),
        })?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| CliError::IoError {
                message: format!("Failed to create config directory '{}'", parent.display()),
                source: e,
            })?;
        }

        std::fs::write(path, toml).map_err(|e| CliError::IoError {
            message: format!("Failed to write config to '{}'", path.display()),
            source: e,
        })
    }

    /// Current value of a dotted key, rendered as text. Unset optional
    /// values render as an empty string.
    pub fn get(&self, key: &str) -> CliResult<String> {
        let display = |p: &Option<PathBuf>| {
            p.as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        };

        Ok(match key {
            "defaults.project_kind" => self
                .defaults
                .project_kind
                .map(|k| k.to_string())
                .unwrap_or_default(),
            "defaults.typescript" => self.defaults.typescript.to_string(),
            "defaults.package_manager" => self.defaults.package_manager.to_string(),
            "install.enabled" => self.install.enabled.to_string(),
            "plugins.directory" => display(&self.plugins.directory),
            "output.no_color" => self.output.no_color.to_string(),
            "output.format" => self.output.format.to_string(),
            "logging.file" => display(&self.logging.file),
            _ => return Err(CliError::UnknownConfigKey { key: key.into() }),
        })
    }

    /// Set a dotted key from its text form. An empty value clears an
    /// optional key.
    pub fn set(&mut self, key: &str, value: &str) -> CliResult<()> {
        let value = value.trim();
        let optional_path = || (!value.is_empty()).then(|| PathBuf::from(value));

        match key {
            "defaults.project_kind" => {
                self.defaults.project_kind = if value.is_empty() {
                    None
                } else {
                    Some(value.parse().map_err(|e| invalid_value(key, e))?)
                };
            }
            "defaults.typescript" => self.defaults.typescript = parse_bool(key, value)?,
            "defaults.package_manager" => {
                self.defaults.package_manager = value.parse().map_err(|e| invalid_value(key, e))?;
            }
            "install.enabled" => self.install.enabled = parse_bool(key, value)?,
            "plugins.directory" => self.plugins.directory = optional_path(),
            "output.no_color" => self.output.no_color = parse_bool(key, value)?,
            "output.format" => {
                self.output.format = value.parse().map_err(|e| invalid_value(key, e))?;
            }
            "logging.file" => self.logging.file = optional_path(),
            _ => return Err(CliError::UnknownConfigKey { key: key.into() }),
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> CliResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(invalid_value(key, format!("expected true or false, got '{value}'"))),
    }
}

fn invalid_value(key: &str, reason: impl std::fmt::Display) -> CliError {
    CliError::InvalidInput {
        message: format!("invalid value for {key}: {reason}"),
        source: None,
    }
}
