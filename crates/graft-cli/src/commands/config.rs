//! `graft config`: read and write configuration values.

use std::path::PathBuf;

use crate::{
    cli::{ConfigCommands, OutputFormat},
    config::{AppConfig, KEYS},
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Dispatch to the correct config subcommand.
///
/// `config` is the effective configuration (file plus environment);
/// `set` edits the file alone.
pub fn execute(
    cmd: ConfigCommands,
    config_file: Option<PathBuf>,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    match cmd {
        ConfigCommands::Get { key } => {
            let value = config.get(&key)?;
            println!("{value}");
        }

        ConfigCommands::Set { key, value } => {
            let path = AppConfig::active_path(config_file.as_ref());
            let mut stored = AppConfig::load_file(config_file.as_ref()).map_err(|e| {
                CliError::config(format!("{e:#}"))
            })?;
            stored.set(&key, &value)?;
            stored.save(&path)?;
            output.success(&format!("{key} = {:?} ({})", stored.get(&key)?, path.display()))?;
        }

        ConfigCommands::List => {
            if output.format() == OutputFormat::Json {
                output.json(&config)?;
            } else {
                output.header("Current Configuration:")?;
                for key in KEYS {
                    output.print(&format!("  {key} = {:?}", config.get(key)?))?;
                }
            }
        }

        ConfigCommands::Path => {
            println!("{}", AppConfig::active_path(config_file.as_ref()).display());
        }
    }

    Ok(())
}
