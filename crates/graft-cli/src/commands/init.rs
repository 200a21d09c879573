//! `graft init`: create a default configuration file.

use std::path::PathBuf;

use crate::{
    cli::InitArgs,
    config::{AppConfig, LOCAL_CONFIG_FILE},
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Create a default Graft configuration file.
///
/// `--local` writes `.graft.toml` in the current directory, otherwise the
/// user-wide file under the platform config directory.
pub fn execute(args: InitArgs, output: OutputManager) -> CliResult<()> {
    output.info("Initialising configuration...")?;

    let config_path = target_path(&args);
    if config_path.exists() && !args.force {
        return Err(CliError::ConfigExists { path: config_path });
    }

    AppConfig::default().save(&config_path)?;

    output.success(&format!("Configuration created at {}", config_path.display()))?;
    output.print("Set a default project kind with: graft config set defaults.project_kind next")?;
    Ok(())
}

fn target_path(args: &InitArgs) -> PathBuf {
    if args.local {
        PathBuf::from(LOCAL_CONFIG_FILE)
    } else {
        AppConfig::config_path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_flag_targets_working_directory() {
        let args = InitArgs {
            local: true,
            force: false,
        };
        assert_eq!(target_path(&args), PathBuf::from(".graft.toml"));
    }

    #[test]
    fn default_targets_user_config() {
        let args = InitArgs {
            local: false,
            force: false,
        };
        assert_eq!(target_path(&args), AppConfig::config_path());
    }
}
