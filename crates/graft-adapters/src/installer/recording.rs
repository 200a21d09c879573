//! Installer that plans commands without running them.

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use tracing::info;

use graft_core::{
    application::{ApplicationError, ports::PackageInstaller},
    domain::DependencyLedger,
    error::GraftResult,
};

use super::{InstallCommand, PackageManager};

/// Records what would be installed. Clones share the record.
#[derive(Debug, Clone, Default)]
pub struct RecordingInstaller {
    manager: PackageManager,
    recorded: Arc<Mutex<Vec<(PathBuf, InstallCommand)>>>,
}

impl RecordingInstaller {
    pub fn new(manager: PackageManager) -> Self {
        Self {
            manager,
            recorded: Arc::default(),
        }
    }

    /// Commands recorded so far, with the directory they would run in.
    pub fn recorded(&self) -> Vec<(PathBuf, InstallCommand)> {
        self.recorded
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl PackageInstaller for RecordingInstaller {
    fn install(&self, root: &Path, ledger: &DependencyLedger) -> GraftResult<()> {
        let mut recorded = self
            .recorded
            .lock()
            .map_err(|_| ApplicationError::RegistryLock)?;
        for command in self.manager.plan(ledger) {
            info!(%command, "Would install packages");
            recorded.push((root.to_path_buf(), command));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graft_core::domain::{PackageSpec, PluginId};

    #[test]
    fn records_planned_commands() {
        let mut ledger = DependencyLedger::new();
        ledger
            .declare(&PluginId::new("p"), &PackageSpec::runtime("axios"))
            .unwrap();

        let installer = RecordingInstaller::new(PackageManager::Pnpm);
        installer.install(Path::new("/app"), &ledger).unwrap();

        let recorded = installer.recorded();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].0, PathBuf::from("/app"));
        assert_eq!(recorded[0].1.to_string(), "pnpm add axios");
    }
}
