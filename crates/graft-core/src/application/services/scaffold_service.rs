//! Scaffold Service - main application entry point.
//!
//! This service coordinates a whole `graft add` invocation:
//! 1. Work out which paths the plugins will write
//! 2. Load the base project (aliased files plus any of those paths on disk)
//! 3. Run the orchestrator
//! 4. Flush every file a plugin created or modified
//! 5. Install the aggregated packages
//!
//! It implements the driving port (incoming) and uses driven ports (outgoing).

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use crate::{
    application::{
        ports::{BaseProjectSource, Filesystem, PackageInstaller},
        services::orchestrator::{PluginOrchestrator, RunReport},
    },
    domain::{FileTree, PluginDescriptor, ProjectKind},
    error::GraftResult,
};

/// Information about a plugin for display purposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub kinds: Vec<String>,
    pub files: usize,
    pub modifies: Vec<String>,
    pub tags: Vec<String>,
}

impl From<&PluginDescriptor> for PluginInfo {
    fn from(p: &PluginDescriptor) -> Self {
        Self {
            id: p.id.to_string(),
            name: p.metadata.name.clone(),
            description: p.metadata.description.clone(),
            kinds: p.supported_kinds.iter().map(ToString::to_string).collect(),
            files: p.files.len(),
            modifies: p.modifications.iter().map(|(a, _)| a.to_string()).collect(),
            tags: p.metadata.tags.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaffoldOptions {
    /// Run everything in memory; write and install nothing.
    pub dry_run: bool,
    /// Run the package installer after writing.
    pub install: bool,
}

impl Default for ScaffoldOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            install: true,
        }
    }
}

/// Result of [`ScaffoldService::scaffold`].
#[derive(Debug, Clone)]
pub struct ScaffoldOutcome {
    pub report: RunReport,
    /// Files written to disk (empty on dry runs).
    pub written: Vec<PathBuf>,
    pub installed: bool,
}

/// Main composition service.
pub struct ScaffoldService {
    orchestrator: PluginOrchestrator,
    source: Box<dyn BaseProjectSource>,
    filesystem: Box<dyn Filesystem>,
    installer: Box<dyn PackageInstaller>,
}

impl ScaffoldService {
    /// Create a new scaffold service with the given adapters.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use graft_core::application::{PluginOrchestrator, ScaffoldService};
    ///
    /// let service = ScaffoldService::new(
    ///     PluginOrchestrator::new(registry), // impl PluginRegistry
    ///     source,                            // impl BaseProjectSource
    ///     filesystem,                        // impl Filesystem
    ///     installer,                         // impl PackageInstaller
    /// );
    /// ```
    pub fn new(
        orchestrator: PluginOrchestrator,
        source: Box<dyn BaseProjectSource>,
        filesystem: Box<dyn Filesystem>,
        installer: Box<dyn PackageInstaller>,
    ) -> Self {
        Self {
            orchestrator,
            source,
            filesystem,
            installer,
        }
    }

    /// Apply the plugins of `ctx` to the project at `root`.
    ///
    /// A run with collected failures is still written: the returned report
    /// tells which plugins partially failed.
    #[instrument(skip_all, fields(context = %ctx, root = %root.display()))]
    pub fn scaffold(
        &self,
        ctx: &crate::domain::ConfigContext,
        root: &Path,
        options: ScaffoldOptions,
    ) -> GraftResult<ScaffoldOutcome> {
        // 1. Validates the configuration as a side effect.
        let planned = self.orchestrator.planned_paths(ctx)?;

        // 2. Load base project
        let tree = self.source.load(root, ctx.project_kind(), &planned)?;
        info!(files = tree.len(), "Base project loaded");

        // 3. Compose
        let report = self.orchestrator.run(ctx, tree)?;

        if options.dry_run {
            info!("Dry run: nothing written");
            return Ok(ScaffoldOutcome {
                report,
                written: Vec::new(),
                installed: false,
            });
        }

        // 4. Write
        let written = self.write_changed(root, &report.tree)?;
        info!(count = written.len(), "Files written");

        // 5. Install
        let installed = if options.install && !report.ledger.is_empty() {
            self.installer.install(root, &report.ledger)?;
            true
        } else {
            false
        };

        Ok(ScaffoldOutcome {
            report,
            written,
            installed,
        })
    }

    /// List all available plugins.
    pub fn list_plugins(&self) -> GraftResult<Vec<PluginInfo>> {
        let plugins = self.orchestrator.registry().list()?;
        Ok(plugins.iter().map(PluginInfo::from).collect())
    }

    /// List plugins that can be applied to `kind`.
    pub fn plugins_for(&self, kind: ProjectKind) -> GraftResult<Vec<PluginInfo>> {
        let plugins = self.orchestrator.registry().list()?;
        Ok(plugins
            .iter()
            .filter(|p| p.supports(kind))
            .map(PluginInfo::from)
            .collect())
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    /// Write every file a plugin touched. Stops at the first failure;
    /// files already written stay on disk.
    fn write_changed(&self, root: &Path, tree: &FileTree) -> GraftResult<Vec<PathBuf>> {
        let mut written = Vec::new();
        for (path, content) in tree.changed_by_plugins() {
            let target = path.to_path_under(root);
            if let Some(parent) = target.parent() {
                self.filesystem.create_dir_all(parent)?;
            }
            self.filesystem.write_file(&target, content)?;
            written.push(target);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{
        ApplicationError,
        ports::{MockBaseProjectSource, MockFilesystem, MockPackageInstaller, MockPluginRegistry},
    };
    use crate::domain::{
        ConfigContext, FileContent, FileSpec, FileType, LogicalFileAlias, ModificationSpec,
        PackageSpec, PluginId, ProjectPath,
    };
    use crate::error::GraftError;

    fn plugin() -> PluginDescriptor {
        PluginDescriptor::builder(PluginId::new("toast"))
            .name("Toast")
            .supports(crate::domain::ProjectKind::NextApp)
            .file(
                FileSpec::new("Toaster", FileType::Component, FileContent::literal("export {}"))
                    .at(["src", "components"]),
            )
            .modify(
                LogicalFileAlias::layout(),
                ModificationSpec::new().imports("import { Toaster } from \"@/components/Toaster\";"),
            )
            .package(PackageSpec::runtime("react-hot-toast"))
            .build()
            .unwrap()
    }

    fn ctx() -> ConfigContext {
        ConfigContext::builder()
            .project_kind(ProjectKind::NextApp)
            .plugin(PluginId::new("toast"))
            .build()
            .unwrap()
    }

    fn registry() -> Box<MockPluginRegistry> {
        let mut registry = MockPluginRegistry::new();
        registry.expect_list().returning(|| Ok(vec![plugin()]));
        Box::new(registry)
    }

    fn source() -> Box<MockBaseProjectSource> {
        let mut source = MockBaseProjectSource::new();
        source
            .expect_load()
            .withf(|_, kind, extra| {
                *kind == ProjectKind::NextApp
                    && extra == [ProjectPath::new("src/components/Toaster.tsx")]
            })
            .returning(|_, _, _| {
                let mut tree = FileTree::new();
                let layout = ProjectPath::new("src/app/layout.tsx");
                tree.seed(layout.clone(), "import \"./globals.css\";\n");
                tree.seed(ProjectPath::new("src/app/page.tsx"), "export {}\n");
                tree.bind_alias(LogicalFileAlias::layout(), layout).unwrap();
                Ok(tree)
            });
        Box::new(source)
    }

    #[test]
    fn writes_only_touched_files_and_installs() {
        let mut fs = MockFilesystem::new();
        fs.expect_create_dir_all().returning(|_| Ok(()));
        fs.expect_write_file()
            .times(2)
            .withf(|path, _| !path.ends_with("page.tsx"))
            .returning(|_, _| Ok(()));

        let mut installer = MockPackageInstaller::new();
        installer
            .expect_install()
            .times(1)
            .withf(|_, ledger| ledger.get("react-hot-toast").is_some())
            .returning(|_, _| Ok(()));

        let service = ScaffoldService::new(
            PluginOrchestrator::new(registry()),
            source(),
            Box::new(fs),
            Box::new(installer),
        );

        let outcome = service
            .scaffold(&ctx(), Path::new("/project"), ScaffoldOptions::default())
            .unwrap();

        assert!(outcome.report.is_success());
        assert!(outcome.installed);
        assert_eq!(outcome.written.len(), 2);
        assert!(outcome.written.contains(&Path::new("/project/src/components/Toaster.tsx").to_path_buf()));
    }

    #[test]
    fn dry_run_touches_nothing() {
        let mut fs = MockFilesystem::new();
        fs.expect_write_file().never();
        let mut installer = MockPackageInstaller::new();
        installer.expect_install().never();

        let service = ScaffoldService::new(
            PluginOrchestrator::new(registry()),
            source(),
            Box::new(fs),
            Box::new(installer),
        );

        let outcome = service
            .scaffold(
                &ctx(),
                Path::new("/project"),
                ScaffoldOptions {
                    dry_run: true,
                    install: true,
                },
            )
            .unwrap();

        assert!(outcome.written.is_empty());
        assert!(!outcome.installed);
        assert_eq!(outcome.report.tree.changed_by_plugins().count(), 2);
    }

    #[test]
    fn installer_failure_is_propagated() {
        let mut fs = MockFilesystem::new();
        fs.expect_create_dir_all().returning(|_| Ok(()));
        fs.expect_write_file().returning(|_, _| Ok(()));
        let mut installer = MockPackageInstaller::new();
        installer.expect_install().returning(|_, _| {
            Err(ApplicationError::InstallFailed {
                command: "npm install react-hot-toast".into(),
                reason: "exit status 1".into(),
            }
            .into())
        });

        let service = ScaffoldService::new(
            PluginOrchestrator::new(registry()),
            source(),
            Box::new(fs),
            Box::new(installer),
        );

        let err = service
            .scaffold(&ctx(), Path::new("/project"), ScaffoldOptions::default())
            .unwrap_err();
        assert!(matches!(err, GraftError::Application(ApplicationError::InstallFailed { .. })));
    }

    #[test]
    fn lists_plugins_by_kind() {
        let service = ScaffoldService::new(
            PluginOrchestrator::new(registry()),
            Box::new(MockBaseProjectSource::new()),
            Box::new(MockFilesystem::new()),
            Box::new(MockPackageInstaller::new()),
        );

        let all = service.list_plugins().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].modifies, vec!["Layout"]);
        assert!(service.plugins_for(ProjectKind::ReactVite).unwrap().is_empty());
    }
}
