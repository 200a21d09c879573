//! Integration tests for graft-core.
//!
//! Drives the orchestrator through its public API with hand-built plugins.

use std::sync::Mutex;

use graft_core::{
    application::{ApplicationError, RunPhase},
    domain::{DomainError, FileState},
    prelude::*,
};

struct VecRegistry(Mutex<Vec<PluginDescriptor>>);

impl VecRegistry {
    fn boxed(plugins: Vec<PluginDescriptor>) -> Box<dyn PluginRegistry> {
        Box::new(Self(Mutex::new(plugins)))
    }
}

impl PluginRegistry for VecRegistry {
    fn get(&self, id: &PluginId) -> GraftResult<PluginDescriptor> {
        let plugins = self.0.lock().map_err(|_| ApplicationError::RegistryLock)?;
        plugins
            .iter()
            .find(|p| &p.id == id)
            .cloned()
            .ok_or_else(|| ApplicationError::PluginNotFound { id: id.to_string() }.into())
    }

    fn list(&self) -> GraftResult<Vec<PluginDescriptor>> {
        let plugins = self.0.lock().map_err(|_| ApplicationError::RegistryLock)?;
        let mut all = plugins.clone();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }

    fn insert(&self, plugin: PluginDescriptor) -> GraftResult<()> {
        let mut plugins = self.0.lock().map_err(|_| ApplicationError::RegistryLock)?;
        plugins.retain(|p| p.id != plugin.id);
        plugins.push(plugin);
        Ok(())
    }
}

const LAYOUT: &str = r#"import "./globals.css";

export default function RootLayout({ children }) {
  return (
    <html lang="en">
      <body>{children}</body>
    </html>
  );
}
"#;

fn next_tree() -> FileTree {
    let mut tree = FileTree::new();
    let layout = ProjectPath::new("src/app/layout.tsx");
    tree.seed(layout.clone(), LAYOUT);
    tree.bind_alias(LogicalFileAlias::layout(), layout).unwrap();
    tree
}

fn provider_plugin(id: &str, component: &str) -> PluginDescriptor {
    PluginDescriptor::builder(PluginId::new(id))
        .name(id)
        .supports(ProjectKind::NextApp)
        .file(
            FileSpec::new(
                component,
                FileType::Component,
                FileContent::parameterized(format!(
                    "export const url = {{{{ENV_ACCESS}}}}{{{{ENV_PREFIX}}}}{}_URL;\n",
                    id.to_uppercase()
                )),
            )
            .at(["src", "components", component]),
        )
        .modify(
            LogicalFileAlias::layout(),
            ModificationSpec::new()
                .imports(format!(
                    "import {{ {component} }} from \"@/components/{component}/{component}\";"
                ))
                .wrap("{children}", format!("<{component}>"), format!("</{component}>")),
        )
        .build()
        .unwrap()
}

fn ctx(plugins: &[&str]) -> ConfigContext {
    ConfigContext::builder()
        .project_kind(ProjectKind::NextApp)
        .plugins(plugins.iter().map(|p| PluginId::new(*p)))
        .build()
        .unwrap()
}

#[test]
fn test_two_plugins_compose_in_request_order() {
    let orchestrator = PluginOrchestrator::new(VecRegistry::boxed(vec![
        provider_plugin("auth", "AuthProvider"),
        provider_plugin("theme", "ThemeProvider"),
    ]));

    let report = orchestrator
        .run(&ctx(&["theme", "auth"]), next_tree())
        .unwrap();

    assert!(report.is_success(), "{:?}", report.failures);
    assert_eq!(report.phase, RunPhase::Done);

    let layout = report
        .tree
        .read(&ProjectPath::new("src/app/layout.tsx"))
        .unwrap();
    // Later plugins wrap closer to the anchor.
    assert!(layout.contains(
        "<body><ThemeProvider><AuthProvider>{children}</AuthProvider></ThemeProvider></body>"
    ));
    let theme_import = layout.find("import { ThemeProvider }").unwrap();
    let auth_import = layout.find("import { AuthProvider }").unwrap();
    assert!(layout.find("globals.css").unwrap() < theme_import);
    assert!(theme_import < auth_import);

    let component = report
        .tree
        .read(&ProjectPath::new("src/components/AuthProvider/AuthProvider.tsx"))
        .unwrap();
    assert_eq!(component, "export const url = process.env.NEXT_PUBLIC_AUTH_URL;\n");
}

#[test]
fn test_rerun_on_own_output_changes_nothing() {
    let orchestrator =
        PluginOrchestrator::new(VecRegistry::boxed(vec![provider_plugin("auth", "AuthProvider")]));
    let ctx = ctx(&["auth"]);

    let first = orchestrator.run(&ctx, next_tree()).unwrap();
    let layout_path = ProjectPath::new("src/app/layout.tsx");
    let component_path = ProjectPath::new("src/components/AuthProvider/AuthProvider.tsx");

    // Reload the result as a fresh project, like a second CLI invocation.
    let mut reloaded = FileTree::new();
    reloaded.seed(layout_path.clone(), first.tree.read(&layout_path).unwrap());
    reloaded.seed(component_path.clone(), first.tree.read(&component_path).unwrap());
    reloaded
        .bind_alias(LogicalFileAlias::layout(), layout_path.clone())
        .unwrap();

    let second = orchestrator.run(&ctx, reloaded).unwrap();

    assert!(second.is_success(), "{:?}", second.failures);
    assert_eq!(
        second.tree.read(&layout_path).unwrap(),
        first.tree.read(&layout_path).unwrap()
    );
    assert_eq!(second.tree.changed_by_plugins().count(), 0);
    let summary = second.summary_for(&PluginId::new("auth")).unwrap();
    assert_eq!(summary.unchanged, vec![component_path]);
    assert_eq!(summary.already_applied, vec![LogicalFileAlias::layout()]);
    assert!(matches!(second.tree.state(&layout_path), FileState::Generated(_)));
}

#[test]
fn test_file_collision_is_reported_against_second_plugin() {
    let first = PluginDescriptor::builder(PluginId::new("first"))
        .supports(ProjectKind::NextApp)
        .file(FileSpec::new("api", FileType::Native, FileContent::literal("a")).at(["src", "utils"]))
        .build()
        .unwrap();
    let second = PluginDescriptor::builder(PluginId::new("second"))
        .supports(ProjectKind::NextApp)
        .file(FileSpec::new("api", FileType::Native, FileContent::literal("b")).at(["src", "utils"]))
        .build()
        .unwrap();
    let orchestrator = PluginOrchestrator::new(VecRegistry::boxed(vec![first, second]));

    let report = orchestrator.run(&ctx(&["first", "second"]), next_tree()).unwrap();

    assert_eq!(report.failures.len(), 1);
    let failure = &report.failures[0];
    assert_eq!(failure.plugin.as_str(), "second");
    assert_eq!(failure.phase, RunPhase::Writing);
    assert!(matches!(failure.error, DomainError::DuplicateFile { .. }));
    assert_eq!(
        report.tree.read(&ProjectPath::new("src/utils/api.ts")).unwrap(),
        "a"
    );
}

#[test]
fn test_dependency_ledger_merges_across_plugins() {
    let a = PluginDescriptor::builder(PluginId::new("a"))
        .supports(ProjectKind::NextApp)
        .package(PackageSpec::runtime("axios").version("^1.0.0"))
        .package(PackageSpec::dev("prettier"))
        .build()
        .unwrap();
    let b = PluginDescriptor::builder(PluginId::new("b"))
        .supports(ProjectKind::NextApp)
        .package(PackageSpec::runtime("axios").version("^1.6.0"))
        .dependencies(|ctx: &ConfigContext| {
            if ctx.uses_static_typing() {
                vec![PackageSpec::dev("@types/js-cookie")]
            } else {
                Vec::new()
            }
        })
        .build()
        .unwrap();
    let orchestrator = PluginOrchestrator::new(VecRegistry::boxed(vec![a, b]));

    let report = orchestrator.run(&ctx(&["a", "b"]), next_tree()).unwrap();

    assert!(report.is_success());
    let axios = report.ledger.get("axios").unwrap();
    assert_eq!(axios.constraint.to_string(), "^1.6.0");
    assert_eq!(axios.declared_by.len(), 2);
    assert_eq!(
        report.ledger.install_args(DependencyKind::Dev),
        vec!["@types/js-cookie".to_string(), "prettier".to_string()]
    );
}

#[test]
fn test_unknown_plugin_is_fatal() {
    let orchestrator = PluginOrchestrator::new(VecRegistry::boxed(vec![]));
    let err = orchestrator.run(&ctx(&["missing"]), next_tree()).unwrap_err();
    assert!(err.is_config_validation());
}
