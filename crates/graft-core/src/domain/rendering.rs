//! Content rendering: `(ConfigContext, FileSpec) -> RenderedFile`.
//!
//! Rendering is pure. It never looks at the file tree, so two plugins that
//! render the same path only find out when the orchestrator writes them.
//!
//! # Placeholders
//!
//! `Parameterized` and `Typed` content have these tokens substituted:
//!
//! | Token | next | react-vite | react-cra |
//! |-------|------|------------|-----------|
//! | `{{ENV_PREFIX}}` | `NEXT_PUBLIC_` | `VITE_APP_` | `REACT_APP_` |
//! | `{{ENV_ACCESS}}` | `process.env.` | `import.meta.env.` | `process.env.` |
//! | `{{PROJECT_KIND}}` | `next` | `react-vite` | `react-cra` |
//!
//! plus `{{EXT}}` (`ts`/`js`) and `{{JSX_EXT}}` (`tsx`/`jsx`) from the
//! typing mode. Unknown tokens are left as-is.

use std::collections::HashMap;

use crate::domain::{
    entities::{
        common::ProjectPath,
        config_context::ConfigContext,
        plugin::{FileContent, FileSpec, PluginDescriptor},
    },
    error::DomainError,
    value_objects::{FileType, LogicalFileAlias},
};

/// A file ready to be written to the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub path: ProjectPath,
    pub content: String,
    pub file_type: FileType,
    pub alias: Option<LogicalFileAlias>,
}

/// Variable map derived from a context.
#[derive(Debug, Clone)]
pub struct Placeholders {
    variables: HashMap<&'static str, String>,
}

impl Placeholders {
    pub fn for_context(ctx: &ConfigContext) -> Self {
        let kind = ctx.project_kind();
        let typed = ctx.uses_static_typing();
        let mut variables = HashMap::new();
        variables.insert("ENV_PREFIX", kind.env_prefix().to_string());
        variables.insert("ENV_ACCESS", kind.env_access().to_string());
        variables.insert("PROJECT_KIND", kind.as_str().to_string());
        variables.insert("EXT", if typed { "ts" } else { "js" }.to_string());
        variables.insert("JSX_EXT", if typed { "tsx" } else { "jsx" }.to_string());
        Self { variables }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }

    /// Replace every `{{KEY}}` with its value.
    pub fn render(&self, template: &str) -> String {
        let mut result = template.to_string();
        for (key, value) in &self.variables {
            let placeholder = format!("{{{{{key}}}}}");
            result = result.replace(&placeholder, value);
        }
        result
    }
}

/// Turns file specs into concrete files for a given context.
pub struct ContentRenderer;

impl ContentRenderer {
    /// Render one file.
    pub fn render_file(ctx: &ConfigContext, spec: &FileSpec) -> Result<RenderedFile, DomainError> {
        let path = spec.target_path(ctx.uses_static_typing())?;
        let content = match &spec.content {
            FileContent::Literal(src) => src.as_str().to_string(),
            FileContent::Parameterized(src) => Placeholders::for_context(ctx).render(src.as_str()),
            FileContent::Typed { typed, untyped } => {
                let src = if ctx.uses_static_typing() { typed } else { untyped };
                Placeholders::for_context(ctx).render(src.as_str())
            }
            FileContent::Dynamic(render) => render(ctx),
        };

        Ok(RenderedFile {
            path,
            content,
            file_type: spec.file_type,
            alias: spec.alias.clone(),
        })
    }

    /// Render every file of a plugin, in declaration order.
    pub fn render(
        ctx: &ConfigContext,
        plugin: &PluginDescriptor,
    ) -> Result<Vec<RenderedFile>, DomainError> {
        plugin
            .files
            .iter()
            .map(|spec| Self::render_file(ctx, spec))
            .collect()
    }

    /// Target paths only, without producing content.
    pub fn target_paths(
        ctx: &ConfigContext,
        plugin: &PluginDescriptor,
    ) -> Result<Vec<ProjectPath>, DomainError> {
        plugin
            .files
            .iter()
            .map(|spec| spec.target_path(ctx.uses_static_typing()))
            .collect()
    }
}
