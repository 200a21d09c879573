//! Filesystem-based plugin loader.
//!
//! Discovers and parses `plugin.toml` manifests from a plugins directory,
//! converting them into domain [`PluginDescriptor`]s ready for the registry.
//!
//! # Directory layout expected
//!
//! ```text
//! plugins/
//! ├── toast/
//! │   ├── plugin.toml          ← manifest (required)
//! │   └── Toaster.tsx          ← file content referenced by `source`
//! └── analytics/
//!     └── plugin.toml
//! ```
//!
//! # `plugin.toml` format
//!
//! ```toml
//! [plugin]
//! id                   = "toast"
//! name                 = "Toast notifications"     # optional, defaults to id
//! description          = "react-hot-toast setup"   # optional
//! initializing_message = "Adding toasts"           # optional
//! kinds                = ["next", "react-vite"]    # optional, defaults to all
//! tags                 = ["ui"]                    # optional
//! dependencies         = ["react-hot-toast@^2.4"]  # runtime packages
//! dev_dependencies     = []
//! typed_dependencies   = ["@types/foo"]            # dev, only with static typing
//!
//! [[files]]
//! name   = "Toaster"
//! type   = "component"               # native | component | style | json | plain
//! path   = "src/components/Toaster"
//! source = "Toaster.tsx"             # or `content = "..."`
//! # or per typing mode: content_typed / content_untyped,
//! #                     source_typed  / source_untyped
//! alias  = "Toaster"                 # optional
//!
//! [[modifications]]
//! alias  = "Layout"
//! import = 'import { Toaster } from "@/components/Toaster/Toaster";'
//! before = "{children}"
//! open   = "<Toaster />"
//! ```
//!
//! Content containing `{{` is treated as parameterized; everything else is
//! copied verbatim.

use std::{
    fs,
    path::{Component, Path, PathBuf},
};

use serde::Deserialize;
use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

use graft_core::{
    application::ApplicationError,
    domain::{
        DependencyKind, FileContent, FileSpec, FileType, LogicalFileAlias, ModificationSpec,
        PackageSpec, PluginDescriptor, PluginId, ProjectKind,
    },
    error::{GraftError, GraftResult},
};

pub const MANIFEST_FILE: &str = "plugin.toml";

// ── Manifest types ────────────────────────────────────────────────────────────

/// Deserialised representation of a `plugin.toml` file.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct PluginManifest {
    pub plugin: PluginSection,
    #[serde(default)]
    pub files: Vec<FileEntry>,
    #[serde(default)]
    pub modifications: Vec<ModificationEntry>,
}

/// `[plugin]` section.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct PluginSection {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub initializing_message: Option<String>,
    /// Empty means every kind.
    #[serde(default)]
    pub kinds: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub dev_dependencies: Vec<String>,
    #[serde(default)]
    pub typed_dependencies: Vec<String>,
}

/// One entry under `[[files]]`.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub file_type: String,
    /// Directory relative to the project root, `/`-separated.
    #[serde(default)]
    pub path: String,
    pub content: Option<String>,
    pub source: Option<String>,
    pub content_typed: Option<String>,
    pub content_untyped: Option<String>,
    pub source_typed: Option<String>,
    pub source_untyped: Option<String>,
    pub alias: Option<String>,
}

/// One entry under `[[modifications]]`.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ModificationEntry {
    pub alias: String,
    pub import: Option<String>,
    pub before: Option<String>,
    pub after: Option<String>,
    pub open: Option<String>,
    pub close: Option<String>,
}

// ── Loader ────────────────────────────────────────────────────────────────────

/// Loads [`PluginDescriptor`]s from a directory of `plugin.toml` manifests.
///
/// Manifests are searched at most one directory deep. A manifest that fails
/// to load emits a `WARN` log and is skipped.
pub struct ManifestPluginLoader {
    plugins_dir: PathBuf,
}

impl ManifestPluginLoader {
    pub fn new(plugins_dir: impl Into<PathBuf>) -> Self {
        Self {
            plugins_dir: plugins_dir.into(),
        }
    }

    /// Load every valid plugin under the plugins directory, sorted by id.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::ManifestInvalid`] only when the directory
    /// itself is missing or unreadable.
    #[instrument(skip(self), fields(dir = %self.plugins_dir.display()))]
    pub fn load_all(&self) -> GraftResult<Vec<PluginDescriptor>> {
        if !self.plugins_dir.is_dir() {
            return Err(self.dir_error("plugins directory not found"));
        }

        let mut plugins = Vec::new();
        for entry in WalkDir::new(&self.plugins_dir).min_depth(1).max_depth(2) {
            let entry = entry.map_err(|e| self.dir_error(&e.to_string()))?;
            if !entry.file_type().is_file() || entry.file_name() != MANIFEST_FILE {
                continue;
            }

            match load_manifest(entry.path()) {
                Ok(plugin) => {
                    debug!(id = %plugin.id, "loaded plugin");
                    plugins.push(plugin);
                }
                Err(e) => {
                    warn!(
                        manifest = %entry.path().display(),
                        error = %e,
                        "skipping plugin due to load error"
                    );
                }
            }
        }

        plugins.sort_by(|a, b| a.id.cmp(&b.id));
        debug!(count = plugins.len(), "finished loading plugins");
        Ok(plugins)
    }

    fn dir_error(&self, reason: &str) -> GraftError {
        ApplicationError::ManifestInvalid {
            path: self.plugins_dir.clone(),
            reason: reason.to_string(),
        }
        .into()
    }
}

/// Parse one manifest and build its descriptor.
pub fn load_manifest(manifest_path: &Path) -> GraftResult<PluginDescriptor> {
    let invalid = |reason: String| -> GraftError {
        ApplicationError::ManifestInvalid {
            path: manifest_path.to_path_buf(),
            reason,
        }
        .into()
    };

    let raw = fs::read_to_string(manifest_path).map_err(|e| invalid(e.to_string()))?;
    let manifest: PluginManifest = toml::from_str(&raw).map_err(|e| invalid(e.to_string()))?;
    let base_dir = manifest_path.parent().unwrap_or(Path::new("."));

    build_descriptor(manifest, base_dir).map_err(|e| match e {
        GraftError::Domain(d) => invalid(d.to_string()),
        other => other,
    })
}

fn build_descriptor(manifest: PluginManifest, base_dir: &Path) -> GraftResult<PluginDescriptor> {
    let section = manifest.plugin;
    let mut builder = PluginDescriptor::builder(PluginId::parse(section.id)?);

    if let Some(name) = section.name {
        builder = builder.name(name);
    }
    if let Some(description) = section.description {
        builder = builder.description(description);
    }
    if let Some(message) = section.initializing_message {
        builder = builder.initializing_message(message);
    }
    for tag in section.tags {
        builder = builder.tag(tag);
    }

    if section.kinds.is_empty() {
        builder = builder.supports_all();
    }
    for kind in &section.kinds {
        builder = builder.supports(kind.parse::<ProjectKind>()?);
    }

    for file in manifest.files {
        builder = builder.file(file_spec(file, base_dir)?);
    }

    for m in manifest.modifications {
        let spec = ModificationSpec {
            import_statements: m.import,
            add_before_match: m.before,
            add_after_match: m.after,
            open_tag: m.open,
            close_tag: m.close,
        };
        builder = builder.modify(LogicalFileAlias::new(m.alias), spec);
    }

    for spec in &section.dependencies {
        builder = builder.package(PackageSpec::parse(spec, DependencyKind::Runtime)?);
    }
    for spec in &section.dev_dependencies {
        builder = builder.package(PackageSpec::parse(spec, DependencyKind::Dev)?);
    }
    let typed_only = section
        .typed_dependencies
        .iter()
        .map(|spec| PackageSpec::parse(spec, DependencyKind::Dev))
        .collect::<Result<Vec<_>, _>>()?;
    if !typed_only.is_empty() {
        builder = builder.dependencies(move |ctx| {
            if ctx.uses_static_typing() {
                typed_only.clone()
            } else {
                Vec::new()
            }
        });
    }

    Ok(builder.build()?)
}

fn file_spec(entry: FileEntry, base_dir: &Path) -> GraftResult<FileSpec> {
    let file_type: FileType = entry.file_type.parse()?;
    let invalid = |reason: &str| ApplicationError::ValidationFailed(format!(
        "file '{}': {reason}",
        entry.name
    ));

    let single = text(entry.content.as_deref(), entry.source.as_deref(), base_dir)?;
    let typed = text(entry.content_typed.as_deref(), entry.source_typed.as_deref(), base_dir)?;
    let untyped = text(entry.content_untyped.as_deref(), entry.source_untyped.as_deref(), base_dir)?;

    let content = match (single, typed, untyped) {
        (Some(text), None, None) => detect(text),
        (None, Some(typed), Some(untyped)) => FileContent::typed(typed, untyped),
        (None, None, None) => return Err(invalid("no content declared").into()),
        (None, _, _) => {
            return Err(invalid("typed and untyped content must be declared together").into());
        }
        (Some(_), _, _) => {
            return Err(invalid("`content` cannot be combined with typed variants").into());
        }
    };

    let segments: Vec<&str> = entry.path.split('/').filter(|s| !s.is_empty()).collect();
    let mut spec = FileSpec::new(entry.name.clone(), file_type, content).at(segments);
    if let Some(alias) = entry.alias {
        spec = spec.aliased(LogicalFileAlias::new(alias));
    }
    Ok(spec)
}

/// Inline text, or the contents of a file next to the manifest.
fn text(inline: Option<&str>, source: Option<&str>, base_dir: &Path) -> GraftResult<Option<String>> {
    match (inline, source) {
        (Some(_), Some(_)) => Err(ApplicationError::ValidationFailed(
            "inline content and source are mutually exclusive".into(),
        )
        .into()),
        (Some(text), None) => Ok(Some(text.to_string())),
        (None, Some(source)) => {
            let relative = Path::new(source);
            if relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
            {
                return Err(ApplicationError::ValidationFailed(format!(
                    "source '{source}' must stay inside the plugin directory"
                ))
                .into());
            }
            let path = base_dir.join(relative);
            fs::read_to_string(&path)
                .map(Some)
                .map_err(|e| {
                    ApplicationError::FilesystemError {
                        path,
                        reason: e.to_string(),
                    }
                    .into()
                })
        }
        (None, None) => Ok(None),
    }
}

fn detect(text: String) -> FileContent {
    if text.contains("{{") {
        FileContent::parameterized(text)
    } else {
        FileContent::literal(text)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
