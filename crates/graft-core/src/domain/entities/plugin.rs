//! Plugin descriptors: the declarative unit of composition.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  PluginDescriptor (Aggregate Root)                          │
//! │  ├── PluginId              - stable identity                │
//! │  ├── PluginMetadata        - name, description, message     │
//! │  ├── supported kinds       - where it may run               │
//! │  ├── Vec<FileSpec>         - files it creates               │
//! │  │    └── FileContent      - literal / parameterized / fn   │
//! │  ├── Vec<(alias, ModificationSpec)> - files it splices into │
//! │  └── DependencyResolver    - ConfigContext -> PackageSpec[] │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Descriptors never touch a file tree themselves. The orchestrator renders
//! their files, hands their modifications to the modification engine and
//! feeds their packages to the dependency aggregator.
//!
//! ## Content kinds
//!
//! Built-in plugins written in Rust use [`FileContent::Dynamic`] and branch on
//! the [`ConfigContext`] directly. Plugins loaded from `plugin.toml` manifests
//! use `Parameterized` or `Typed` content and rely on placeholder
//! substitution (see [`crate::domain::rendering`]).

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::domain::{
    entities::{common::ProjectPath, config_context::ConfigContext},
    error::DomainError,
    value_objects::{DependencyKind, FileType, LogicalFileAlias, PluginId, ProjectKind},
};

/// Content function of a dynamic file.
pub type ContentFn = Arc<dyn Fn(&ConfigContext) -> String + Send + Sync>;

/// Package resolver of a plugin.
pub type DependencyResolver = Arc<dyn Fn(&ConfigContext) -> Vec<PackageSpec> + Send + Sync>;

// ============================================================================
// PluginDescriptor
// ============================================================================

/// A self-contained feature that can be composed into a base project.
#[derive(Clone)]
pub struct PluginDescriptor {
    pub id: PluginId,
    pub metadata: PluginMetadata,
    /// Project kinds this plugin may be applied to. Never empty.
    pub supported_kinds: Vec<ProjectKind>,
    /// Files created, in declaration order.
    pub files: Vec<FileSpec>,
    /// Modifications of aliased files, in declaration order.
    pub modifications: Vec<(LogicalFileAlias, ModificationSpec)>,
    dependencies: DependencyResolver,
}

impl PluginDescriptor {
    /// Start the builder pattern for fluent construction.
    ///
    /// # Example
    /// ```rust
    /// use graft_core::domain::*;
    ///
    /// let plugin = PluginDescriptor::builder(PluginId::new("toast"))
    ///     .name("Toast notifications")
    ///     .supports(ProjectKind::NextApp)
    ///     .file(FileSpec::new("Toaster", FileType::Component, FileContent::literal("export {}")))
    ///     .package(PackageSpec::runtime("react-hot-toast"))
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(plugin.files.len(), 1);
    /// ```
    pub fn builder(id: PluginId) -> PluginDescriptorBuilder {
        PluginDescriptorBuilder::new(id)
    }

    pub fn supports(&self, kind: ProjectKind) -> bool {
        self.supported_kinds.contains(&kind)
    }

    /// Packages this plugin needs under `ctx`.
    pub fn dependencies(&self, ctx: &ConfigContext) -> Vec<PackageSpec> {
        (self.dependencies)(ctx)
    }

    /// Validate all invariants.
    ///
    /// Registries validate descriptors at insert time.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.metadata.name.trim().is_empty() {
            return Err(DomainError::InvalidPlugin(format!(
                "plugin '{}' has no name",
                self.id
            )));
        }

        if self.supported_kinds.is_empty() {
            return Err(DomainError::InvalidPlugin(format!(
                "plugin '{}' supports no project kind",
                self.id
            )));
        }

        let mut typed_paths = HashSet::new();
        let mut untyped_paths = HashSet::new();
        for file in &self.files {
            if file.file_name.trim().is_empty() {
                return Err(DomainError::InvalidPlugin(format!(
                    "plugin '{}' declares a file without a name",
                    self.id
                )));
            }
            // Both typing modes must give a valid path, each used once.
            let typed = file.target_path(true)?;
            let untyped = file.target_path(false)?;
            for (path, seen) in [(typed, &mut typed_paths), (untyped, &mut untyped_paths)] {
                if !seen.insert(path.clone()) {
                    return Err(DomainError::InvalidPlugin(format!(
                        "plugin '{}' declares '{path}' twice",
                        self.id
                    )));
                }
            }
        }

        for (alias, spec) in &self.modifications {
            spec.check_anchors().map_err(|reason| {
                DomainError::InvalidPlugin(format!(
                    "plugin '{}' modifies '{alias}': {reason}",
                    self.id
                ))
            })?;
        }

        let mut aliases = HashSet::new();
        for file in &self.files {
            if let Some(alias) = &file.alias {
                if !aliases.insert(alias) {
                    return Err(DomainError::InvalidPlugin(format!(
                        "plugin '{}' binds alias '{alias}' twice",
                        self.id
                    )));
                }
            }
        }

        Ok(())
    }
}

impl fmt::Debug for PluginDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginDescriptor")
            .field("id", &self.id)
            .field("metadata", &self.metadata)
            .field("supported_kinds", &self.supported_kinds)
            .field("files", &self.files)
            .field("modifications", &self.modifications)
            .finish_non_exhaustive()
    }
}

/// Human-readable plugin information for listings and progress output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginMetadata {
    pub name: String,
    pub description: String,
    /// Shown while the plugin is applied, e.g. "Adding React Query, Please wait !".
    pub initializing_message: Option<String>,
    pub tags: Vec<String>,
}

/// Builder for [`PluginDescriptor`].
///
/// `build()` enforces the descriptor invariants via `validate`.
pub struct PluginDescriptorBuilder {
    id: PluginId,
    metadata: PluginMetadata,
    supported_kinds: Vec<ProjectKind>,
    files: Vec<FileSpec>,
    modifications: Vec<(LogicalFileAlias, ModificationSpec)>,
    packages: Vec<PackageSpec>,
    resolver: Option<DependencyResolver>,
}

impl PluginDescriptorBuilder {
    fn new(id: PluginId) -> Self {
        // Display name falls back to the id.
        let metadata = PluginMetadata {
            name: id.to_string(),
            ..PluginMetadata::default()
        };
        Self {
            id,
            metadata,
            supported_kinds: Vec::new(),
            files: Vec::new(),
            modifications: Vec::new(),
            packages: Vec::new(),
            resolver: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.metadata.name = name.into();
        self
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.metadata.description = desc.into();
        self
    }

    pub fn initializing_message(mut self, msg: impl Into<String>) -> Self {
        self.metadata.initializing_message = Some(msg.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.metadata.tags.push(tag.into());
        self
    }

    pub fn supports(mut self, kind: ProjectKind) -> Self {
        if !self.supported_kinds.contains(&kind) {
            self.supported_kinds.push(kind);
        }
        self
    }

    pub fn supports_all(mut self) -> Self {
        self.supported_kinds = ProjectKind::ALL.to_vec();
        self
    }

    pub fn file(mut self, file: FileSpec) -> Self {
        self.files.push(file);
        self
    }

    pub fn modify(mut self, alias: LogicalFileAlias, spec: ModificationSpec) -> Self {
        self.modifications.push((alias, spec));
        self
    }

    /// Declare a package needed regardless of the context.
    pub fn package(mut self, spec: PackageSpec) -> Self {
        self.packages.push(spec);
        self
    }

    /// Declare packages that depend on the context.
    ///
    /// Runs after the static packages declared with [`Self::package`].
    pub fn dependencies<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&ConfigContext) -> Vec<PackageSpec> + Send + Sync + 'static,
    {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    pub fn build(self) -> Result<PluginDescriptor, DomainError> {
        let fixed = self.packages;
        let dynamic = self.resolver;
        let dependencies: DependencyResolver = Arc::new(move |ctx: &ConfigContext| {
            let mut all = fixed.clone();
            if let Some(resolve) = &dynamic {
                all.extend(resolve(ctx));
            }
            all
        });

        let plugin = PluginDescriptor {
            id: self.id,
            metadata: self.metadata,
            supported_kinds: self.supported_kinds,
            files: self.files,
            modifications: self.modifications,
            dependencies,
        };
        plugin.validate()?;
        Ok(plugin)
    }
}

// ============================================================================
// FileSpec - What a plugin creates
// ============================================================================

/// One file contributed by a plugin.
///
/// The target path is `path` joined with `file_name` plus the extension
/// derived from `file_type` and the context's typing mode. Dotfiles such as
/// `.env` use [`FileType::Plain`] and get no extension.
#[derive(Debug, Clone)]
pub struct FileSpec {
    pub file_name: String,
    pub file_type: FileType,
    /// Directory segments relative to the project root.
    pub path: Vec<String>,
    pub content: FileContent,
    /// Alias bound to the created file so later plugins can modify it.
    pub alias: Option<LogicalFileAlias>,
}

impl FileSpec {
    pub fn new(file_name: impl Into<String>, file_type: FileType, content: FileContent) -> Self {
        Self {
            file_name: file_name.into(),
            file_type,
            path: Vec::new(),
            content,
            alias: None,
        }
    }

    /// Place the file under these directory segments.
    pub fn at<I, S>(mut self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.path = segments.into_iter().map(Into::into).collect();
        self
    }

    /// Bind `alias` to this file once it is written.
    pub fn aliased(mut self, alias: LogicalFileAlias) -> Self {
        self.alias = Some(alias);
        self
    }

    /// Resolved location of this file.
    pub fn target_path(&self, uses_static_typing: bool) -> Result<ProjectPath, DomainError> {
        let name = match self.file_type.extension(uses_static_typing) {
            Some(ext) => format!("{}.{ext}", self.file_name),
            None => self.file_name.clone(),
        };
        ProjectPath::from_segments(&self.path, &name)
    }
}

// ============================================================================
// FileContent
// ============================================================================

/// How a file's text is produced from the context.
#[derive(Clone)]
pub enum FileContent {
    /// Content used exactly as provided.
    Literal(ContentSource),

    /// Content with `{{PLACEHOLDER}}` tokens substituted from the context.
    Parameterized(ContentSource),

    /// Separate parameterized bodies for typed and untyped projects.
    Typed {
        typed: ContentSource,
        untyped: ContentSource,
    },

    /// Arbitrary function of the context.
    Dynamic(ContentFn),
}

impl FileContent {
    pub fn literal(text: impl Into<ContentSource>) -> Self {
        Self::Literal(text.into())
    }

    pub fn parameterized(text: impl Into<ContentSource>) -> Self {
        Self::Parameterized(text.into())
    }

    pub fn typed(typed: impl Into<ContentSource>, untyped: impl Into<ContentSource>) -> Self {
        Self::Typed {
            typed: typed.into(),
            untyped: untyped.into(),
        }
    }

    pub fn dynamic<F>(render: F) -> Self
    where
        F: Fn(&ConfigContext) -> String + Send + Sync + 'static,
    {
        Self::Dynamic(Arc::new(render))
    }
}

impl fmt::Debug for FileContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(s) => f.debug_tuple("Literal").field(&s.as_str().len()).finish(),
            Self::Parameterized(s) => f
                .debug_tuple("Parameterized")
                .field(&s.as_str().len())
                .finish(),
            Self::Typed { typed, untyped } => f
                .debug_struct("Typed")
                .field("typed", &typed.as_str().len())
                .field("untyped", &untyped.as_str().len())
                .finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(<fn>)"),
        }
    }
}

/// Source of content text: either compile-time or runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    /// Compile-time string literal.
    Static(&'static str),

    /// Runtime-owned string (manifest-loaded).
    Owned(String),
}

impl ContentSource {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Static(s) => s,
            Self::Owned(s) => s,
        }
    }
}

impl From<&'static str> for ContentSource {
    fn from(s: &'static str) -> Self {
        Self::Static(s)
    }
}

impl From<String> for ContentSource {
    fn from(s: String) -> Self {
        Self::Owned(s)
    }
}

// ============================================================================
// ModificationSpec - How a plugin splices into an aliased file
// ============================================================================

/// Declarative edit of an existing file.
///
/// Every part is optional. A spec with nothing set is a no-op.
///
/// - `import_statements` are inserted after the file's last import, each
///   statement only if not already present.
/// - `open_tag` is inserted immediately before the first occurrence of
///   `add_before_match`.
/// - `close_tag` is inserted immediately after the first occurrence of
///   `add_after_match` at or after the before-anchor.
///
/// A tag without its anchor makes the descriptor invalid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModificationSpec {
    pub import_statements: Option<String>,
    pub add_before_match: Option<String>,
    pub add_after_match: Option<String>,
    pub open_tag: Option<String>,
    pub close_tag: Option<String>,
}

impl ModificationSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn imports(mut self, statements: impl Into<String>) -> Self {
        self.import_statements = Some(statements.into());
        self
    }

    /// Insert `open` before `anchor`.
    pub fn before(mut self, anchor: impl Into<String>, open: impl Into<String>) -> Self {
        self.add_before_match = Some(anchor.into());
        self.open_tag = Some(open.into());
        self
    }

    /// Insert `close` after `anchor`.
    pub fn after(mut self, anchor: impl Into<String>, close: impl Into<String>) -> Self {
        self.add_after_match = Some(anchor.into());
        self.close_tag = Some(close.into());
        self
    }

    /// Wrap the region starting at `anchor` and ending after it.
    pub fn wrap(
        self,
        anchor: impl Into<String>,
        open: impl Into<String>,
        close: impl Into<String>,
    ) -> Self {
        let anchor = anchor.into();
        self.before(anchor.clone(), open).after(anchor, close)
    }

    /// Whether this spec declares nothing at all.
    pub fn is_empty(&self) -> bool {
        blank(&self.import_statements)
            && blank(&self.add_before_match)
            && blank(&self.add_after_match)
            && blank(&self.open_tag)
            && blank(&self.close_tag)
    }

    /// Every tag needs the anchor it is inserted against.
    pub fn check_anchors(&self) -> Result<(), String> {
        if !blank(&self.open_tag) && blank(&self.add_before_match) {
            return Err("an open tag needs a before-anchor".into());
        }
        if !blank(&self.close_tag) && blank(&self.add_after_match) {
            return Err("a close tag needs an after-anchor".into());
        }
        Ok(())
    }
}

fn blank(s: &Option<String>) -> bool {
    s.as_deref().is_none_or(|s| s.trim().is_empty())
}

// ============================================================================
// PackageSpec - What a plugin needs installed
// ============================================================================

/// A package requirement, e.g. `axios@^1.6` as a runtime dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    pub name: String,
    /// Version requirement. `None` means "latest".
    pub constraint: Option<String>,
    pub kind: DependencyKind,
}

impl PackageSpec {
    pub fn runtime(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraint: None,
            kind: DependencyKind::Runtime,
        }
    }

    pub fn dev(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraint: None,
            kind: DependencyKind::Dev,
        }
    }

    pub fn version(mut self, constraint: impl Into<String>) -> Self {
        self.constraint = Some(constraint.into());
        self
    }

    /// Parse `name`, `name@range`, `@scope/name` or `@scope/name@range`.
    pub fn parse(spec: &str, kind: DependencyKind) -> Result<Self, DomainError> {
        let spec = spec.trim();
        let invalid = |reason: &str| DomainError::InvalidPackage {
            spec: spec.to_string(),
            reason: reason.into(),
        };

        // Skip the scope marker so it is not taken for the version separator.
        let search_from = usize::from(spec.starts_with('@'));
        let (name, constraint) = match spec[search_from..].find('@') {
            Some(i) => {
                let at = search_from + i;
                let range = spec[at + 1..].trim();
                if range.is_empty() {
                    return Err(invalid("empty version after '@'"));
                }
                (&spec[..at], Some(range.to_string()))
            }
            None => (spec, None),
        };

        if name.is_empty() || name == "@" {
            return Err(invalid("missing package name"));
        }
        if name.starts_with('@') && !name.contains('/') {
            return Err(invalid("scoped package needs '@scope/name'"));
        }
        if name.chars().any(char::is_whitespace) {
            return Err(invalid("package name contains whitespace"));
        }

        Ok(Self {
            name: name.to_string(),
            constraint,
            kind,
        })
    }
}

impl fmt::Display for PackageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.constraint {
            Some(c) => write!(f, "{}@{c}", self.name),
            None => f.write_str(&self.name),
        }
    }
}
