//! Domain value objects: ProjectKind, FileType, DependencyKind, PluginId,
//! LogicalFileAlias.
//!
//! # Design
//!
//! These are pure value types with equality-by-value and no identity. This
//! file's only job is to define the types, their string representations, and
//! their `FromStr` parsers.
//!
//! # Adding a project kind
//!
//! 1. Add the enum variant here
//! 2. Add the `as_str`, `env_prefix`, `env_access` and `FromStr` arms
//! 3. Teach the base project reader where that kind keeps its aliased files

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::error::DomainError;

// ── ProjectKind ───────────────────────────────────────────────────────────────

/// The kind of base project plugins are composed into.
///
/// A closed set: renderers branch on it with exhaustive `match`es instead of
/// comparing strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectKind {
    /// Next.js with the app router.
    #[serde(rename = "next", alias = "next-app")]
    NextApp,
    /// React bootstrapped with Vite.
    ReactVite,
    /// React bootstrapped with create-react-app.
    ReactCra,
}

impl ProjectKind {
    pub const ALL: [ProjectKind; 3] = [Self::NextApp, Self::ReactVite, Self::ReactCra];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NextApp => "next",
            Self::ReactVite => "react-vite",
            Self::ReactCra => "react-cra",
        }
    }

    /// Prefix the bundler requires for variables exposed to client code.
    pub const fn env_prefix(&self) -> &'static str {
        match self {
            Self::NextApp => "NEXT_PUBLIC_",
            Self::ReactVite => "VITE_APP_",
            Self::ReactCra => "REACT_APP_",
        }
    }

    /// Object through which client code reads environment variables.
    pub const fn env_access(&self) -> &'static str {
        match self {
            Self::NextApp | Self::ReactCra => "process.env.",
            Self::ReactVite => "import.meta.env.",
        }
    }

    /// Full client-side expression reading `name` (without prefix).
    ///
    /// ```
    /// use graft_core::domain::ProjectKind;
    /// assert_eq!(
    ///     ProjectKind::ReactVite.env_expression("BASE_URL"),
    ///     "import.meta.env.VITE_APP_BASE_URL"
    /// );
    /// ```
    pub fn env_expression(&self, name: &str) -> String {
        format!("{}{}{}", self.env_access(), self.env_prefix(), name)
    }
}

impl fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "next" | "nextjs" | "next-app" | "next_app" => Ok(Self::NextApp),
            "vite" | "react-vite" | "react_vite" => Ok(Self::ReactVite),
            "cra" | "react-cra" | "react_cra" => Ok(Self::ReactCra),
            other => Err(DomainError::InvalidConfig(format!(
                "unknown project kind: {other} (expected next, react-vite or react-cra)"
            ))),
        }
    }
}

// ── FileType ──────────────────────────────────────────────────────────────────

/// How a generated file is classified, which decides its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// Plain module: `.ts` / `.js`.
    Native,
    /// Module containing JSX: `.tsx` / `.jsx`.
    Component,
    /// Stylesheet: `.css`.
    Style,
    /// Data file: `.json`.
    Json,
    /// No extension is appended.
    Plain,
}

impl FileType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Component => "component",
            Self::Style => "style",
            Self::Json => "json",
            Self::Plain => "plain",
        }
    }

    /// Extension appended to the file name, if any.
    pub const fn extension(&self, uses_static_typing: bool) -> Option<&'static str> {
        match (self, uses_static_typing) {
            (Self::Native, true) => Some("ts"),
            (Self::Native, false) => Some("js"),
            (Self::Component, true) => Some("tsx"),
            (Self::Component, false) => Some("jsx"),
            (Self::Style, _) => Some("css"),
            (Self::Json, _) => Some("json"),
            (Self::Plain, _) => None,
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "native" | "module" => Ok(Self::Native),
            "component" | "jsx" => Ok(Self::Component),
            "style" | "css" => Ok(Self::Style),
            "json" => Ok(Self::Json),
            "plain" | "raw" => Ok(Self::Plain),
            other => Err(DomainError::InvalidPlugin(format!(
                "unknown file type: {other}"
            ))),
        }
    }
}

// ── DependencyKind ────────────────────────────────────────────────────────────

/// Whether a package is needed at runtime or only during development.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    #[default]
    Runtime,
    Dev,
}

impl DependencyKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Runtime => "runtime",
            Self::Dev => "dev",
        }
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── PluginId ──────────────────────────────────────────────────────────────────

/// Stable identifier of a plugin, e.g. `dataFetching`.
///
/// Invariant: non-empty, ASCII alphanumerics plus `-` and `_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PluginId(String);

impl PluginId {
    /// Create a plugin id.
    ///
    /// # Panics
    /// Panics if the id is not valid (use `parse` for fallible).
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        assert!(Self::is_valid(&id), "invalid plugin id: {id:?}");
        Self(id)
    }

    /// Fallible constructor.
    pub fn parse(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if Self::is_valid(&id) {
            Ok(Self(id))
        } else {
            Err(DomainError::InvalidConfig(format!(
                "invalid plugin id '{id}': use letters, digits, '-' or '_'"
            )))
        }
    }

    fn is_valid(id: &str) -> bool {
        !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PluginId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PluginId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<PluginId> for String {
    fn from(id: PluginId) -> Self {
        id.0
    }
}

impl From<&str> for PluginId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

// ── LogicalFileAlias ──────────────────────────────────────────────────────────

/// Symbolic name of a file that plugins modify without knowing its path.
///
/// The base project (or an earlier plugin) binds the alias to a physical path;
/// see `FileTree::bind_alias`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogicalFileAlias(String);

impl LogicalFileAlias {
    pub fn new(alias: impl Into<String>) -> Self {
        Self(alias.into())
    }

    /// Root layout of a Next.js app.
    pub fn layout() -> Self {
        Self::new("Layout")
    }

    /// Root page of a Next.js app.
    pub fn page() -> Self {
        Self::new("Page")
    }

    /// Entry module of a React app (`main` / `index`).
    pub fn main() -> Self {
        Self::new("Main")
    }

    /// Top-level `App` component of a React app.
    pub fn app() -> Self {
        Self::new("App")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogicalFileAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LogicalFileAlias {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
