//! In-memory file tree shared by all plugins in a run.
//!
//! The tree starts with the base project's files (seeded by a
//! `BaseProjectSource`), then grows as plugins write and patch. Every change
//! is recorded in the entry's history so the orchestrator can report who did
//! what and the scaffold service knows which files to flush to disk.
//!
//! Invariants:
//! - a path has at most one creator; a second write with different content
//!   is a [`DomainError::DuplicateFile`], identical content is a no-op
//! - a plugin modifies a given path at most once per run
//! - an alias resolves to exactly one path present in the tree

use std::collections::BTreeMap;
use std::fmt;

use crate::domain::{
    entities::common::ProjectPath,
    error::DomainError,
    value_objects::{LogicalFileAlias, PluginId},
};

/// Who produced a change.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Owner {
    /// The generated project the plugins are applied to.
    BaseTemplate,
    Plugin(PluginId),
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BaseTemplate => f.write_str("base template"),
            Self::Plugin(id) => write!(f, "plugin '{id}'"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Modify,
}

/// One recorded change to a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub owner: Owner,
    pub operation: Operation,
}

#[derive(Debug, Clone)]
struct FileEntry {
    content: String,
    history: Vec<HistoryEntry>,
}

impl FileEntry {
    fn creator(&self) -> &Owner {
        // Every entry is created with a Create record.
        &self.history[0].owner
    }
}

/// Lifecycle state of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState<'a> {
    NotPresent,
    /// Written once and never patched.
    Generated(&'a str),
    /// Patched at least once.
    Modified(&'a str),
}

/// Result of [`FileTree::write`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Created,
    /// The path already held byte-identical content.
    Unchanged,
}

/// Path-keyed file store with alias bindings and per-file history.
#[derive(Debug, Clone, Default)]
pub struct FileTree {
    entries: BTreeMap<ProjectPath, FileEntry>,
    aliases: BTreeMap<LogicalFileAlias, ProjectPath>,
}

impl FileTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a base project file. Re-seeding a path replaces it.
    pub fn seed(&mut self, path: ProjectPath, content: impl Into<String>) {
        self.entries.insert(
            path,
            FileEntry {
                content: content.into(),
                history: vec![HistoryEntry {
                    owner: Owner::BaseTemplate,
                    operation: Operation::Create,
                }],
            },
        );
    }

    /// Create a file on behalf of a plugin.
    pub fn write(
        &mut self,
        path: &ProjectPath,
        content: impl Into<String>,
        plugin: &PluginId,
    ) -> Result<WriteOutcome, DomainError> {
        let content = content.into();
        match self.entries.get(path) {
            Some(existing) if existing.content == content => Ok(WriteOutcome::Unchanged),
            Some(existing) => Err(DomainError::DuplicateFile {
                path: path.to_string(),
                existing_owner: existing.creator().to_string(),
                new_owner: Owner::Plugin(plugin.clone()).to_string(),
            }),
            None => {
                self.entries.insert(
                    path.clone(),
                    FileEntry {
                        content,
                        history: vec![HistoryEntry {
                            owner: Owner::Plugin(plugin.clone()),
                            operation: Operation::Create,
                        }],
                    },
                );
                Ok(WriteOutcome::Created)
            }
        }
    }

    /// Replace the content of an existing file on behalf of a plugin.
    pub fn patch(
        &mut self,
        path: &ProjectPath,
        content: impl Into<String>,
        plugin: &PluginId,
    ) -> Result<(), DomainError> {
        if self.was_modified_by(path, plugin) {
            return Err(DomainError::RedundantModification {
                target: path.to_string(),
            });
        }
        let entry = self
            .entries
            .get_mut(path)
            .ok_or_else(|| DomainError::FileNotFound {
                path: path.to_string(),
            })?;
        entry.content = content.into();
        entry.history.push(HistoryEntry {
            owner: Owner::Plugin(plugin.clone()),
            operation: Operation::Modify,
        });
        Ok(())
    }

    pub fn read(&self, path: &ProjectPath) -> Result<&str, DomainError> {
        self.entries
            .get(path)
            .map(|e| e.content.as_str())
            .ok_or_else(|| DomainError::FileNotFound {
                path: path.to_string(),
            })
    }

    pub fn exists(&self, path: &ProjectPath) -> bool {
        self.entries.contains_key(path)
    }

    pub fn state(&self, path: &ProjectPath) -> FileState<'_> {
        match self.entries.get(path) {
            None => FileState::NotPresent,
            Some(e) if e.history.iter().any(|h| h.operation == Operation::Modify) => {
                FileState::Modified(&e.content)
            }
            Some(e) => FileState::Generated(&e.content),
        }
    }

    pub fn history(&self, path: &ProjectPath) -> &[HistoryEntry] {
        self.entries
            .get(path)
            .map(|e| e.history.as_slice())
            .unwrap_or_default()
    }

    /// Whether `plugin` already patched `path` in this run.
    pub fn was_modified_by(&self, path: &ProjectPath, plugin: &PluginId) -> bool {
        self.history(path).iter().any(|h| {
            h.operation == Operation::Modify && matches!(&h.owner, Owner::Plugin(p) if p == plugin)
        })
    }

    /// Bind `alias` to an existing path.
    ///
    /// Rebinding to the same path is a no-op.
    pub fn bind_alias(
        &mut self,
        alias: LogicalFileAlias,
        path: ProjectPath,
    ) -> Result<(), DomainError> {
        if !self.exists(&path) {
            return Err(DomainError::FileNotFound {
                path: path.to_string(),
            });
        }
        match self.aliases.get(&alias) {
            Some(existing) if *existing == path => Ok(()),
            Some(existing) => Err(DomainError::AliasConflict {
                alias: alias.to_string(),
                existing: existing.to_string(),
                requested: path.to_string(),
            }),
            None => {
                self.aliases.insert(alias, path);
                Ok(())
            }
        }
    }

    pub fn resolve_alias(&self, alias: &LogicalFileAlias) -> Result<&ProjectPath, DomainError> {
        self.aliases
            .get(alias)
            .ok_or_else(|| DomainError::AliasNotFound {
                alias: alias.to_string(),
            })
    }

    pub fn aliases(&self) -> impl Iterator<Item = (&LogicalFileAlias, &ProjectPath)> {
        self.aliases.iter()
    }

    /// All paths in sorted order.
    pub fn paths(&self) -> impl Iterator<Item = &ProjectPath> {
        self.entries.keys()
    }

    /// Files a plugin created or modified, with their final content.
    pub fn changed_by_plugins(&self) -> impl Iterator<Item = (&ProjectPath, &str)> {
        self.entries
            .iter()
            .filter(|(_, e)| e.history.iter().any(|h| matches!(h.owner, Owner::Plugin(_))))
            .map(|(p, e)| (p, e.content.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plugin(id: &str) -> PluginId {
        PluginId::new(id)
    }

    #[test]
    fn write_then_identical_write_is_noop() {
        let mut tree = FileTree::new();
        let path = ProjectPath::new("src/utils/api.ts");

        assert_eq!(tree.write(&path, "x", &plugin("a")).unwrap(), WriteOutcome::Created);
        assert_eq!(tree.write(&path, "x", &plugin("b")).unwrap(), WriteOutcome::Unchanged);
        assert_eq!(tree.history(&path).len(), 1);
    }

    #[test]
    fn conflicting_write_names_both_owners() {
        let mut tree = FileTree::new();
        let path = ProjectPath::new("src/utils/api.ts");
        tree.write(&path, "one", &plugin("httpClient")).unwrap();

        let err = tree.write(&path, "two", &plugin("dataFetching")).unwrap_err();
        match err {
            DomainError::DuplicateFile { path, existing_owner, new_owner } => {
                assert_eq!(path, "/src/utils/api.ts");
                assert!(existing_owner.contains("httpClient"));
                assert!(new_owner.contains("dataFetching"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(tree.read(&path).unwrap(), "one");
    }

    #[test]
    fn writing_over_base_file_reports_base_template() {
        let mut tree = FileTree::new();
        let path = ProjectPath::new(".env");
        tree.seed(path.clone(), "A=1\n");

        let err = tree.write(&path, "B=2\n", &plugin("p")).unwrap_err();
        assert!(err.to_string().contains("base template"));
    }

    #[test]
    fn patch_records_history_and_rejects_second_patch() {
        let mut tree = FileTree::new();
        let path = ProjectPath::new("src/app/layout.tsx");
        tree.seed(path.clone(), "<body/>");

        assert_eq!(tree.state(&path), FileState::Generated("<body/>"));
        tree.patch(&path, "<body>x</body>", &plugin("p")).unwrap();
        assert_eq!(tree.state(&path), FileState::Modified("<body>x</body>"));
        assert!(tree.was_modified_by(&path, &plugin("p")));

        let err = tree.patch(&path, "again", &plugin("p")).unwrap_err();
        assert!(matches!(err, DomainError::RedundantModification { .. }));

        tree.patch(&path, "other", &plugin("q")).unwrap();
        assert_eq!(tree.history(&path).len(), 3);
    }

    #[test]
    fn patch_missing_file_fails() {
        let mut tree = FileTree::new();
        let err = tree
            .patch(&ProjectPath::new("nope.ts"), "x", &plugin("p"))
            .unwrap_err();
        assert!(matches!(err, DomainError::FileNotFound { .. }));
        assert_eq!(tree.state(&ProjectPath::new("nope.ts")), FileState::NotPresent);
    }

    #[test]
    fn alias_binding_rules() {
        let mut tree = FileTree::new();
        let layout = ProjectPath::new("src/app/layout.tsx");
        let other = ProjectPath::new("app/layout.tsx");
        tree.seed(layout.clone(), "");
        tree.seed(other.clone(), "");

        tree.bind_alias(LogicalFileAlias::layout(), layout.clone()).unwrap();
        tree.bind_alias(LogicalFileAlias::layout(), layout.clone()).unwrap();
        assert!(matches!(
            tree.bind_alias(LogicalFileAlias::layout(), other),
            Err(DomainError::AliasConflict { .. })
        ));
        assert!(matches!(
            tree.bind_alias(LogicalFileAlias::page(), ProjectPath::new("missing.tsx")),
            Err(DomainError::FileNotFound { .. })
        ));

        assert_eq!(tree.resolve_alias(&LogicalFileAlias::layout()).unwrap(), &layout);
        assert!(matches!(
            tree.resolve_alias(&LogicalFileAlias::page()),
            Err(DomainError::AliasNotFound { .. })
        ));
    }

    #[test]
    fn changed_by_plugins_skips_untouched_base_files() {
        let mut tree = FileTree::new();
        tree.seed(ProjectPath::new("a.ts"), "a");
        tree.seed(ProjectPath::new("b.ts"), "b");
        tree.patch(&ProjectPath::new("b.ts"), "b2", &plugin("p")).unwrap();
        tree.write(&ProjectPath::new("c.ts"), "c", &plugin("p")).unwrap();

        let changed: Vec<_> = tree.changed_by_plugins().map(|(p, _)| p.as_str()).collect();
        assert_eq!(changed, vec!["b.ts", "c.ts"]);
    }
}
