//! Reads the project plugins are applied to.
//!
//! Only what a run can touch is loaded: the files behind each logical alias
//! of the project kind, and any planned plugin paths that already exist.

use std::path::Path;

use tracing::{debug, instrument, warn};

use graft_core::{
    application::{
        ApplicationError,
        ports::{BaseProjectSource, Filesystem},
    },
    domain::{FileTree, LogicalFileAlias, ProjectKind, ProjectPath},
    error::GraftResult,
};

use crate::filesystem::LocalFilesystem;

const SCRIPT_EXTENSIONS: [&str; 4] = ["tsx", "jsx", "ts", "js"];

/// Where each alias of `kind` may live, most likely location first.
pub fn alias_candidates(kind: ProjectKind) -> Vec<(LogicalFileAlias, Vec<String>)> {
    let candidates = |stems: &[&str]| -> Vec<String> {
        stems
            .iter()
            .flat_map(|stem| SCRIPT_EXTENSIONS.iter().map(move |ext| format!("{stem}.{ext}")))
            .collect()
    };

    match kind {
        ProjectKind::NextApp => vec![
            (LogicalFileAlias::layout(), candidates(&["src/app/layout", "app/layout"])),
            (LogicalFileAlias::page(), candidates(&["src/app/page", "app/page"])),
        ],
        ProjectKind::ReactVite => vec![
            (LogicalFileAlias::main(), candidates(&["src/main"])),
            (LogicalFileAlias::app(), candidates(&["src/App"])),
        ],
        ProjectKind::ReactCra => vec![
            (LogicalFileAlias::main(), candidates(&["src/index"])),
            (LogicalFileAlias::app(), candidates(&["src/App"])),
        ],
    }
}

/// [`BaseProjectSource`] over any [`Filesystem`].
pub struct ProjectReader<F> {
    fs: F,
}

/// Reader over the real filesystem.
pub type LocalProjectReader = ProjectReader<LocalFilesystem>;

impl LocalProjectReader {
    pub fn local() -> Self {
        Self::new(LocalFilesystem::new())
    }
}

impl<F: Filesystem> ProjectReader<F> {
    pub fn new(fs: F) -> Self {
        Self { fs }
    }
}

impl<F: Filesystem> BaseProjectSource for ProjectReader<F> {
    #[instrument(skip(self, extra), fields(root = %root.display(), %kind))]
    fn load(&self, root: &Path, kind: ProjectKind, extra: &[ProjectPath]) -> GraftResult<FileTree> {
        if !self.fs.exists(root) {
            return Err(ApplicationError::ProjectNotFound {
                path: root.to_path_buf(),
                kind: kind.to_string(),
            }
            .into());
        }

        let mut tree = FileTree::new();

        for (alias, candidates) in alias_candidates(kind) {
            let found = candidates
                .iter()
                .map(ProjectPath::new)
                .find(|path| self.fs.exists(&path.to_path_under(root)));

            match found {
                Some(path) => {
                    let content = self.fs.read_file(&path.to_path_under(root))?;
                    debug!(%alias, %path, "Bound alias");
                    tree.seed(path.clone(), content);
                    tree.bind_alias(alias, path)?;
                }
                None => warn!(%alias, "No file found for alias"),
            }
        }

        for path in extra {
            if tree.exists(path) {
                continue;
            }
            let on_disk = path.to_path_under(root);
            if self.fs.exists(&on_disk) {
                tree.seed(path.clone(), self.fs.read_file(&on_disk)?);
            }
        }

        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::MemoryFilesystem;
    use graft_core::{domain::FileState, error::GraftError};

    #[test]
    fn binds_first_existing_candidate() {
        let fs = MemoryFilesystem::new()
            .with_file("/app/src/app/layout.jsx", "layout")
            .with_file("/app/app/layout.tsx", "shadowed")
            .with_file("/app/src/app/page.js", "page");

        let tree = ProjectReader::new(fs)
            .load(Path::new("/app"), ProjectKind::NextApp, &[])
            .unwrap();

        let layout = tree.resolve_alias(&LogicalFileAlias::layout()).unwrap();
        assert_eq!(layout.as_str(), "src/app/layout.jsx");
        assert_eq!(tree.read(layout).unwrap(), "layout");
        assert_eq!(
            tree.resolve_alias(&LogicalFileAlias::page()).unwrap().as_str(),
            "src/app/page.js"
        );
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn seeds_existing_planned_paths_only() {
        let fs = MemoryFilesystem::new()
            .with_file("/app/src/main.tsx", "main")
            .with_file("/app/.env", "VITE_APP_BASE_URL=x");

        let extra = [ProjectPath::new(".env"), ProjectPath::new("src/utils/api.ts")];
        let tree = ProjectReader::new(fs)
            .load(Path::new("/app"), ProjectKind::ReactVite, &extra)
            .unwrap();

        assert!(matches!(tree.state(&extra[0]), FileState::Generated("VITE_APP_BASE_URL=x")));
        assert!(!tree.exists(&extra[1]));
        assert!(tree.resolve_alias(&LogicalFileAlias::app()).is_err());
    }

    #[test]
    fn missing_root_is_project_not_found() {
        let err = ProjectReader::new(MemoryFilesystem::new())
            .load(Path::new("/nope"), ProjectKind::ReactCra, &[])
            .unwrap_err();
        assert!(matches!(
            err,
            GraftError::Application(ApplicationError::ProjectNotFound { .. })
        ));
    }
}
