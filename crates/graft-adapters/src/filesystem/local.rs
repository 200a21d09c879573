//! Local filesystem adapter using std::fs.

use std::io;
use std::path::Path;

use graft_core::{
    application::{ApplicationError, ports::Filesystem},
    error::{GraftError, GraftResult},
};

/// Production filesystem implementation using `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    pub fn new() -> Self {
        Self
    }
}

impl Filesystem for LocalFilesystem {
    fn create_dir_all(&self, path: &Path) -> GraftResult<()> {
        std::fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn write_file(&self, path: &Path, content: &str) -> GraftResult<()> {
        std::fs::write(path, content).map_err(|e| map_io_error(path, e, "write file"))
    }

    fn read_file(&self, path: &Path) -> GraftResult<String> {
        std::fs::read_to_string(path).map_err(|e| map_io_error(path, e, "read file"))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> GraftError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to {operation}: {e}"),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_then_read() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let nested = dir.path().join("src/app");

        fs.create_dir_all(&nested).unwrap();
        fs.write_file(&nested.join("layout.tsx"), "export {}").unwrap();

        assert!(fs.exists(&nested.join("layout.tsx")));
        assert_eq!(fs.read_file(&nested.join("layout.tsx")).unwrap(), "export {}");
    }

    #[test]
    fn missing_file_maps_to_filesystem_error() {
        let dir = TempDir::new().unwrap();
        let err = LocalFilesystem::new()
            .read_file(&dir.path().join("nope.ts"))
            .unwrap_err();
        assert!(matches!(
            err,
            GraftError::Application(ApplicationError::FilesystemError { .. })
        ));
    }
}
