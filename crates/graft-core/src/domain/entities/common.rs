use super::DomainError;
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};

/// A project-relative file path with forward slashes.
///
/// Invariant: relative, normalized, never empty, never escapes the project
/// root. Enforced at construction. A leading `/` or `./` is accepted and
/// stripped, so `/src/app/layout.tsx` and `src/app/layout.tsx` are the same
/// path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectPath(String);

impl ProjectPath {
    /// Create a new project path.
    ///
    /// # Panics
    /// Panics if the path is invalid (use `try_new` for fallible).
    pub fn new(path: impl AsRef<str>) -> Self {
        match Self::try_new(path) {
            Ok(p) => p,
            Err(e) => panic!("{e}"),
        }
    }

    /// Fallible constructor.
    pub fn try_new(path: impl AsRef<str>) -> Result<Self, DomainError> {
        let raw = path.as_ref();
        let normalized = raw.replace('\\', "/");
        let mut segments = Vec::new();
        for segment in normalized.split('/') {
            match segment {
                "" | "." => continue,
                ".." => {
                    return Err(DomainError::InvalidPath {
                        path: raw.to_string(),
                        reason: "'..' segments are not allowed".into(),
                    });
                }
                s => segments.push(s),
            }
        }
        if segments.is_empty() {
            return Err(DomainError::InvalidPath {
                path: raw.to_string(),
                reason: "path is empty".into(),
            });
        }
        Ok(Self(segments.join("/")))
    }

    /// Build a path from directory segments plus a file name.
    pub fn from_segments<S: AsRef<str>>(dirs: &[S], file_name: &str) -> Result<Self, DomainError> {
        let mut joined = String::new();
        for dir in dirs {
            joined.push_str(dir.as_ref());
            joined.push('/');
        }
        if file_name.trim().is_empty() {
            return Err(DomainError::InvalidPath {
                path: joined,
                reason: "file name is empty".into(),
            });
        }
        joined.push_str(file_name);
        Self::try_new(joined)
    }

    /// Join a segment, maintaining the invariant.
    pub fn join(&self, segment: impl AsRef<str>) -> Result<Self, DomainError> {
        Self::try_new(format!("{}/{}", self.0, segment.as_ref()))
    }

    /// Final path component.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Location of this file under a project root on disk.
    pub fn to_path_under(&self, root: &Path) -> PathBuf {
        self.0.split('/').fold(root.to_path_buf(), |acc, s| acc.join(s))
    }
}

impl fmt::Display for ProjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.0)
    }
}

impl Serialize for ProjectPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl From<&str> for ProjectPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_leading_slash_and_dot() {
        assert_eq!(ProjectPath::new("/src/app/layout.tsx").as_str(), "src/app/layout.tsx");
        assert_eq!(ProjectPath::new("./src//lib/x.ts").as_str(), "src/lib/x.ts");
        assert_eq!(ProjectPath::new("src\\utils\\api.ts").as_str(), "src/utils/api.ts");
    }

    #[test]
    fn rejects_parent_and_empty() {
        assert!(ProjectPath::try_new("../etc/passwd").is_err());
        assert!(ProjectPath::try_new("src/../../x").is_err());
        assert!(ProjectPath::try_new("/").is_err());
        assert!(ProjectPath::from_segments(&["src"], " ").is_err());
    }

    #[test]
    fn displays_rooted() {
        let p = ProjectPath::from_segments(&["src", "lib"], "getQueryClient.ts").unwrap();
        assert_eq!(p.to_string(), "/src/lib/getQueryClient.ts");
        assert_eq!(p.file_name(), "getQueryClient.ts");
    }

    #[test]
    fn dotfile_at_root() {
        let empty: [&str; 0] = [];
        let p = ProjectPath::from_segments(&empty, ".env").unwrap();
        assert_eq!(p.as_str(), ".env");
    }
}
