//! Workspace sandbox: every file tool resolves paths through here.
//!
//! Paths given by the model are relative to the workspace root. `..`
//! components are rejected outright, absolute paths are accepted only when
//! they already point inside the root, and existing targets are
//! canonicalized so a symlink cannot lead outside.

use std::path::{Component, Path, PathBuf};

/// Error returned when a path cannot be used inside the workspace.
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("Path '{path}' is outside the workspace")]
    OutsideWorkspace { path: String },

    #[error("Path traversal detected in '{path}'")]
    PathTraversal { path: String },

    #[error("Failed to canonicalize path '{path}': {reason}")]
    CanonicalizeFailed { path: String, reason: String },
}

/// The directory file tools operate in.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root directory if it does not exist yet.
    pub fn ensure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.root)
    }

    /// Resolve a model-supplied path to a location inside the workspace.
    ///
    /// An empty path resolves to the root itself.
    pub fn resolve(&self, path: &str) -> Result<PathBuf, WorkspaceError> {
        let input = Path::new(path.trim());

        if input.components().any(|c| matches!(c, Component::ParentDir)) {
            return Err(WorkspaceError::PathTraversal { path: path.into() });
        }

        let candidate = if input.is_absolute() {
            if !input.starts_with(&self.root) {
                return Err(WorkspaceError::OutsideWorkspace { path: path.into() });
            }
            input.to_path_buf()
        } else {
            self.root.join(input)
        };

        // Symlinks inside the root may still point elsewhere. A target that
        // does not exist yet is judged by its nearest existing ancestor; a
        // dangling link fails to canonicalize and is rejected.
        if self.root.exists() {
            let canonical_root = canonicalize(&self.root, path)?;
            if let Some(existing) = candidate
                .ancestors()
                .find(|p| p.symlink_metadata().is_ok())
            {
                let canonical = canonicalize(existing, path)?;
                if !canonical.starts_with(&canonical_root) {
                    return Err(WorkspaceError::OutsideWorkspace { path: path.into() });
                }
            }
        }

        Ok(candidate)
    }

    /// Express an absolute path relative to the root, with `/` separators.
    pub fn relative(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<_> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(parts.join("/"))
    }

    /// Every file under the root, relative and sorted.
    pub fn list_recursive(&self) -> std::io::Result<Vec<String>> {
        let mut files = Vec::new();
        if self.root.exists() {
            self.walk(&self.root, &mut files)?;
        }
        files.sort();
        Ok(files)
    }

    fn walk(&self, dir: &Path, out: &mut Vec<String>) -> std::io::Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type()?.is_dir() {
                self.walk(&path, out)?;
            } else if let Some(rel) = self.relative(&path) {
                out.push(rel);
            }
        }
        Ok(())
    }
}

fn canonicalize(path: &Path, original: &str) -> Result<PathBuf, WorkspaceError> {
    path.canonicalize()
        .map_err(|e| WorkspaceError::CanonicalizeFailed {
            path: original.into(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_path_joins_root() {
        let ws = Workspace::new("/srv/ws");
        assert_eq!(ws.resolve("foo.txt").unwrap(), PathBuf::from("/srv/ws/foo.txt"));
        assert_eq!(
            ws.resolve("a/b/c.txt").unwrap(),
            PathBuf::from("/srv/ws/a/b/c.txt")
        );
    }

    #[test]
    fn empty_path_is_root() {
        let ws = Workspace::new("/srv/ws");
        assert_eq!(ws.resolve("").unwrap(), PathBuf::from("/srv/ws"));
    }

    #[test]
    fn parent_components_blocked() {
        let ws = Workspace::new("/srv/ws");
        let err = ws.resolve("../../etc/passwd").unwrap_err();
        assert!(matches!(err, WorkspaceError::PathTraversal { .. }));
        assert!(ws.resolve("a/../../b").is_err());
    }

    #[test]
    fn absolute_outside_root_blocked() {
        let ws = Workspace::new("/srv/ws");
        let err = ws.resolve("/etc/passwd").unwrap_err();
        assert!(matches!(err, WorkspaceError::OutsideWorkspace { .. }));
    }

    #[test]
    fn absolute_inside_root_allowed() {
        let ws = Workspace::new("/srv/ws");
        assert_eq!(
            ws.resolve("/srv/ws/out.html").unwrap(),
            PathBuf::from("/srv/ws/out.html")
        );
    }

    #[cfg(unix)]
    #[test]
    fn symlink_escape_blocked() {
        let outside = tempfile::tempdir().unwrap();
        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();

        let ws = Workspace::new(dir.path());
        assert!(ws.resolve("link").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn new_file_under_symlinked_dir_blocked() {
        let outside = tempfile::tempdir().unwrap();
        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();

        let ws = Workspace::new(dir.path());
        let err = ws.resolve("link/evil.txt").unwrap_err();
        assert!(matches!(err, WorkspaceError::OutsideWorkspace { .. }));
        assert!(ws.resolve("link/deeper/evil.html").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_blocked() {
        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink("/nonexistent/actloop/target", dir.path().join("ghost")).unwrap();

        let ws = Workspace::new(dir.path());
        assert!(ws.resolve("ghost").is_err());
    }

    #[test]
    fn new_nested_file_inside_root_allowed() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(dir.path());
        assert_eq!(
            ws.resolve("charts/q1/sales.html").unwrap(),
            dir.path().join("charts/q1/sales.html")
        );
    }

    #[test]
    fn list_recursive_is_sorted_and_relative() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("b.txt"), "b").unwrap();
        std::fs::write(dir.path().join("a.txt"), "a").unwrap();
        std::fs::write(dir.path().join("sub/c.txt"), "c").unwrap();

        let ws = Workspace::new(dir.path());
        assert_eq!(
            ws.list_recursive().unwrap(),
            vec!["a.txt".to_string(), "b.txt".into(), "sub/c.txt".into()]
        );
    }

    #[test]
    fn list_missing_root_is_empty() {
        let ws = Workspace::new("/nonexistent/actloop/ws");
        assert!(ws.list_recursive().unwrap().is_empty());
    }
}
