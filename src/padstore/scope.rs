//! # Scope Resolution
//!
//! A note lives either in the global scope or in a project scope. The project is
//! the nearest ancestor of the working directory holding one of the repository
//! markers (`.git` by default); its directory name becomes the scope name.
//!
//! Resolution is read-only and infallible: a start directory that does not exist,
//! or a walk that reaches the filesystem root, yields [`Scope::Global`].
//! Paths are not canonicalized, so a symlinked project is named after the link.

use crate::model::Scope;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_MARKERS: &[&str] = &[".git"];

#[derive(Debug, Clone)]
pub struct ScopeResolver {
    markers: Vec<String>,
}

impl Default for ScopeResolver {
    fn default() -> Self {
        Self::new(DEFAULT_MARKERS.iter().map(|m| m.to_string()).collect())
    }
}

impl ScopeResolver {
    pub fn new(markers: Vec<String>) -> Self {
        Self { markers }
    }

    pub fn resolve(&self, start: &Path) -> Scope {
        let start = absolute(start);
        if !start.is_dir() {
            return Scope::Global;
        }

        for dir in start.ancestors() {
            if !self.has_marker(dir) {
                continue;
            }
            // The filesystem root or a non UTF-8 name cannot name a project.
            let scope = dir
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| Scope::project(n).ok())
                .unwrap_or(Scope::Global);
            debug!(dir = %dir.display(), %scope, "resolved scope");
            return scope;
        }

        Scope::Global
    }

    fn has_marker(&self, dir: &Path) -> bool {
        self.markers.iter().any(|m| dir.join(m).exists())
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn finds_nearest_marker_directory() {
        let tmp = TempDir::new().unwrap();
        let project = tmp.path().join("alpha");
        let nested = project.join("src").join("deep");
        fs::create_dir_all(&nested).unwrap();
        fs::create_dir_all(project.join(".git")).unwrap();

        let resolver = ScopeResolver::default();
        assert_eq!(
            resolver.resolve(&nested),
            Scope::Project("alpha".to_string())
        );
        assert_eq!(
            resolver.resolve(&project),
            Scope::Project("alpha".to_string())
        );
    }

    #[test]
    fn nonexistent_directory_is_global() {
        let tmp = TempDir::new().unwrap();
        let resolver = ScopeResolver::default();
        assert_eq!(
            resolver.resolve(&tmp.path().join("does/not/exist")),
            Scope::Global
        );
    }

    #[test]
    fn custom_markers_are_honoured() {
        let tmp = TempDir::new().unwrap();
        let project = tmp.path().join("beta");
        fs::create_dir_all(&project).unwrap();
        fs::write(project.join(".hg"), "").unwrap();

        let resolver = ScopeResolver::new(vec![".hg".to_string()]);
        assert_eq!(resolver.resolve(&project), Scope::Project("beta".to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_project_uses_link_name() {
        let tmp = TempDir::new().unwrap();
        let real = tmp.path().join("real-name");
        fs::create_dir_all(real.join(".git")).unwrap();
        let link = tmp.path().join("link-name");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let resolver = ScopeResolver::default();
        assert_eq!(
            resolver.resolve(&link),
            Scope::Project("link-name".to_string())
        );
    }
}
