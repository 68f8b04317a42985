//! # Configuration
//!
//! Configuration is derived with [`confique`] and resolved in priority order:
//!
//! 1. **Environment variables**: `PADSTORE_DATA_DIR`, `PADSTORE_DISCOVER_ON_READ`
//! 2. **Config file**: `padstore.toml` in the OS config directory (via `directories`),
//!    or the file named by `PADSTORE_CONFIG`. A missing file is skipped.
//! 3. **Compiled defaults**: `#[config(default = ...)]`
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `data_dir` | OS data dir | Root holding one directory per scope |
//! | `repo_markers` | `[".git"]` | Directory names that mark a project root |
//! | `discover_on_read` | `true` | Adopt orphaned content before the first read of a scope |
//! | `peek_lines` | `3` | Lines kept at each end by `view --peek` |
//! | `cleanup_stale_after` | `"30d"` | Age at which `cleanup` soft-deletes unpinned notes |
//! | `cleanup_purge_after` | `"7d"` | Age of a deletion at which `cleanup` flushes it |
//!
//! Output format and verbosity are not configuration: they come from the command
//! line and are passed to the renderers explicitly.

use crate::error::{PadError, Result};
use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "padstore.toml";
pub const CONFIG_ENV: &str = "PADSTORE_CONFIG";

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PadConfig {
    /// Root directory for all scopes. Defaults to the OS data directory.
    #[config(env = "PADSTORE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Directory names whose presence marks a project root.
    #[config(default = [".git"])]
    pub repo_markers: Vec<String>,

    #[config(env = "PADSTORE_DISCOVER_ON_READ", default = true)]
    pub discover_on_read: bool,

    #[config(default = 3)]
    pub peek_lines: usize,

    /// Duration string, e.g. `30d`.
    #[config(default = "30d")]
    pub cleanup_stale_after: String,

    #[config(default = "7d")]
    pub cleanup_purge_after: String,
}

impl Default for PadConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            repo_markers: vec![".git".to_string()],
            discover_on_read: true,
            peek_lines: 3,
            cleanup_stale_after: "30d".to_string(),
            cleanup_purge_after: "7d".to_string(),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "padstore")
}

/// The config file consulted by [`PadConfig::load`].
pub fn config_path() -> Option<PathBuf> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => Some(PathBuf::from(path)),
        None => project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE)),
    }
}

impl PadConfig {
    /// Environment, then the config file if there is one, then defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path().as_deref())
    }

    pub fn load_from(file: Option<&Path>) -> Result<Self> {
        let mut builder = PadConfig::builder().env();
        if let Some(file) = file {
            builder = builder.file(file);
        }
        builder
            .load()
            .map_err(|e| PadError::Config(e.to_string()))
    }

    /// The configured data directory, or the OS default.
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| PadError::Config("could not determine a data directory".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let config = PadConfig::default();
        assert_eq!(config.repo_markers, vec![".git"]);
        assert!(config.discover_on_read);
        assert_eq!(config.peek_lines, 3);
        assert_eq!(config.cleanup_stale_after, "30d");
        assert_eq!(config.cleanup_purge_after, "7d");
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            "repo_markers = [\".git\", \".hg\"]\npeek_lines = 5\ncleanup_stale_after = \"2w\"\n",
        )
        .unwrap();

        let config = PadConfig::load_from(Some(&path)).unwrap();
        assert_eq!(config.repo_markers, vec![".git", ".hg"]);
        assert_eq!(config.peek_lines, 5);
        assert_eq!(config.cleanup_stale_after, "2w");
        assert_eq!(config.cleanup_purge_after, "7d");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let config = PadConfig::load_from(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.peek_lines, 3);
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "peek_lines = \"many\"\n").unwrap();

        assert!(matches!(
            PadConfig::load_from(Some(&path)),
            Err(PadError::Config(_))
        ));
    }

    #[test]
    fn explicit_data_dir_wins() {
        let config = PadConfig {
            data_dir: Some(PathBuf::from("/tmp/notes")),
            ..Default::default()
        };
        assert_eq!(config.data_dir().unwrap(), PathBuf::from("/tmp/notes"));
    }
}
