//! Path management for releasehub
//!
//! Resolves the config directory and the files that live under it.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Filesystem locations used by the server
#[derive(Debug, Clone)]
pub struct Paths {
    /// Config directory path
    config_dir: PathBuf,
}

impl Paths {
    /// Resolve paths from an optional override and create the directory tree
    pub fn init(config: Option<PathBuf>) -> Result<Paths> {
        let config_dir = match config {
            Some(path) => path,
            None => directories::ProjectDirs::from("", "", "releasehub")
                .map(|dirs| dirs.config_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".releasehub")),
        };

        let paths = Self { config_dir };
        paths.create_directories()?;

        Ok(paths)
    }

    fn create_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir).with_context(|| {
            format!("Failed to create config directory {:?}", self.config_dir)
        })?;
        std::fs::create_dir_all(self.blobs_dir())?;

        Ok(())
    }

    // ========== Getters ==========

    /// Get the config directory
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Optional settings file
    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join("releasehub.toml")
    }

    /// SQLite database file
    pub fn app_db_path(&self) -> PathBuf {
        self.config_dir.join("releasehub.db")
    }

    /// Root of the local blob store
    pub fn blobs_dir(&self) -> PathBuf {
        self.config_dir.join("blobs")
    }
}
