//! Path management for tablekeeper
//!
//! This module resolves the config directory and the files kept in it.

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::Arc;

static PATHS: OnceCell<Arc<Paths>> = OnceCell::new();

/// Manages all filesystem paths for the application
#[derive(Debug, Clone)]
pub struct Paths {
    /// Config directory path
    config_dir: PathBuf,
}

impl Paths {
    /// Initialize the paths singleton
    pub fn init(config: Option<PathBuf>) -> Result<Arc<Paths>> {
        let paths = PATHS.get_or_try_init(|| {
            let paths = Self::new(config)?;
            Ok::<_, anyhow::Error>(Arc::new(paths))
        })?;
        Ok(Arc::clone(paths))
    }

    /// Get the global paths instance
    pub fn get() -> Result<Arc<Paths>> {
        PATHS.get().map(Arc::clone).context("Paths not initialized")
    }

    pub(crate) fn new(config_override: Option<PathBuf>) -> Result<Self> {
        let config_dir = match config_override {
            Some(path) => path,
            None => directories::ProjectDirs::from("", "", "tablekeeper")
                .map(|dirs| dirs.config_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".tablekeeper")),
        };

        std::fs::create_dir_all(&config_dir).with_context(|| {
            format!("Failed to create config directory {}", config_dir.display())
        })?;

        Ok(Self { config_dir })
    }

    /// Get the config directory
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get the settings file path
    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    /// Get the database path for a configured file name.
    ///
    /// Absolute file names are used as-is.
    pub fn db_path(&self, file: &str) -> PathBuf {
        self.config_dir.join(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_paths_creation() {
        let temp_dir = TempDir::new().unwrap();
        let config = temp_dir.path().join("nested").join("conf");

        // Note: Can't use init() in tests due to OnceCell
        let paths = Paths::new(Some(config.clone())).unwrap();

        assert!(paths.config_dir().exists());
        assert_eq!(paths.settings_path(), config.join("settings.json"));
        assert_eq!(paths.db_path("test.db"), config.join("test.db"));
    }

    #[test]
    fn test_absolute_db_path() {
        let temp_dir = TempDir::new().unwrap();
        let paths = Paths::new(Some(temp_dir.path().to_path_buf())).unwrap();
        let elsewhere = temp_dir.path().join("other").join("data.db");

        assert_eq!(paths.db_path(elsewhere.to_str().unwrap()), elsewhere);
    }
}
