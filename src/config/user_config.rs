//! User configuration for tablekeeper
//!
//! This module handles user-configurable settings stored in settings.json.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::Paths;

/// Default database file name
pub const DEFAULT_DB_FILE: &str = "test.db";

/// User configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserConfig {
    /// Server ID used as the password hashing salt
    #[serde(default)]
    pub server_id: String,

    /// Database file, relative to the config directory
    #[serde(default = "default_db_file")]
    pub db_file: String,

    /// Allowed table types; empty allows any type
    #[serde(default)]
    pub table_types: Vec<String>,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            server_id: String::new(),
            db_file: default_db_file(),
            table_types: Vec::new(),
        }
    }
}

impl UserConfig {
    /// Load configuration from the settings file in the config directory
    pub fn load() -> Result<Self> {
        let paths = Paths::get()?;
        Self::load_from(&paths.settings_path())
    }

    /// Load configuration from `path`, writing defaults when it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).context("Failed to read settings file")?;
            let config: UserConfig =
                serde_json::from_str(&content).context("Failed to parse settings file")?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let paths = Paths::get()?;
        self.save_to(&paths.settings_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(path, content).context("Failed to write settings file")?;

        Ok(())
    }

    /// Database location: `dbFile` resolved against the config directory
    pub fn db_path(&self) -> Result<PathBuf> {
        Ok(Paths::get()?.db_path(&self.db_file))
    }

    /// Generate a server id if missing. Returns true when the config changed.
    pub fn ensure_server_id(&mut self) -> bool {
        if self.server_id.is_empty() {
            self.server_id = uuid::Uuid::new_v4().to_string();
            true
        } else {
            false
        }
    }
}

fn default_db_file() -> String {
    DEFAULT_DB_FILE.to_string()
}
