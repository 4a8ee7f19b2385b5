//! Configuration loading and management
//!
//! Handles parsing of the `config.toml` in the data directory.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::plan::DEFAULT_PLAN_SAVE_DEBOUNCE_MS;

/// Config file name inside the data directory
pub const CONFIG_FILE: &str = "config.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Task defaults
    #[serde(default)]
    pub tasks: TasksConfig,

    /// Sync tuning
    #[serde(default)]
    pub sync: SyncConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tasks: TasksConfig::default(),
            sync: SyncConfig::default(),
        }
    }
}

/// Task-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksConfig {
    /// Category used when none is specified
    #[serde(default = "default_category")]
    pub default_category: String,
}

fn default_category() -> String {
    "daily".to_string()
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            default_category: default_category(),
        }
    }
}

/// Sync-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Quiet period for the debounced weekly-plan save, in milliseconds
    #[serde(default = "default_plan_debounce_ms")]
    pub plan_debounce_ms: u64,
}

fn default_plan_debounce_ms() -> u64 {
    DEFAULT_PLAN_SAVE_DEBOUNCE_MS
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            plan_debounce_ms: default_plan_debounce_ms(),
        }
    }
}

impl Config {
    /// Load configuration from a specific file path
    pub fn load(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from a data directory, falling back to defaults
    /// when the file is missing or unreadable.
    pub fn load_from_dir(dir: &Path) -> Config {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Config::default();
        }
        match Config::load(&path) {
            Ok(config) => config,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring invalid config");
                Config::default()
            }
        }
    }

    /// The plan-save debounce as a duration.
    pub fn plan_debounce(&self) -> Duration {
        Duration::from_millis(self.sync.plan_debounce_ms)
    }
}
