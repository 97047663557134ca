//! Configuration management for Stagehand

pub mod schema;

pub use schema::Config;

use crate::error::{StagehandError, StagehandResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Name of the project-local config override file
const LOCAL_CONFIG_FILE: &str = ".stagehand.toml";

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("stagehand")
            .join("config.toml")
    }

    /// Get the state directory path
    pub fn state_dir() -> PathBuf {
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("stagehand")
    }

    /// Get the build history log path
    pub fn history_log_path() -> PathBuf {
        Self::state_dir().join("history.log")
    }

    /// The path this manager loads from
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Walk up from `start` looking for a project-local config file
    pub fn find_local_config(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(LOCAL_CONFIG_FILE))
            .find(|candidate| candidate.is_file())
    }

    /// Load configuration, creating default if not exists
    pub async fn load(&self) -> StagehandResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> StagehandResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| StagehandError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| StagehandError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Load configuration, preferring a project-local file when present
    pub async fn load_merged(&self, local: Option<&Path>) -> StagehandResult<Config> {
        match local {
            Some(path) => {
                debug!("Using local config: {}", path.display());
                self.load_from_file(path).await
            }
            None => self.load().await,
        }
    }

    /// Ensure the state directory exists
    pub async fn ensure_state_dir() -> StagehandResult<()> {
        let dir = Self::state_dir();
        if !dir.exists() {
            fs::create_dir_all(&dir)
                .await
                .map_err(|e| StagehandError::io("creating state directory", e))?;
        }
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
