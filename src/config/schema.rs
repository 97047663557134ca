//! Configuration schema for Stagehand
//!
//! Configuration is stored at `~/.config/stagehand/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Build settings
    pub build: BuildConfig,

    /// Build server settings
    pub server: ServerConfig,

    /// Plugin cache settings
    pub cache: CacheConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,

    /// Record build outcomes in the history log
    pub history_log: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
            history_log: true,
        }
    }
}

/// Build settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Source checkout root (defaults to the current directory)
    pub project_root: Option<PathBuf>,

    /// Compiled classes root (defaults to `<project_root>/out/classes`)
    pub classes_dir: Option<PathBuf>,

    /// Output root for assembled builds (defaults to `<project_root>/out/dev-run`)
    pub out_root: Option<PathBuf>,

    /// Product descriptor file, relative to the project root
    pub products_file: String,

    /// Emit the per-plugin classpath manifest for unpacked runs
    pub unpacked: bool,

    /// Concurrent deletions when clearing a stale run directory
    pub delete_parallelism: usize,

    /// Hard timeout for product properties resolution, in seconds
    pub properties_timeout_secs: u64,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            project_root: None,
            classes_dir: None,
            out_root: None,
            products_file: "products.toml".to_string(),
            unpacked: true,
            delete_parallelism: 4,
            properties_timeout_secs: 30,
        }
    }
}

/// Build server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address; builds touch a shared classes directory, so the
    /// server only ever listens on loopback
    pub host: String,

    /// Listen port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7381,
        }
    }
}

/// Plugin cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Reuse plugin artifacts from the previous run when unchanged
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[server]"));
    }

    #[test]
    fn config_deserializes_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 7381);
        assert_eq!(config.build.delete_parallelism, 4);
        assert!(config.cache.enabled);
    }

    #[test]
    fn config_deserializes_partial() {
        let toml = r#"
            [server]
            port = 9000
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1"); // default preserved
        assert_eq!(config.build.products_file, "products.toml");
    }
}
