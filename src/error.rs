//! Error types for Stagehand
//!
//! All modules use `StagehandResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Stagehand operations
pub type StagehandResult<T> = Result<T, StagehandError>;

/// All errors that can occur in Stagehand
#[derive(Error, Debug)]
pub enum StagehandError {
    // Configuration errors
    #[error("Unknown product: {0}")]
    ProductUnknown(String),

    #[error("Product descriptor not found: {0}")]
    DescriptorMissing(PathBuf),

    #[error("Invalid product descriptor at {path}: {reason}")]
    DescriptorInvalid { path: PathBuf, reason: String },

    #[error("Unknown plugin id in descriptor: {0}")]
    PluginUnknown(String),

    #[error("Unknown product properties factory: {0}")]
    FactoryUnknown(String),

    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Compiled classes directory not found: {0}")]
    ClassesRootMissing(PathBuf),

    // Cache errors
    #[error("Cached directory for plugin {plugin} is inconsistent: {reason}")]
    CacheInconsistent { plugin: String, reason: String },

    // Build errors
    #[error("Plugin build failed: {plugin}: {reason}")]
    PluginBuild { plugin: String, reason: String },

    #[error("No component of plugin {plugin} contains the plugin descriptor")]
    PluginDescriptorMissing { plugin: String },

    #[error("Timed out resolving product properties for {product} after {seconds}s")]
    PropertiesTimeout { product: String, seconds: u64 },

    #[error("Build task panicked: {0}")]
    TaskPanic(String),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Server errors
    #[error("Failed to bind server to {addr}: {reason}")]
    ServerBind { addr: String, reason: String },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StagehandError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Whether this error was caused by bad configuration rather than a
    /// failed build step.
    ///
    /// Configuration errors are reported to the caller verbatim (HTTP 400,
    /// CLI exit before any build work); everything else is an internal
    /// build failure surfaced as an opaque 503 in server mode.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::ProductUnknown(_)
                | Self::DescriptorMissing(_)
                | Self::DescriptorInvalid { .. }
                | Self::PluginUnknown(_)
                | Self::FactoryUnknown(_)
                | Self::ConfigInvalid { .. }
                | Self::ClassesRootMissing(_)
        )
    }

    /// An actionable hint for user-facing errors, if one exists
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ProductUnknown(_) => {
                Some("Run `stagehand products` to list the products the descriptor defines")
            }
            Self::DescriptorMissing(_) => {
                Some("Point --project-root at a checkout containing products.toml")
            }
            Self::ClassesRootMissing(_) => {
                Some("Compile the project first, or pass --classes-dir explicitly")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_classified() {
        assert!(StagehandError::ProductUnknown("x".into()).is_configuration());
        assert!(StagehandError::FactoryUnknown("x".into()).is_configuration());
        assert!(!StagehandError::Internal("x".into()).is_configuration());
        assert!(!StagehandError::CacheInconsistent {
            plugin: "p".into(),
            reason: "r".into()
        }
        .is_configuration());
    }

    #[test]
    fn hints_exist_for_config_errors() {
        assert!(StagehandError::ProductUnknown("x".into()).hint().is_some());
        assert!(StagehandError::Internal("x".into()).hint().is_none());
    }
}
