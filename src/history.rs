//! Build history logging
//!
//! Appends one JSON line per completed build to the state directory.
//! History is observability only; write failures never fail a build.

use crate::build::BuildOutcome;
use crate::config::ConfigManager;
use chrono::Utc;
use std::path::PathBuf;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::warn;

/// File-based history logger appending JSON lines
pub struct BuildHistory {
    path: PathBuf,
}

impl BuildHistory {
    /// History logger writing to the default state location
    pub fn new() -> Self {
        Self {
            path: ConfigManager::history_log_path(),
        }
    }

    /// History logger writing to a specific file
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Record one build outcome
    pub async fn record(&self, product: &str, outcome: &BuildOutcome) {
        let entry = serde_json::json!({
            "timestamp": Utc::now().to_rfc3339(),
            "product": product,
            "run_dir": outcome.run_dir.display().to_string(),
            "total_plugins": outcome.total_plugins,
            "reused_plugins": outcome.reused_plugins,
            "fingerprint": outcome.fingerprint,
            "duration_ms": outcome.duration.as_millis() as u64,
        });

        let mut line = match serde_json::to_string(&entry) {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to serialize history entry: {e}");
                return;
            }
        };
        line.push('\n');

        if let Err(e) = self.append(&line).await {
            warn!("Failed to write build history: {e}");
        }
    }

    async fn append(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

impl Default for BuildHistory {
    fn default() -> Self {
        Self::new()
    }
}
