//! Per-product build status tracking
//!
//! An explicit service object handed to request handlers; reads are
//! best-effort snapshots and may race with an in-flight build's final
//! status write, which is acceptable for a purely diagnostic signal.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Lifecycle of one product prefix's most recent build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildStatus {
    /// No build was ever requested for this prefix
    #[default]
    Undefined,

    /// A build request was admitted and has not finished
    InProgress,

    /// The last build completed successfully
    Ok,

    /// The last build failed
    Failed,
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Undefined => "UNDEFINED",
            Self::InProgress => "IN_PROGRESS",
            Self::Ok => "OK",
            Self::Failed => "FAILED",
        };
        write!(f, "{name}")
    }
}

/// Status of every product prefix the server has seen
#[derive(Clone, Default)]
pub struct StatusBoard {
    inner: Arc<Mutex<HashMap<String, BuildStatus>>>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a prefix's status
    pub async fn set(&self, prefix: &str, status: BuildStatus) {
        self.inner.lock().await.insert(prefix.to_string(), status);
    }

    /// Read a prefix's status, defaulting to `Undefined`
    pub async fn get(&self, prefix: &str) -> BuildStatus {
        self.inner
            .lock()
            .await
            .get(prefix)
            .copied()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_prefix_is_undefined() {
        let board = StatusBoard::new();
        assert_eq!(board.get("idea").await, BuildStatus::Undefined);
    }

    #[tokio::test]
    async fn set_then_get() {
        let board = StatusBoard::new();
        board.set("idea", BuildStatus::InProgress).await;
        assert_eq!(board.get("idea").await, BuildStatus::InProgress);

        board.set("idea", BuildStatus::Ok).await;
        assert_eq!(board.get("idea").await, BuildStatus::Ok);
    }

    #[test]
    fn display_matches_wire_format() {
        assert_eq!(BuildStatus::Undefined.to_string(), "UNDEFINED");
        assert_eq!(BuildStatus::InProgress.to_string(), "IN_PROGRESS");
        assert_eq!(BuildStatus::Ok.to_string(), "OK");
        assert_eq!(BuildStatus::Failed.to_string(), "FAILED");
    }
}
