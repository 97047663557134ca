//! Runtime module repository
//!
//! An index of every packaged file with its content hash, generated on
//! request from the concatenation of platform and plugin entries. Unlike
//! the fingerprint this is a build step: failures propagate.

use crate::error::{StagehandError, StagehandResult};
use crate::layout::DistributionFileEntry;
use serde::Serialize;
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Repository index file inside the run directory
pub const MODULE_REPOSITORY_FILE: &str = "modules.json";

#[derive(Debug, Serialize)]
struct RepositoryEntry {
    path: String,
    hash: String,
}

#[derive(Debug, Serialize)]
struct Repository {
    entries: Vec<RepositoryEntry>,
}

/// Generate the repository from all distribution entries of one run
pub async fn generate(
    run_dir: &Path,
    platform_entries: &[DistributionFileEntry],
    plugin_entries: &[(String, Vec<DistributionFileEntry>)],
) -> StagehandResult<()> {
    let all = platform_entries
        .iter()
        .chain(plugin_entries.iter().flat_map(|(_, entries)| entries.iter()));

    let entries: Vec<RepositoryEntry> = all
        .map(|entry| RepositoryEntry {
            path: entry
                .path
                .strip_prefix(run_dir)
                .unwrap_or(&entry.path)
                .display()
                .to_string(),
            hash: hex::encode(entry.hash.to_be_bytes()),
        })
        .collect();

    debug!("Generating module repository: {} entries", entries.len());

    let content = serde_json::to_string_pretty(&Repository { entries })?;
    let path = run_dir.join(MODULE_REPOSITORY_FILE);
    fs::write(&path, content)
        .await
        .map_err(|e| StagehandError::io(format!("writing {}", path.display()), e))
}
