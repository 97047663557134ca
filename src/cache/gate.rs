//! Plugin cache gate
//!
//! Decides per plugin whether the cached directory from the previous run
//! can be reused. Reuse relocates the cached directory with a rename, so a
//! cache entry satisfies at most one build.

use crate::error::{StagehandError, StagehandResult};
use crate::layout::{module_output_dir, PluginSpec};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Reuse-or-rebuild decision for one plugin
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheDecision {
    /// Relocate the cached directory into the run
    Reuse { from: PathBuf },

    /// Build the plugin from compiled output
    Rebuild { reason: String },
}

/// Evaluate whether a plugin's cached directory can be reused.
///
/// The plugin is reuse-eligible only when a cached directory exists and
/// every module carries the unchanged marker; the first module found
/// without a marker names the rebuild reason. Partial-plugin reuse is not
/// supported.
pub fn evaluate(
    spec: &PluginSpec,
    modules: &[String],
    cache_root: &Path,
    classes_root: &Path,
) -> CacheDecision {
    let cached = cache_root.join(&spec.directory);
    if !cached.is_dir() {
        return CacheDecision::Rebuild {
            reason: "initial build".to_string(),
        };
    }

    for module in modules {
        if !super::marker::is_unchanged(classes_root, module) {
            return CacheDecision::Rebuild {
                reason: format!("{module} is changed"),
            };
        }
    }

    CacheDecision::Reuse { from: cached }
}

/// Verify the compiled output layout still matches what the cached plugin
/// was built from.
///
/// A reusable cache entry whose source modules have vanished or emptied out
/// means the checkout and the cache disagree; that is a hard inconsistency,
/// never a silent rebuild.
pub fn verify_modules(
    spec: &PluginSpec,
    modules: &[String],
    classes_root: &Path,
) -> StagehandResult<()> {
    for module in modules {
        let out = module_output_dir(classes_root, module);
        if !has_content(&out) {
            return Err(StagehandError::CacheInconsistent {
                plugin: spec.directory.clone(),
                reason: format!("compiled output for {module} is missing or empty"),
            });
        }
    }
    Ok(())
}

/// Relocate a cached plugin directory into its final location.
///
/// This is a move, not a copy: the cache entry is consumed and cannot
/// satisfy another build.
pub async fn reuse(from: &Path, to: &Path) -> StagehandResult<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| StagehandError::io(format!("creating {}", parent.display()), e))?;
    }

    fs::rename(from, to).await.map_err(|e| {
        StagehandError::io(
            format!("relocating cached {} to {}", from.display(), to.display()),
            e,
        )
    })?;

    debug!("Reused cached plugin dir: {} -> {}", from.display(), to.display());
    Ok(())
}

/// A directory that exists and contains at least one entry besides the
/// unchanged marker
fn has_content(dir: &Path) -> bool {
    let Ok(reader) = std::fs::read_dir(dir) else {
        return false;
    };
    reader
        .flatten()
        .any(|e| e.file_name() != super::marker::UNCHANGED_MARKER)
}
