//! Layout engine abstraction
//!
//! The heavy bytecode-to-artifact copy routines live behind this trait so
//! the orchestrator stays independent of how files physically reach the run
//! directory. The default implementation copies compiled class directories;
//! tests substitute their own.

use crate::error::StagehandResult;
use crate::layout::DistributionFileEntry;
use async_trait::async_trait;
use std::path::Path;

/// Lays out platform and plugin file trees under a run directory
#[async_trait]
pub trait LayoutEngine: Send + Sync {
    /// Lay out the shared platform modules under `lib_dir`, returning one
    /// entry per file with `lib_relative` set
    async fn layout_platform(
        &self,
        classes_root: &Path,
        lib_dir: &Path,
        modules: &[String],
    ) -> StagehandResult<Vec<DistributionFileEntry>>;

    /// Lay out one plugin's modules under `plugin_root`.
    ///
    /// With `copy_files` false the tree is assumed to already exist (a
    /// relocated cache entry) and only entries are produced.
    async fn layout_plugin(
        &self,
        classes_root: &Path,
        plugin_root: &Path,
        modules: &[String],
        copy_files: bool,
    ) -> StagehandResult<Vec<DistributionFileEntry>>;
}
