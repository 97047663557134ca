//! Concurrent plugin building
//!
//! One task per plugin, no ordering between them; the aggregate call
//! returns only after every task finished. Reused plugins are counted for
//! observability.

use crate::build::context::BuildContext;
use crate::cache::{self, CacheDecision};
use crate::error::{StagehandError, StagehandResult};
use crate::layout::{self, DistributionFileEntry, LayoutEngine, PluginSpec};
use crate::product::ProductProperties;
use futures_util::future::join_all;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Everything needed to build one plugin this run
#[derive(Debug, Clone)]
pub struct PluginBuildDescriptor {
    /// Plugin id from the descriptor
    pub id: String,

    /// Static layout description
    pub spec: PluginSpec,

    /// Final output directory under the run's plugins dir
    pub target_dir: PathBuf,

    /// Modules that actually have compiled content to package
    pub modules: Vec<String>,
}

impl PluginBuildDescriptor {
    /// Resolve a descriptor for one plugin, keeping only content-bearing
    /// modules
    pub fn resolve(
        id: String,
        spec: PluginSpec,
        plugins_dir: &Path,
        classes_root: &Path,
    ) -> Self {
        let modules = spec
            .modules
            .iter()
            .filter(|m| layout::module_output_dir(classes_root, m).is_dir())
            .cloned()
            .collect();

        Self {
            target_dir: plugins_dir.join(&spec.directory),
            id,
            spec,
            modules,
        }
    }
}

/// Builds every plugin of one run concurrently
pub struct PluginBuilder {
    engine: Arc<dyn LayoutEngine>,
    cache_enabled: bool,
    reused: Arc<AtomicUsize>,
}

impl PluginBuilder {
    pub fn new(engine: Arc<dyn LayoutEngine>, cache_enabled: bool) -> Self {
        Self {
            engine,
            cache_enabled,
            reused: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Plugins satisfied from cache so far
    pub fn reused_count(&self) -> usize {
        self.reused.load(Ordering::Relaxed)
    }

    /// Build all plugins, returning one entry list per descriptor in input
    /// order.
    ///
    /// Every task runs to completion before this returns; the first failure
    /// is then propagated. Output directories of plugins that succeeded
    /// before a failure stay on disk.
    pub async fn build_all(
        &self,
        descriptors: &[PluginBuildDescriptor],
        ctx: &BuildContext,
        cache_root: &Path,
        need_entries: bool,
    ) -> StagehandResult<Vec<Vec<DistributionFileEntry>>> {
        let mut handles = Vec::with_capacity(descriptors.len());

        for descriptor in descriptors {
            let descriptor = descriptor.clone();
            let engine = self.engine.clone();
            let reused = self.reused.clone();
            let classes_root = ctx.classes_root.clone();
            let cache_root = cache_root.to_path_buf();
            let cache_enabled = self.cache_enabled;

            handles.push(tokio::spawn(async move {
                build_one(
                    engine,
                    reused,
                    descriptor,
                    classes_root,
                    cache_root,
                    cache_enabled,
                    need_entries,
                )
                .await
            }));
        }

        let mut results = Vec::with_capacity(handles.len());
        for joined in join_all(handles).await {
            let result = joined.map_err(|e| StagehandError::TaskPanic(e.to_string()))?;
            results.push(result);
        }

        results.into_iter().collect()
    }

    /// Copy additional plugin directories named by product properties.
    ///
    /// These are supplied out-of-band and never participate in caching.
    pub async fn copy_additional(
        &self,
        props: &ProductProperties,
        project_root: &Path,
        plugins_dir: &Path,
    ) -> StagehandResult<()> {
        for rel in &props.additional_plugin_dirs {
            let src = project_root.join(rel);
            let name = rel
                .file_name()
                .ok_or_else(|| {
                    StagehandError::Internal(format!(
                        "additional plugin dir has no name: {}",
                        rel.display()
                    ))
                })?
                .to_os_string();

            debug!("Copying additional plugin dir {}", src.display());
            layout::copy_tree(&src, &plugins_dir.join(name))?;
        }
        Ok(())
    }
}

async fn build_one(
    engine: Arc<dyn LayoutEngine>,
    reused: Arc<AtomicUsize>,
    descriptor: PluginBuildDescriptor,
    classes_root: PathBuf,
    cache_root: PathBuf,
    cache_enabled: bool,
    need_entries: bool,
) -> StagehandResult<Vec<DistributionFileEntry>> {
    let decision = if cache_enabled {
        cache::evaluate(&descriptor.spec, &descriptor.modules, &cache_root, &classes_root)
    } else {
        CacheDecision::Rebuild {
            reason: "cache disabled".to_string(),
        }
    };

    match decision {
        CacheDecision::Rebuild { reason } => {
            info!(plugin = %descriptor.id, %reason, "Building plugin");
            engine
                .layout_plugin(&classes_root, &descriptor.target_dir, &descriptor.modules, true)
                .await
        }
        CacheDecision::Reuse { from } => {
            cache::verify_modules(&descriptor.spec, &descriptor.modules, &classes_root)?;
            cache::reuse(&from, &descriptor.target_dir).await?;
            reused.fetch_add(1, Ordering::Relaxed);

            if need_entries {
                // Metadata-only pass over the relocated tree
                engine
                    .layout_plugin(
                        &classes_root,
                        &descriptor.target_dir,
                        &descriptor.modules,
                        false,
                    )
                    .await
            } else {
                Ok(Vec::new())
            }
        }
    }
}
