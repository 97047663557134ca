//! Build orchestration
//!
//! One orchestrator per product variant; `build()` runs the full task
//! graph for one request and drains every spawned task before returning,
//! so completion is always observable. Failures propagate to the caller;
//! there are no retries.

use crate::build::context::BuildContext;
use crate::build::plugins::{PluginBuildDescriptor, PluginBuilder};
use crate::build::request::BuildRequest;
use crate::build::{fingerprint, manifest, platform, repository, PLUGINS_DIR};
use crate::config::Config;
use crate::error::{StagehandError, StagehandResult};
use crate::history::BuildHistory;
use crate::layout::{ClassDirLayoutEngine, DistributionFileEntry, LayoutEngine};
use crate::product::{
    resolve_factory, ArtifactSpec, ProductConfiguration, ProductProperties, ProductsFile,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::fs;
use tokio::sync::Semaphore;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info};

/// Result of one completed build
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    /// The assembled run directory
    pub run_dir: PathBuf,

    /// Plugins applicable to this build
    pub total_plugins: usize,

    /// Plugins satisfied by relocating a cached directory
    pub reused_plugins: usize,

    /// Content fingerprint of the assembled output
    pub fingerprint: String,

    /// Wall-clock build time
    pub duration: Duration,
}

impl BuildOutcome {
    /// One-line human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "{} plugins ({} reused) in {:.2}s, fingerprint {} -> {}",
            self.total_plugins,
            self.reused_plugins,
            self.duration.as_secs_f64(),
            self.fingerprint,
            self.run_dir.display()
        )
    }
}

/// Runs the build task graph for one product variant
pub struct BuildOrchestrator {
    config: Config,
    descriptor: ProductsFile,
    engine: Arc<dyn LayoutEngine>,
}

impl std::fmt::Debug for BuildOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildOrchestrator")
            .field("config", &self.config)
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

impl BuildOrchestrator {
    /// Create an orchestrator, loading and validating the product
    /// descriptor up front so configuration errors surface before any
    /// build work starts
    pub async fn new(config: &Config, request: &BuildRequest) -> StagehandResult<Self> {
        let descriptor_path = request.project_root.join(&config.build.products_file);
        let descriptor = ProductsFile::load(&descriptor_path).await?;
        resolve_factory(&descriptor.product(&request.product)?.factory)?;

        Ok(Self {
            config: config.clone(),
            descriptor,
            engine: Arc::new(ClassDirLayoutEngine),
        })
    }

    /// Substitute the layout engine
    pub fn with_engine(mut self, engine: Arc<dyn LayoutEngine>) -> Self {
        self.engine = engine;
        self
    }

    /// Run the full task graph for one request
    pub async fn build(&self, request: &BuildRequest) -> StagehandResult<BuildOutcome> {
        let started = Instant::now();
        let product = self.descriptor.product(&request.product)?.clone();
        let ctx = BuildContext::create(request, &self.descriptor, &self.config).await?;

        let run_dir = ctx.run_dir(&request.product);
        let cache_root = ctx.cache_root(&request.product);

        // Stale-run cleanup and properties resolution are independent
        let (prepared, props) = tokio::join!(
            prepare_run_dir(&run_dir, &cache_root, self.config.build.delete_parallelism),
            self.resolve_properties(&request.product, &product, &ctx.project_root),
        );
        prepared?;
        let props = props?;

        // Platform layout and artifact path rewrite run concurrently;
        // plugin builds wait on both
        let platform_task = self.spawn_platform(&ctx, &product, &props, request, &run_dir);
        let artifacts_task = spawn_artifact_rewrite(ctx.artifacts.clone(), run_dir.clone());

        let (platform_layout, platform_entries) = join_task(platform_task).await?;
        let artifacts = join_task(artifacts_task).await?;
        debug!(
            "Platform classpath has {} roots, {} artifact outputs rewritten",
            platform_layout.classpath.len(),
            artifacts.len()
        );

        let plugins_dir = run_dir.join(PLUGINS_DIR);
        let descriptors: Vec<PluginBuildDescriptor> = self
            .descriptor
            .applicable_plugins(&product, &request.extra_plugins)?
            .into_iter()
            .map(|(id, spec)| {
                PluginBuildDescriptor::resolve(id, spec, &plugins_dir, &ctx.classes_root)
            })
            .collect();

        let builder = PluginBuilder::new(self.engine.clone(), self.config.cache.enabled);
        let per_plugin = builder
            .build_all(&descriptors, &ctx, &cache_root, true)
            .await?;
        builder
            .copy_additional(&props, &ctx.project_root, &plugins_dir)
            .await?;

        let named: Vec<(String, Vec<DistributionFileEntry>)> = descriptors
            .iter()
            .map(|d| d.id.clone())
            .zip(per_plugin)
            .collect();

        // Manifest, repository, and fingerprint only need the joined
        // plugin results; they do not depend on each other
        let manifest_step = async {
            if self.config.build.unpacked {
                manifest::write_plugin_classpath(&run_dir, &descriptors).await
            } else {
                Ok(())
            }
        };
        let repository_step = async {
            if request.generate_module_repository {
                repository::generate(&run_dir, &platform_entries, &named).await
            } else {
                Ok(())
            }
        };
        let fingerprint_step = async {
            let fp = fingerprint::compute(&run_dir, &platform_entries, &named);
            fp.persist(&run_dir).await;
            fp
        };

        let (manifest_done, repository_done, fp) =
            tokio::join!(manifest_step, repository_step, fingerprint_step);
        manifest_done?;
        repository_done?;

        let outcome = BuildOutcome {
            run_dir,
            total_plugins: descriptors.len(),
            reused_plugins: builder.reused_count(),
            fingerprint: fp.digest,
            duration: started.elapsed(),
        };

        if self.config.general.history_log {
            BuildHistory::default().record(&request.product, &outcome).await;
        }

        info!("Build {} finished: {}", request.product, outcome.summary());
        Ok(outcome)
    }

    /// Resolve product properties through the factory registry, bounded by
    /// the configured hard timeout
    async fn resolve_properties(
        &self,
        product_code: &str,
        product: &ProductConfiguration,
        project_root: &Path,
    ) -> StagehandResult<ProductProperties> {
        let factory = resolve_factory(&product.factory)?;
        let seconds = self.config.build.properties_timeout_secs;

        tokio::time::timeout(
            Duration::from_secs(seconds),
            factory.create(product_code, &product.properties, project_root),
        )
        .await
        .map_err(|_| StagehandError::PropertiesTimeout {
            product: product_code.to_string(),
            seconds,
        })?
    }

    fn spawn_platform(
        &self,
        ctx: &BuildContext,
        product: &ProductConfiguration,
        props: &ProductProperties,
        request: &BuildRequest,
        run_dir: &Path,
    ) -> JoinHandle<StagehandResult<(platform::PlatformLayout, Vec<DistributionFileEntry>)>> {
        let engine = self.engine.clone();
        let ctx = ctx.clone();
        let product = product.clone();
        let props = props.clone();
        let request = request.clone();
        let run_dir = run_dir.to_path_buf();

        tokio::spawn(async move {
            platform::build_platform(engine, &ctx, &product, &props, &request, &run_dir).await
        })
    }
}

/// Prepare the run directory for a fresh build.
///
/// The previous run's plugin output becomes the new cache generation (one
/// rename); every other stale child is deleted concurrently under a small
/// semaphore so the fan-out cannot saturate disk IO. An absent run
/// directory is simply created, nothing is deleted.
pub(crate) async fn prepare_run_dir(
    run_dir: &Path,
    cache_root: &Path,
    delete_parallelism: usize,
) -> StagehandResult<()> {
    if !run_dir.exists() {
        return fs::create_dir_all(run_dir)
            .await
            .map_err(|e| StagehandError::io(format!("creating {}", run_dir.display()), e));
    }

    // The cache never survives two generations
    if cache_root.exists() {
        fs::remove_dir_all(cache_root)
            .await
            .map_err(|e| StagehandError::io(format!("clearing {}", cache_root.display()), e))?;
    }

    let previous_plugins = run_dir.join(PLUGINS_DIR);
    if previous_plugins.is_dir() {
        fs::rename(&previous_plugins, cache_root).await.map_err(|e| {
            StagehandError::io(
                format!("relocating previous plugins to {}", cache_root.display()),
                e,
            )
        })?;
    }

    let semaphore = Arc::new(Semaphore::new(delete_parallelism.max(1)));
    let mut deletions = JoinSet::new();

    let mut reader = fs::read_dir(run_dir)
        .await
        .map_err(|e| StagehandError::io(format!("reading {}", run_dir.display()), e))?;
    while let Some(item) = reader
        .next_entry()
        .await
        .map_err(|e| StagehandError::io(format!("reading {}", run_dir.display()), e))?
    {
        let path = item.path();
        let is_dir = item
            .file_type()
            .await
            .map_err(|e| StagehandError::io(format!("inspecting {}", path.display()), e))?
            .is_dir();
        let semaphore = semaphore.clone();

        deletions.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|_| StagehandError::Internal("deletion pool closed".to_string()))?;

            let removed = if is_dir {
                fs::remove_dir_all(&path).await
            } else {
                fs::remove_file(&path).await
            };
            removed.map_err(|e| StagehandError::io(format!("deleting {}", path.display()), e))
        });
    }

    while let Some(joined) = deletions.join_next().await {
        joined.map_err(|e| StagehandError::TaskPanic(e.to_string()))??;
    }

    Ok(())
}

/// Point externally-defined artifact outputs at this run's directory
fn spawn_artifact_rewrite(
    artifacts: Vec<ArtifactSpec>,
    run_dir: PathBuf,
) -> JoinHandle<StagehandResult<Vec<ArtifactSpec>>> {
    tokio::spawn(async move {
        let mut rewritten = Vec::with_capacity(artifacts.len());
        for artifact in artifacts {
            let output = run_dir.join(&artifact.output);
            if let Some(parent) = output.parent() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| StagehandError::io(format!("creating {}", parent.display()), e))?;
            }
            rewritten.push(ArtifactSpec {
                name: artifact.name,
                output,
            });
        }
        Ok(rewritten)
    })
}

async fn join_task<T>(handle: JoinHandle<StagehandResult<T>>) -> StagehandResult<T> {
    handle
        .await
        .map_err(|e| StagehandError::TaskPanic(e.to_string()))?
}
