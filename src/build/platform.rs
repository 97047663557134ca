//! Platform layout
//!
//! Lays out the shared runtime under `lib/`, computes the application
//! classpath, and writes the launcher support files: `bin/<properties>`,
//! the vm-options file one level above the run directory,
//! `core-classpath.txt`, and `build.txt`.

use crate::build::context::BuildContext;
use crate::build::request::BuildRequest;
use crate::error::{StagehandError, StagehandResult};
use crate::layout::{DistributionFileEntry, LayoutEngine};
use crate::product::{ProductConfiguration, ProductProperties};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info};

/// Classpath listing file inside the run directory
pub const CORE_CLASSPATH_FILE: &str = "core-classpath.txt";

/// Build number file inside the run directory
pub const BUILD_NUMBER_FILE: &str = "build.txt";

/// VM options written when the checkout does not provide a template
const DEFAULT_VM_OPTIONS: &str = "-ea\n-Xms256m\n-Xmx2048m\n";

/// In-memory result of the platform layout step
#[derive(Debug, Clone)]
pub struct PlatformLayout {
    /// The `lib/` directory holding the shared runtime
    pub lib_dir: PathBuf,

    /// Application classpath in layout order
    pub classpath: Vec<PathBuf>,
}

/// Lay out the platform and write its support files
pub async fn build_platform(
    engine: Arc<dyn LayoutEngine>,
    ctx: &BuildContext,
    product: &ProductConfiguration,
    props: &ProductProperties,
    request: &BuildRequest,
    run_dir: &Path,
) -> StagehandResult<(PlatformLayout, Vec<DistributionFileEntry>)> {
    let lib_dir = run_dir.join("lib");
    let entries = engine
        .layout_platform(&ctx.classes_root, &lib_dir, &product.platform_modules)
        .await?;

    let classpath = compute_classpath(&lib_dir, &entries);
    info!(
        "Platform laid out: {} entries, {} classpath roots",
        entries.len(),
        classpath.len()
    );

    write_properties_file(run_dir, props).await?;
    write_vm_options(ctx, run_dir, props).await?;
    write_build_number(run_dir, props).await?;
    write_classpath_listing(run_dir, &classpath).await?;

    if let Some(sink) = &request.on_classpath {
        sink(&classpath, run_dir);
    }

    Ok((PlatformLayout { lib_dir, classpath }, entries))
}

/// Classpath roots: unique first components under `lib/`, in the order the
/// layout enumerated them
fn compute_classpath(lib_dir: &Path, entries: &[DistributionFileEntry]) -> Vec<PathBuf> {
    let mut roots: Vec<PathBuf> = Vec::new();

    for entry in entries {
        let Some(rel) = &entry.lib_relative else {
            continue;
        };
        let Some(first) = rel.components().next() else {
            continue;
        };
        let root = lib_dir.join(first.as_os_str());
        if !roots.contains(&root) {
            roots.push(root);
        }
    }

    roots
}

async fn write_properties_file(run_dir: &Path, props: &ProductProperties) -> StagehandResult<()> {
    let bin_dir = run_dir.join("bin");
    fs::create_dir_all(&bin_dir)
        .await
        .map_err(|e| StagehandError::io(format!("creating {}", bin_dir.display()), e))?;

    let content = format!(
        "application.name={}\nplatform.prefix={}\nbuild.number={}\n",
        props.name, props.platform_prefix, props.build_number
    );

    let path = bin_dir.join(&props.properties_file);
    fs::write(&path, content)
        .await
        .map_err(|e| StagehandError::io(format!("writing {}", path.display()), e))
}

/// The vm-options file lands one level above the run directory so launcher
/// scripts shared between runs can find it
async fn write_vm_options(
    ctx: &BuildContext,
    run_dir: &Path,
    props: &ProductProperties,
) -> StagehandResult<()> {
    let target = run_dir
        .parent()
        .unwrap_or(run_dir)
        .join(&props.vm_options_file);

    let template = ctx.project_root.join("bin").join(&props.vm_options_file);
    if template.is_file() {
        debug!("Copying vm options from {}", template.display());
        fs::copy(&template, &target)
            .await
            .map_err(|e| StagehandError::io(format!("copying {}", template.display()), e))?;
    } else {
        fs::write(&target, DEFAULT_VM_OPTIONS)
            .await
            .map_err(|e| StagehandError::io(format!("writing {}", target.display()), e))?;
    }
    Ok(())
}

async fn write_build_number(run_dir: &Path, props: &ProductProperties) -> StagehandResult<()> {
    let path = run_dir.join(BUILD_NUMBER_FILE);
    fs::write(&path, &props.build_number)
        .await
        .map_err(|e| StagehandError::io(format!("writing {}", path.display()), e))
}

async fn write_classpath_listing(run_dir: &Path, classpath: &[PathBuf]) -> StagehandResult<()> {
    let mut content = classpath
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join("\n");
    content.push('\n');

    let path = run_dir.join(CORE_CLASSPATH_FILE);
    fs::write(&path, content)
        .await
        .map_err(|e| StagehandError::io(format!("writing {}", path.display()), e))
}
