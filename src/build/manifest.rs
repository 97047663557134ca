//! Plugin classpath manifest
//!
//! For unpacked runs the launcher cannot discover plugin descriptors from
//! jars, so each plugin's classpath is written out explicitly: the direct
//! children of the plugin root, descriptor-bearing component first, the
//! plugin root itself as the trailing element, `;`-joined, one line per
//! plugin.

use crate::build::plugins::PluginBuildDescriptor;
use crate::error::{StagehandError, StagehandResult};
use std::fs::File;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Manifest file name inside the run directory
pub const PLUGIN_CLASSPATH_FILE: &str = "plugin-classpath.txt";

/// Descriptor entry every plugin must carry somewhere on its classpath
pub const PLUGIN_DESCRIPTOR_ENTRY: &str = "META-INF/plugin.xml";

/// Separator between classpath components on one line
const SEPARATOR: char = ';';

/// Write the manifest for every plugin that produced an output directory
pub async fn write_plugin_classpath(
    run_dir: &Path,
    descriptors: &[PluginBuildDescriptor],
) -> StagehandResult<()> {
    let mut lines = Vec::new();

    for descriptor in descriptors {
        if !descriptor.target_dir.is_dir() {
            debug!("Plugin {} produced no directory, skipping manifest", descriptor.id);
            continue;
        }
        lines.push(manifest_line(&descriptor.id, &descriptor.target_dir)?);
    }

    let path = run_dir.join(PLUGIN_CLASSPATH_FILE);
    let mut content = lines.join("\n");
    content.push('\n');
    fs::write(&path, content)
        .await
        .map_err(|e| StagehandError::io(format!("writing {}", path.display()), e))?;

    Ok(())
}

/// Build one plugin's manifest line.
///
/// The component physically containing the plugin descriptor goes first;
/// a directory carrying `META-INF/plugin.xml` is preferred, otherwise
/// candidate jars are probed for the descriptor entry. A plugin where no
/// component carries the descriptor could never be located at runtime, so
/// that fails the build.
pub fn manifest_line(plugin_id: &str, plugin_root: &Path) -> StagehandResult<String> {
    let mut components = direct_children(plugin_root)?;

    // A metadata directory wins over jar probing
    let holder = components
        .iter()
        .position(|c| c.is_dir() && c.join(PLUGIN_DESCRIPTOR_ENTRY).is_file())
        .or_else(|| {
            components
                .iter()
                .position(|c| c.extension().is_some_and(|ext| ext == "jar") && jar_contains_descriptor(c))
        })
        .ok_or_else(|| StagehandError::PluginDescriptorMissing {
            plugin: plugin_id.to_string(),
        })?;

    let first = components.remove(holder);

    let mut parts = vec![first];
    parts.append(&mut components);
    parts.push(plugin_root.to_path_buf());

    Ok(parts
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(&SEPARATOR.to_string()))
}

/// Direct children of the plugin root, sorted for stable output
fn direct_children(root: &Path) -> StagehandResult<Vec<PathBuf>> {
    let reader = std::fs::read_dir(root)
        .map_err(|e| StagehandError::io(format!("reading {}", root.display()), e))?;

    let mut children = Vec::new();
    for item in reader {
        let item = item.map_err(|e| StagehandError::io(format!("reading {}", root.display()), e))?;
        children.push(item.path());
    }
    children.sort();
    Ok(children)
}

fn jar_contains_descriptor(jar: &Path) -> bool {
    let Ok(file) = File::open(jar) else {
        return false;
    };
    let Ok(mut archive) = zip::ZipArchive::new(file) else {
        return false;
    };
    let found = archive.by_name(PLUGIN_DESCRIPTOR_ENTRY).is_ok();
    found
}
