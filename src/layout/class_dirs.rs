//! Directory-convention layout engine
//!
//! Copies each module's compiled class tree (`production/<module>`) into the
//! run directory as-is. File enumeration is sorted so entry order is stable
//! for a given input set, which downstream fingerprinting relies on.

use crate::cache::marker::UNCHANGED_MARKER;
use crate::error::{StagehandError, StagehandResult};
use crate::layout::{hash_file_contents, module_output_dir, DistributionFileEntry, LayoutEngine};
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Layout engine copying compiled class directories verbatim
#[derive(Debug, Default)]
pub struct ClassDirLayoutEngine;

#[async_trait]
impl LayoutEngine for ClassDirLayoutEngine {
    async fn layout_platform(
        &self,
        classes_root: &Path,
        lib_dir: &Path,
        modules: &[String],
    ) -> StagehandResult<Vec<DistributionFileEntry>> {
        let mut entries = Vec::new();

        for module in modules {
            let src = module_output_dir(classes_root, module);
            if !src.is_dir() {
                debug!("Platform module {module} has no compiled output, skipping");
                continue;
            }

            let dst = lib_dir.join(module);
            copy_tree(&src, &dst)?;

            for file in walk_files(&dst)? {
                let rel = relative_to(&file, lib_dir);
                let hash = hash_file_contents(&file)?;
                entries.push(DistributionFileEntry::in_lib(file, hash, rel));
            }
        }

        Ok(entries)
    }

    async fn layout_plugin(
        &self,
        classes_root: &Path,
        plugin_root: &Path,
        modules: &[String],
        copy_files: bool,
    ) -> StagehandResult<Vec<DistributionFileEntry>> {
        let mut entries = Vec::new();

        for module in modules {
            let dst = plugin_root.join(module);

            if copy_files {
                let src = module_output_dir(classes_root, module);
                copy_tree(&src, &dst)?;
            }

            if !dst.is_dir() {
                continue;
            }

            for file in walk_files(&dst)? {
                let hash = hash_file_contents(&file)?;
                entries.push(DistributionFileEntry::new(file, hash));
            }
        }

        Ok(entries)
    }
}

/// Copy a directory tree, creating destination directories as needed
pub fn copy_tree(src: &Path, dst: &Path) -> StagehandResult<()> {
    fs::create_dir_all(dst)
        .map_err(|e| StagehandError::io(format!("creating {}", dst.display()), e))?;

    let mut pending = vec![(src.to_path_buf(), dst.to_path_buf())];
    while let Some((from, to)) = pending.pop() {
        let reader = fs::read_dir(&from)
            .map_err(|e| StagehandError::io(format!("reading {}", from.display()), e))?;

        for item in reader {
            let item =
                item.map_err(|e| StagehandError::io(format!("reading {}", from.display()), e))?;
            let target = to.join(item.file_name());

            if item
                .file_type()
                .map_err(|e| StagehandError::io(format!("inspecting {}", from.display()), e))?
                .is_dir()
            {
                fs::create_dir_all(&target)
                    .map_err(|e| StagehandError::io(format!("creating {}", target.display()), e))?;
                pending.push((item.path(), target));
            } else {
                // Compiler sentinel files are build metadata, never packaged
                if item.file_name() == UNCHANGED_MARKER {
                    continue;
                }
                fs::copy(item.path(), &target).map_err(|e| {
                    StagehandError::io(
                        format!("copying {} to {}", item.path().display(), target.display()),
                        e,
                    )
                })?;
            }
        }
    }

    Ok(())
}

/// Collect every packaged file under `root`, sorted by path; compiler
/// sentinel files are excluded
pub fn walk_files(root: &Path) -> StagehandResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let reader = fs::read_dir(&dir)
            .map_err(|e| StagehandError::io(format!("reading {}", dir.display()), e))?;

        for item in reader {
            let item =
                item.map_err(|e| StagehandError::io(format!("reading {}", dir.display()), e))?;
            let path = item.path();
            if path.is_dir() {
                pending.push(path);
            } else if item.file_name() != UNCHANGED_MARKER {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

fn relative_to(file: &Path, root: &Path) -> PathBuf {
    file.strip_prefix(root).unwrap_or(file).to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_module(classes_root: &Path, module: &str, files: &[(&str, &str)]) {
        let dir = module_output_dir(classes_root, module);
        for (name, content) in files {
            let path = dir.join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
    }

    #[tokio::test]
    async fn platform_layout_copies_and_hashes() {
        let dir = TempDir::new().unwrap();
        let classes = dir.path().join("classes");
        let lib = dir.path().join("run/lib");
        write_module(&classes, "app.core", &[("Main.class", "m"), ("sub/Util.class", "u")]);

        let engine = ClassDirLayoutEngine;
        let entries = engine
            .layout_platform(&classes, &lib, &["app.core".into()])
            .await
            .unwrap();

        assert_eq!(entries.len(), 2);
        assert!(lib.join("app.core/Main.class").is_file());
        assert!(lib.join("app.core/sub/Util.class").is_file());
        assert_eq!(
            entries[0].lib_relative.as_deref(),
            Some(Path::new("app.core/Main.class"))
        );
    }

    #[tokio::test]
    async fn plugin_layout_metadata_only_reads_existing_tree() {
        let dir = TempDir::new().unwrap();
        let classes = dir.path().join("classes");
        let root = dir.path().join("run/plugins/vcs");

        // Tree already in place, as after a cache relocation
        fs::create_dir_all(root.join("plugin.vcs")).unwrap();
        fs::write(root.join("plugin.vcs/Impl.class"), "i").unwrap();

        let engine = ClassDirLayoutEngine;
        let entries = engine
            .layout_plugin(&classes, &root, &["plugin.vcs".into()], false)
            .await
            .unwrap();

        assert_eq!(entries.len(), 1);
        assert!(entries[0].lib_relative.is_none());
    }

    #[tokio::test]
    async fn plugin_layout_copies_when_building() {
        let dir = TempDir::new().unwrap();
        let classes = dir.path().join("classes");
        let root = dir.path().join("run/plugins/vcs");
        write_module(&classes, "plugin.vcs", &[("META-INF/plugin.xml", "<plugin/>")]);

        let engine = ClassDirLayoutEngine;
        let entries = engine
            .layout_plugin(&classes, &root, &["plugin.vcs".into()], true)
            .await
            .unwrap();

        assert_eq!(entries.len(), 1);
        assert!(root.join("plugin.vcs/META-INF/plugin.xml").is_file());
    }

    #[tokio::test]
    async fn sentinel_files_never_packaged() {
        let dir = TempDir::new().unwrap();
        let classes = dir.path().join("classes");
        let lib = dir.path().join("run/lib");
        write_module(&classes, "app.core", &[("Main.class", "m"), (UNCHANGED_MARKER, "")]);

        let engine = ClassDirLayoutEngine;
        let entries = engine
            .layout_platform(&classes, &lib, &["app.core".into()])
            .await
            .unwrap();

        assert_eq!(entries.len(), 1);
        assert!(!lib.join("app.core").join(UNCHANGED_MARKER).exists());
    }

    #[test]
    fn walk_files_sorted() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b"), "").unwrap();
        fs::write(dir.path().join("a"), "").unwrap();
        fs::create_dir(dir.path().join("c")).unwrap();
        fs::write(dir.path().join("c/d"), "").unwrap();

        let files = walk_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.strip_prefix(dir.path()).unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a", "b", "c/d"]);
    }
}
