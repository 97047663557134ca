//! Distribution layout model
//!
//! Types describing what lands where in an assembled build: per-file
//! distribution entries with content hashes, static plugin layout
//! descriptions, and the engine seam the orchestrator calls to lay out
//! platform and plugin trees.

mod class_dirs;
mod engine;
mod entry;

pub use class_dirs::{copy_tree, walk_files, ClassDirLayoutEngine};
pub use engine::LayoutEngine;
pub use entry::{hash_file_contents, DistributionFileEntry};

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Subdirectory of the classes root holding per-module compiled output
const PRODUCTION_CLASSES_DIR: &str = "production";

/// Compiled-output directory for one module
pub fn module_output_dir(classes_root: &Path, module: &str) -> PathBuf {
    classes_root.join(PRODUCTION_CLASSES_DIR).join(module)
}

/// Static layout description of one plugin
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PluginSpec {
    /// Directory name under the run's plugins dir
    pub directory: String,

    /// Modules packaged into this plugin; the first one is the main module
    /// carrying the plugin descriptor
    pub modules: Vec<String>,

    /// Operating systems this plugin may be bundled on (all when empty)
    #[serde(default)]
    pub os: Vec<OsFamily>,

    /// CPU architectures this plugin may be bundled on (all when empty)
    #[serde(default)]
    pub arch: Vec<CpuArch>,
}

impl PluginSpec {
    /// Main module name (the descriptor-bearing module)
    pub fn main_module(&self) -> &str {
        self.modules.first().map(String::as_str).unwrap_or_default()
    }

    /// Whether the current OS and architecture satisfy this plugin's
    /// bundling restrictions
    pub fn bundling_allowed(&self) -> bool {
        let os_ok = self.os.is_empty() || self.os.contains(&OsFamily::current());
        let arch_ok = self.arch.is_empty() || self.arch.contains(&CpuArch::current());
        os_ok && arch_ok
    }
}

/// Operating system family for bundling restrictions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsFamily {
    Linux,
    MacOs,
    Windows,
}

impl OsFamily {
    /// Detect the current OS family
    pub fn current() -> Self {
        match std::env::consts::OS {
            "macos" => OsFamily::MacOs,
            "windows" => OsFamily::Windows,
            _ => OsFamily::Linux,
        }
    }
}

/// CPU architecture for bundling restrictions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CpuArch {
    X86_64,
    Aarch64,
}

impl CpuArch {
    /// Detect the current CPU architecture
    pub fn current() -> Self {
        match std::env::consts::ARCH {
            "aarch64" => CpuArch::Aarch64,
            _ => CpuArch::X86_64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(os: Vec<OsFamily>, arch: Vec<CpuArch>) -> PluginSpec {
        PluginSpec {
            directory: "p".into(),
            modules: vec!["plugin.p".into()],
            os,
            arch,
        }
    }

    #[test]
    fn unrestricted_plugin_always_bundles() {
        assert!(spec(vec![], vec![]).bundling_allowed());
    }

    #[test]
    fn matching_os_bundles() {
        assert!(spec(vec![OsFamily::current()], vec![]).bundling_allowed());
    }

    #[test]
    fn restricted_plugin_skipped_on_other_os() {
        let other = match OsFamily::current() {
            OsFamily::Linux => OsFamily::Windows,
            _ => OsFamily::Linux,
        };
        assert!(!spec(vec![other], vec![]).bundling_allowed());
    }

    #[test]
    fn main_module_is_first() {
        let spec = PluginSpec {
            directory: "vcs".into(),
            modules: vec!["plugin.vcs".into(), "plugin.vcs.backend".into()],
            os: vec![],
            arch: vec![],
        };
        assert_eq!(spec.main_module(), "plugin.vcs");
    }

    #[test]
    fn module_output_dir_layout() {
        let dir = module_output_dir(Path::new("/classes"), "app.core");
        assert_eq!(dir, PathBuf::from("/classes/production/app.core"));
    }

    #[test]
    fn os_family_parses_lowercase() {
        let spec: PluginSpec = toml::from_str(
            r#"
            directory = "mac-only"
            modules = ["plugin.mac"]
            os = ["macos"]
            arch = ["aarch64"]
            "#,
        )
        .unwrap();
        assert_eq!(spec.os, vec![OsFamily::MacOs]);
        assert_eq!(spec.arch, vec![CpuArch::Aarch64]);
    }
}
