//! Unchanged-module markers
//!
//! The upstream compiler drops a sentinel file into a module's compiled
//! output directory when the module did not change since the reference
//! point. Presence of the file is the only signal read here.

use crate::layout::module_output_dir;
use std::path::Path;

/// Sentinel file name written by the compiler into unchanged module output
pub const UNCHANGED_MARKER: &str = ".unchanged";

/// Whether a module's compiled output carries the unchanged marker
pub fn is_unchanged(classes_root: &Path, module: &str) -> bool {
    module_output_dir(classes_root, module)
        .join(UNCHANGED_MARKER)
        .is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn marker_present() {
        let dir = TempDir::new().unwrap();
        let out = module_output_dir(dir.path(), "app.core");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join(UNCHANGED_MARKER), "").unwrap();

        assert!(is_unchanged(dir.path(), "app.core"));
    }

    #[test]
    fn marker_absent() {
        let dir = TempDir::new().unwrap();
        let out = module_output_dir(dir.path(), "app.core");
        fs::create_dir_all(&out).unwrap();

        assert!(!is_unchanged(dir.path(), "app.core"));
    }

    #[test]
    fn missing_module_dir_counts_as_changed() {
        let dir = TempDir::new().unwrap();
        assert!(!is_unchanged(dir.path(), "app.ghost"));
    }
}
