//! Distribution file entries
//!
//! One entry per packaged file: final path plus a 64-bit content hash.
//! Builders append entries as they lay files out; nothing mutates an entry
//! after creation.

use crate::error::{StagehandError, StagehandResult};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// One packaged file in the assembled build
#[derive(Debug, Clone)]
pub struct DistributionFileEntry {
    /// Final absolute path inside the run directory
    pub path: PathBuf,

    /// Content hash of the file
    pub hash: u64,

    /// Path relative to the platform `lib/` root, when the entry sits
    /// under it; drives the application classpath computation
    pub lib_relative: Option<PathBuf>,
}

impl DistributionFileEntry {
    /// Entry outside the platform lib root
    pub fn new(path: PathBuf, hash: u64) -> Self {
        Self {
            path,
            hash,
            lib_relative: None,
        }
    }

    /// Entry under the platform lib root
    pub fn in_lib(path: PathBuf, hash: u64, lib_relative: PathBuf) -> Self {
        Self {
            path,
            hash,
            lib_relative: Some(lib_relative),
        }
    }
}

/// Hash a file's contents, truncating the digest to 64 bits
pub fn hash_file_contents(path: &Path) -> StagehandResult<u64> {
    let contents = fs::read(path)
        .map_err(|e| StagehandError::io(format!("reading {} for hashing", path.display()), e))?;

    let mut hasher = Sha256::new();
    hasher.update(&contents);
    let digest = hasher.finalize();

    let mut first8 = [0u8; 8];
    first8.copy_from_slice(&digest[..8]);
    Ok(u64::from_be_bytes(first8))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn hash_deterministic() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.class");
        fs::write(&path, b"bytecode").unwrap();

        assert_eq!(
            hash_file_contents(&path).unwrap(),
            hash_file_contents(&path).unwrap()
        );
    }

    #[test]
    fn hash_differs_for_different_content() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        fs::write(&a, b"one").unwrap();
        fs::write(&b, b"two").unwrap();

        assert_ne!(
            hash_file_contents(&a).unwrap(),
            hash_file_contents(&b).unwrap()
        );
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = hash_file_contents(Path::new("/no/such/file")).unwrap_err();
        assert!(matches!(err, StagehandError::Io { .. }));
    }
}
