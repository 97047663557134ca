//! Build output fingerprinting
//!
//! Folds every distribution entry's content hash into one comparable digest
//! plus a human-readable trace for debugging mismatches. The fingerprint is
//! diagnostic only; computing or persisting it must never fail a build.

use crate::layout::DistributionFileEntry;
use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use std::path::Path;
use tokio::fs;
use tracing::warn;

/// File the digest is written to inside the run directory
pub const FINGERPRINT_FILE: &str = "fingerprint.txt";

/// File the debug trace is written to inside the run directory
pub const FINGERPRINT_DEBUG_FILE: &str = "fingerprint-debug.txt";

/// Digest of one build's full output, with its debug trace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    /// Folded content hash, rendered base-36
    pub digest: String,

    /// One line per entry, same enumeration order as the digest input
    pub trace: String,
}

/// Fold platform and per-plugin entries into a fingerprint.
///
/// Entries are consumed in the enumeration order the layout produced;
/// counts are mixed in so that moving an entry between plugins changes the
/// digest even when the combined hash set is identical.
pub fn compute(
    run_dir: &Path,
    platform_entries: &[DistributionFileEntry],
    plugin_entries: &[(String, Vec<DistributionFileEntry>)],
) -> Fingerprint {
    let mut hasher = Sha256::new();
    let mut trace = String::new();

    hasher.update((platform_entries.len() as u64).to_be_bytes());
    let _ = writeln!(trace, "platform ({} entries)", platform_entries.len());
    for entry in platform_entries {
        hasher.update(entry.hash.to_be_bytes());
        trace_line(&mut trace, run_dir, entry);
    }

    hasher.update((plugin_entries.len() as u64).to_be_bytes());
    for (plugin, entries) in plugin_entries {
        hasher.update((entries.len() as u64).to_be_bytes());
        let _ = writeln!(trace, "plugin {plugin} ({} entries)", entries.len());
        for entry in entries {
            hasher.update(entry.hash.to_be_bytes());
            trace_line(&mut trace, run_dir, entry);
        }
    }

    let digest = hasher.finalize();
    let mut first8 = [0u8; 8];
    first8.copy_from_slice(&digest[..8]);

    Fingerprint {
        digest: to_base36(u64::from_be_bytes(first8)),
        trace,
    }
}

impl Fingerprint {
    /// Write the digest and trace as sibling files in the run directory.
    ///
    /// IO failures are logged and swallowed; the fingerprint never fails
    /// the build that produced it.
    pub async fn persist(&self, run_dir: &Path) {
        let digest_path = run_dir.join(FINGERPRINT_FILE);
        if let Err(e) = fs::write(&digest_path, &self.digest).await {
            warn!("Failed to write {}: {e}", digest_path.display());
        }

        let trace_path = run_dir.join(FINGERPRINT_DEBUG_FILE);
        if let Err(e) = fs::write(&trace_path, &self.trace).await {
            warn!("Failed to write {}: {e}", trace_path.display());
        }
    }
}

fn trace_line(trace: &mut String, run_dir: &Path, entry: &DistributionFileEntry) {
    let rel = entry.path.strip_prefix(run_dir).unwrap_or(&entry.path);
    let _ = writeln!(
        trace,
        "{} {}",
        hex::encode(entry.hash.to_be_bytes()),
        rel.display()
    );
}

/// Render an unsigned integer in base 36
fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }

    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn entry(path: &str, hash: u64) -> DistributionFileEntry {
        DistributionFileEntry::new(PathBuf::from(path), hash)
    }

    #[test]
    fn identical_inputs_identical_digest() {
        let run = Path::new("/run");
        let platform = vec![entry("/run/lib/a", 1), entry("/run/lib/b", 2)];
        let plugins = vec![("vcs".to_string(), vec![entry("/run/plugins/vcs/c", 3)])];

        let one = compute(run, &platform, &plugins);
        let two = compute(run, &platform, &plugins);
        assert_eq!(one.digest, two.digest);
        assert_eq!(one.trace, two.trace);
    }

    #[test]
    fn single_hash_change_changes_digest() {
        let run = Path::new("/run");
        let platform = vec![entry("/run/lib/a", 1)];
        let plugins = vec![("vcs".to_string(), vec![entry("/run/plugins/vcs/c", 3)])];
        let changed = vec![("vcs".to_string(), vec![entry("/run/plugins/vcs/c", 4)])];

        assert_ne!(
            compute(run, &platform, &plugins).digest,
            compute(run, &platform, &changed).digest
        );
    }

    #[test]
    fn moving_entry_between_plugins_changes_digest() {
        let run = Path::new("/run");
        let split = vec![
            ("a".to_string(), vec![entry("/run/p/a/x", 7)]),
            ("b".to_string(), vec![]),
        ];
        let merged = vec![
            ("a".to_string(), vec![]),
            ("b".to_string(), vec![entry("/run/p/b/x", 7)]),
        ];

        assert_ne!(
            compute(run, &[], &split).digest,
            compute(run, &[], &merged).digest
        );
    }

    #[test]
    fn trace_uses_relative_paths() {
        let run = Path::new("/run");
        let platform = vec![entry("/run/lib/a.class", 0xdead)];
        let fp = compute(run, &platform, &[]);
        assert!(fp.trace.contains("lib/a.class"));
        assert!(!fp.trace.contains("/run/lib"));
    }

    #[test]
    fn base36_renders() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(u64::MAX), "3w5e11264sgsf");
    }

    #[tokio::test]
    async fn persist_writes_both_files() {
        let dir = TempDir::new().unwrap();
        let fp = compute(dir.path(), &[entry("a", 1)], &[]);

        fp.persist(dir.path()).await;

        let digest = std::fs::read_to_string(dir.path().join(FINGERPRINT_FILE)).unwrap();
        assert_eq!(digest, fp.digest);
        assert!(dir.path().join(FINGERPRINT_DEBUG_FILE).is_file());
    }

    #[tokio::test]
    async fn persist_swallows_io_failure() {
        let fp = compute(Path::new("/run"), &[], &[]);
        // Missing directory: must log and return, not fail
        fp.persist(Path::new("/nonexistent/run")).await;
    }
}
