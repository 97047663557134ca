//! Per-plugin artifact reuse
//!
//! The previous run's plugin directories become this run's cache; the gate
//! decides per plugin whether the cached directory can be relocated into
//! the new run or the plugin must be rebuilt.

pub mod gate;
pub mod marker;

pub use gate::{evaluate, reuse, verify_modules, CacheDecision};
pub use marker::{is_unchanged, UNCHANGED_MARKER};
