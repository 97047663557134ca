//! Incremental build assembly
//!
//! The orchestrator wires the per-build task graph: run directory
//! preparation, product properties + context resolution, platform layout,
//! concurrent plugin builds gated by the artifact cache, and the
//! conditional manifest / repository / fingerprint steps.

pub mod context;
pub mod fingerprint;
pub mod manifest;
pub mod orchestrator;
pub mod platform;
pub mod plugins;
pub mod repository;
pub mod request;

pub use context::BuildContext;
pub use orchestrator::{BuildOrchestrator, BuildOutcome};
pub use plugins::{PluginBuildDescriptor, PluginBuilder};
pub use request::{BuildRequest, ClasspathSink};

/// Directory under the run dir holding plugin output
pub const PLUGINS_DIR: &str = "plugins";
