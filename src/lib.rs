//! Stagehand - Incremental Development Build Assembler
//!
//! Assembles a runnable development build of a modular, plugin-based
//! application from already-compiled class output, reusing per-plugin
//! artifacts from the previous run whenever nothing changed.

pub mod build;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod layout;
pub mod product;
pub mod server;

pub use error::{StagehandError, StagehandResult};
