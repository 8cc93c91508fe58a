//! Startup checks and the bootstrap sequence.
//!
//! This module provides:
//! - Workspace directory validation
//! - The bootstrap state machine that initializes, provisions and launches

pub mod checks;
mod sequence;

pub use checks::{check_workspace_dir, prepare_workspace_dir};
pub use sequence::{BootReport, BootState, BootstrapAbort, Orchestrator};
