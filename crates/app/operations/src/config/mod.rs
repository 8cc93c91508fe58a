//! Configuration loading and validation.
//!
//! This module provides:
//! - Configuration types with serde support
//! - YAML file loading and default file generation
//! - Fail-fast validation that collects all errors

mod loader;
pub mod types;
mod validation;

pub use loader::{default_config_yaml, load_config, load_config_from_str, write_default_config};
pub use types::{
    NetworkConfig, NodeConfig, ObservabilityConfig, RpcConfig, RuntimeConfig, WorkspaceConfig,
};
pub use validation::validate_config;
