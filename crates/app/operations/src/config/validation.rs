//! Configuration validation.
//!
//! Validates configuration and collects all errors before returning,
//! enabling users to fix multiple issues in a single iteration.

use crate::config::types::{
    NetworkConfig, NodeConfig, ObservabilityConfig, RuntimeConfig, WorkspaceConfig,
};
use crate::errors::ConfigError;

/// Validate the entire configuration.
///
/// Collects all validation errors and returns them together, allowing users
/// to fix multiple issues at once.
pub fn validate_config(config: &NodeConfig) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    validate_workspace_config(&config.workspace, &mut errors);
    validate_runtime_config(&config.runtime, &mut errors);
    validate_network_config(&config.network, &mut errors);
    validate_observability_config(&config.observability, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationFailed(errors))
    }
}

fn validate_workspace_config(config: &WorkspaceConfig, errors: &mut Vec<String>) {
    let required = [
        ("workspace.data_dir", &config.data_dir),
        ("workspace.password_file", &config.password_file),
        ("workspace.genesis_file", &config.genesis_file),
        ("workspace.init_marker", &config.init_marker),
        ("workspace.identity_file", &config.identity_file),
        ("workspace.log_file", &config.log_file),
    ];
    for (name, path) in required {
        if path.as_os_str().is_empty() {
            errors.push(format!("{name} cannot be empty"));
        }
    }

    // Markers live inside the workspace; an absolute path would escape it.
    if config.init_marker.is_absolute() {
        errors.push("workspace.init_marker must be relative to workspace.data_dir".to_string());
    }
    if config.identity_file.is_absolute() {
        errors.push("workspace.identity_file must be relative to workspace.data_dir".to_string());
    }
}

fn validate_runtime_config(config: &RuntimeConfig, errors: &mut Vec<String>) {
    if config.binary.trim().is_empty() {
        errors.push("runtime.binary cannot be empty".to_string());
    }
}

fn validate_network_config(config: &NetworkConfig, errors: &mut Vec<String>) {
    if config.network_id == 0 {
        errors.push("network.network_id must be greater than 0".to_string());
    }

    let rpc = &config.rpc;
    if !rpc.enabled {
        return;
    }

    if rpc.port == 0 {
        errors.push("network.rpc.port must be greater than 0 when RPC is enabled".to_string());
    }

    if let Some(addr) = &rpc.addr {
        if addr.trim().is_empty() {
            errors.push("network.rpc.addr cannot be empty when set".to_string());
        }
    }

    if rpc.api.is_empty() {
        errors.push("network.rpc.api must list at least one namespace".to_string());
    }

    for name in &rpc.api {
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            errors.push(format!(
                "network.rpc.api namespace '{name}' contains invalid characters. Only alphanumeric and underscore are allowed."
            ));
        }
    }

    if rpc.api_surface().len() != rpc.api.len() {
        errors.push("network.rpc.api contains duplicate namespaces".to_string());
    }

    // The node unlocks the account while HTTP RPC is exposed.
    if !config.allow_insecure_unlock {
        errors.push(
            "network.allow_insecure_unlock must be true when RPC is enabled, the account is unlocked over the RPC surface"
                .to_string(),
        );
    }
}

fn validate_observability_config(config: &ObservabilityConfig, errors: &mut Vec<String>) {
    let valid_levels = [
        "trace", "debug", "info", "warn", "warning", "error", "critical", "crit",
    ];
    if !valid_levels.contains(&config.log_level.to_lowercase().as_str()) {
        errors.push(format!(
            "observability.log_level '{}' is invalid. Valid levels: trace, debug, info, warn, error, critical",
            config.log_level
        ));
    }

    let valid_formats = ["json", "pretty", "text", "human"];
    if !valid_formats.contains(&config.log_format.to_lowercase().as_str()) {
        errors.push(format!(
            "observability.log_format '{}' is invalid. Valid formats: json, pretty",
            config.log_format
        ));
    }
}
