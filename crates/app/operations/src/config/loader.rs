//! Configuration file loading.

use std::path::Path;

use crate::config::types::NodeConfig;
use crate::config::validation::validate_config;
use crate::errors::ConfigError;

/// Load and validate configuration from a YAML file.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read
/// - The YAML is invalid
/// - Any configuration value fails validation
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<NodeConfig, ConfigError> {
    let path = path.as_ref();
    let path_str = path.display().to_string();

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path_str.clone(),
        source: e,
    })?;

    load_config_from_str(&content, &path_str)
}

/// Load and validate configuration from a YAML string.
pub fn load_config_from_str(content: &str, source_name: &str) -> Result<NodeConfig, ConfigError> {
    let config: NodeConfig = serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
        path: source_name.to_string(),
        source: e,
    })?;

    validate_config(&config)?;

    Ok(config)
}

/// Render the default configuration as YAML.
pub fn default_config_yaml() -> Result<String, ConfigError> {
    serde_yaml::to_string(&NodeConfig::default()).map_err(ConfigError::Serialize)
}

/// Write the default configuration to `path`.
///
/// Refuses to replace an existing file unless `force` is set.
pub fn write_default_config<P: AsRef<Path>>(path: P, force: bool) -> Result<(), ConfigError> {
    let path = path.as_ref();
    let path_str = path.display().to_string();

    if path.exists() && !force {
        return Err(ConfigError::AlreadyExists(path_str));
    }

    let yaml = default_config_yaml()?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::FileWrite {
            path: path_str.clone(),
            source: e,
        })?;
    }
    std::fs::write(path, yaml).map_err(|e| ConfigError::FileWrite {
        path: path_str,
        source: e,
    })
}
