//! Layered configuration and the bootstrap entry point shared by binaries.
//!
//! Configuration resolves as defaults < YAML file < `CHAINBOOT_*` environment
//! variables < command-line flags.

pub mod cli;

use std::path::Path;

use chainboot_operations::config::load_config;
use chainboot_operations::{
    BootReport, BootstrapAbort, ConfigError, Orchestrator, ProcessRuntime, Workspace,
};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;

pub use chainboot_operations::config::{write_default_config, NodeConfig};
pub use cli::{init_tracing, resolve_node_config, CommonNodeArgs, StartArgs};

/// Config file read when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "chainboot.yaml";

/// Prefix of environment overrides. Nested keys use `__`, for example
/// `CHAINBOOT_NETWORK__RPC__PORT=9545`.
pub const ENV_PREFIX: &str = "CHAINBOOT_";

/// Top-level config sections that environment overrides may target. Other
/// `CHAINBOOT_*` variables are ignored.
pub const ENV_SECTIONS: [&str; 4] = ["workspace", "runtime", "network", "observability"];

/// Whether an unprefixed environment key addresses a config section.
pub fn is_config_env_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    ENV_SECTIONS.iter().any(|section| {
        key.strip_prefix(section)
            .is_some_and(|rest| rest.starts_with("__"))
    })
}

/// Figment with every layer below the command line.
///
/// A missing YAML file contributes nothing.
pub fn build_figment(config_path: &Path) -> Figment {
    Figment::from(Serialized::defaults(NodeConfig::default()))
        .merge(Yaml::file(config_path))
        .merge(
            Env::prefixed(ENV_PREFIX)
                .filter(|key| is_config_env_key(key.as_str()))
                .split("__"),
        )
}

/// Write the default config file and read it back through the YAML loader.
pub fn init_config_file(path: &Path, force: bool) -> Result<NodeConfig, ConfigError> {
    write_default_config(path, force)?;
    load_config(path)
}

/// Bootstrap the node described by `config` with the real runtime binary.
pub fn run_bootstrap(config: &NodeConfig) -> Result<BootReport, BootstrapAbort> {
    let workspace = Workspace::from_config(&config.workspace);
    let runtime = ProcessRuntime::new(&config.runtime.binary);
    tracing::info!(
        data_dir = %workspace.root().display(),
        binary = %runtime.path().display(),
        network_id = config.network.network_id,
        "starting bootstrap"
    );
    Orchestrator::new(&workspace, &config.network, &runtime).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn build_figment_without_file_yields_defaults() {
        let dir = tempdir().expect("tempdir");
        let config: NodeConfig = build_figment(&dir.path().join("missing.yaml"))
            .extract()
            .expect("extract");
        assert_eq!(config, NodeConfig::default());
    }

    #[test]
    fn build_figment_reads_partial_yaml() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("chainboot.yaml");
        std::fs::write(
            &path,
            "network:\n  network_id: 2024\n  rpc:\n    port: 9545\n",
        )
        .expect("write");

        let config: NodeConfig = build_figment(&path).extract().expect("extract");
        assert_eq!(config.network.network_id, 2024);
        assert_eq!(config.network.rpc.port, 9545);
        assert_eq!(config.runtime.binary, "geth");
    }

    #[test]
    fn init_config_file_writes_loadable_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("chainboot.yaml");

        let written = init_config_file(&path, false).expect("init");
        assert_eq!(written, NodeConfig::default());
        assert!(matches!(
            init_config_file(&path, false),
            Err(ConfigError::AlreadyExists(_))
        ));
        assert!(init_config_file(&path, true).is_ok());
    }

    #[test]
    fn env_keys_outside_config_sections_are_ignored() {
        assert!(is_config_env_key("NETWORK__RPC__PORT"));
        assert!(is_config_env_key("observability__log_level"));
        assert!(!is_config_env_key("DEBUG"));
        assert!(!is_config_env_key("NETWORK"));
        assert!(!is_config_env_key("NETWORKING__PORT"));
    }

    #[test]
    fn stray_prefixed_env_var_does_not_break_resolution() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("CHAINBOOT_DEBUG", "1");
            let config: NodeConfig = build_figment(Path::new("missing.yaml")).extract()?;
            assert_eq!(config, NodeConfig::default());
            Ok(())
        });
    }

    #[test]
    fn run_bootstrap_aborts_when_binary_is_missing() {
        let dir = tempdir().expect("tempdir");
        let mut config = NodeConfig::default();
        config.workspace.data_dir = dir.path().join("data");
        config.workspace.genesis_file = dir.path().join("genesis.json");
        config.runtime.binary = dir.path().join("no-such-geth").display().to_string();
        std::fs::write(&config.workspace.genesis_file, "{}").expect("genesis");

        let abort = run_bootstrap(&config).expect_err("should abort");
        assert_eq!(abort.stage, chainboot_operations::BootState::ChainReady);
    }
}
