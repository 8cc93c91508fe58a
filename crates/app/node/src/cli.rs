use std::path::PathBuf;

use chainboot_operations::config::validate_config;
use chainboot_operations::{init_logging_from_config, ConfigError};
use clap::Args;

use crate::{build_figment, NodeConfig, DEFAULT_CONFIG_PATH};

#[derive(Debug, Clone, Args)]
pub struct CommonNodeArgs {
    /// Config YAML path (defaults apply if missing)
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Data directory override
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log level override
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format override (pretty or json)
    #[arg(long, global = true)]
    pub log_format: Option<String>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct StartArgs {
    /// Passphrase file override
    #[arg(long)]
    pub password_file: Option<PathBuf>,

    /// Genesis file override
    #[arg(long)]
    pub genesis_file: Option<PathBuf>,

    /// Node executable override
    #[arg(long)]
    pub binary: Option<String>,

    /// Network ID override
    #[arg(long)]
    pub network_id: Option<u64>,

    /// HTTP RPC interface override
    #[arg(long)]
    pub rpc_addr: Option<String>,

    /// HTTP RPC port override
    #[arg(long)]
    pub rpc_port: Option<u16>,

    /// Comma-separated RPC namespaces override
    #[arg(long, value_delimiter = ',')]
    pub rpc_api: Option<Vec<String>>,

    /// Disable the HTTP RPC server
    #[arg(long)]
    pub disable_rpc: bool,

    /// Do not mine
    #[arg(long)]
    pub no_mine: bool,

    /// Enable peer discovery
    #[arg(long)]
    pub discovery: bool,
}

/// Resolve a NodeConfig from: defaults < YAML < env vars < CLI flags.
pub fn resolve_node_config(
    common: &CommonNodeArgs,
    start: &StartArgs,
) -> Result<NodeConfig, ConfigError> {
    let mut figment = build_figment(&common.config);

    // Apply CLI overrides (highest priority)
    if let Some(ref v) = common.data_dir {
        figment = figment.merge(("workspace.data_dir", v));
    }
    if let Some(ref v) = common.log_level {
        figment = figment.merge(("observability.log_level", v.as_str()));
    }
    if let Some(ref v) = common.log_format {
        figment = figment.merge(("observability.log_format", v.as_str()));
    }
    if let Some(ref v) = start.password_file {
        figment = figment.merge(("workspace.password_file", v));
    }
    if let Some(ref v) = start.genesis_file {
        figment = figment.merge(("workspace.genesis_file", v));
    }
    if let Some(ref v) = start.binary {
        figment = figment.merge(("runtime.binary", v.as_str()));
    }
    if let Some(v) = start.network_id {
        figment = figment.merge(("network.network_id", v));
    }
    if let Some(ref v) = start.rpc_addr {
        figment = figment.merge(("network.rpc.addr", v.as_str()));
    }
    if let Some(v) = start.rpc_port {
        figment = figment.merge(("network.rpc.port", v));
    }
    if let Some(ref v) = start.rpc_api {
        figment = figment.merge(("network.rpc.api", v));
    }
    if start.disable_rpc {
        figment = figment.merge(("network.rpc.enabled", false));
    }
    if start.no_mine {
        figment = figment.merge(("network.mine", false));
    }
    if start.discovery {
        figment = figment.merge(("network.discovery", true));
    }

    let config: NodeConfig = figment
        .extract()
        .map_err(|e| ConfigError::Layered(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Resolve a NodeConfig for subcommands without start overrides.
pub fn resolve_node_config_common(common: &CommonNodeArgs) -> Result<NodeConfig, ConfigError> {
    resolve_node_config(common, &StartArgs::default())
}

pub fn init_tracing(config: &NodeConfig) {
    init_logging_from_config(
        &config.observability.log_level,
        &config.observability.log_format,
    );
}
