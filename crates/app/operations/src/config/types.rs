//! Configuration types for the bootstrapper.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeConfig {
    /// Workspace path conventions.
    #[serde(default)]
    pub workspace: WorkspaceConfig,

    /// External node runtime.
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// Options passed to the launched node.
    #[serde(default)]
    pub network: NetworkConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Where the workspace and its companion files live.
///
/// `data_dir`, `password_file` and `genesis_file` resolve against the working
/// directory; the remaining paths resolve against `data_dir`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkspaceConfig {
    /// Chain data and keystore directory. Default: `./data`.
    #[serde(default = "WorkspaceConfig::default_data_dir")]
    pub data_dir: PathBuf,

    /// Passphrase file used for account creation and unlock. Default: `./password.txt`.
    #[serde(default = "WorkspaceConfig::default_password_file")]
    pub password_file: PathBuf,

    /// Genesis description consumed by the init routine. Default: `./genesis.json`.
    #[serde(default = "WorkspaceConfig::default_genesis_file")]
    pub genesis_file: PathBuf,

    /// Artifact whose existence means the chain is initialized. Default: `geth/chaindata/LOG`.
    #[serde(default = "WorkspaceConfig::default_init_marker")]
    pub init_marker: PathBuf,

    /// File holding the provisioned account address. Default: `address.txt`.
    #[serde(default = "WorkspaceConfig::default_identity_file")]
    pub identity_file: PathBuf,

    /// Append-only node log. Default: `geth.log`.
    #[serde(default = "WorkspaceConfig::default_log_file")]
    pub log_file: PathBuf,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            data_dir: Self::default_data_dir(),
            password_file: Self::default_password_file(),
            genesis_file: Self::default_genesis_file(),
            init_marker: Self::default_init_marker(),
            identity_file: Self::default_identity_file(),
            log_file: Self::default_log_file(),
        }
    }
}

impl WorkspaceConfig {
    fn default_data_dir() -> PathBuf {
        PathBuf::from("./data")
    }

    fn default_password_file() -> PathBuf {
        PathBuf::from("./password.txt")
    }

    fn default_genesis_file() -> PathBuf {
        PathBuf::from("./genesis.json")
    }

    fn default_init_marker() -> PathBuf {
        PathBuf::from("geth/chaindata/LOG")
    }

    fn default_identity_file() -> PathBuf {
        PathBuf::from("address.txt")
    }

    fn default_log_file() -> PathBuf {
        PathBuf::from("geth.log")
    }
}

/// External node runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Executable name or path. Default: `geth`.
    #[serde(default = "RuntimeConfig::default_binary")]
    pub binary: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            binary: Self::default_binary(),
        }
    }
}

impl RuntimeConfig {
    fn default_binary() -> String {
        "geth".to_string()
    }
}

/// Network and mining options for the launched node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkConfig {
    /// Chain identifier used for peer isolation. Default: 1337.
    #[serde(default = "NetworkConfig::default_network_id")]
    pub network_id: u64,

    /// Peer discovery. Default: false (private network).
    #[serde(default)]
    pub discovery: bool,

    /// Permit account unlock while RPC is exposed. Default: true.
    #[serde(default = "NetworkConfig::default_allow_insecure_unlock")]
    pub allow_insecure_unlock: bool,

    /// Mine with the provisioned account as beneficiary. Default: true.
    #[serde(default = "NetworkConfig::default_mine")]
    pub mine: bool,

    /// HTTP RPC endpoint.
    #[serde(default)]
    pub rpc: RpcConfig,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            network_id: Self::default_network_id(),
            discovery: false,
            allow_insecure_unlock: Self::default_allow_insecure_unlock(),
            mine: Self::default_mine(),
            rpc: RpcConfig::default(),
        }
    }
}

impl NetworkConfig {
    const fn default_network_id() -> u64 {
        1337
    }

    const fn default_allow_insecure_unlock() -> bool {
        true
    }

    const fn default_mine() -> bool {
        true
    }
}

/// HTTP RPC configuration for the launched node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RpcConfig {
    /// Whether the HTTP RPC server is enabled. Default: true.
    #[serde(default = "RpcConfig::default_enabled")]
    pub enabled: bool,

    /// Interface to bind. The runtime's own default applies when unset.
    #[serde(default)]
    pub addr: Option<String>,

    /// Port to bind. Default: 8545.
    #[serde(default = "RpcConfig::default_port")]
    pub port: u16,

    /// Enabled RPC namespaces, in command-line order.
    #[serde(default = "RpcConfig::default_api")]
    pub api: Vec<String>,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            addr: None,
            port: Self::default_port(),
            api: Self::default_api(),
        }
    }
}

impl RpcConfig {
    const fn default_enabled() -> bool {
        true
    }

    const fn default_port() -> u16 {
        8545
    }

    fn default_api() -> Vec<String> {
        ["eth", "net", "web3", "personal", "miner"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    /// Namespaces with duplicates removed, first occurrence wins.
    pub fn api_surface(&self) -> Vec<&str> {
        let mut seen = Vec::with_capacity(self.api.len());
        for name in &self.api {
            if !seen.contains(&name.as_str()) {
                seen.push(name.as_str());
            }
        }
        seen
    }
}

/// Observability configuration for logging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObservabilityConfig {
    /// Log level: trace, debug, info, warn, error. Default: info.
    #[serde(default = "ObservabilityConfig::default_log_level")]
    pub log_level: String,

    /// Log format: json or pretty. Default: pretty.
    #[serde(default = "ObservabilityConfig::default_log_format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
            log_format: Self::default_log_format(),
        }
    }
}

impl ObservabilityConfig {
    fn default_log_level() -> String {
        "info".to_string()
    }

    fn default_log_format() -> String {
        "pretty".to_string()
    }
}
