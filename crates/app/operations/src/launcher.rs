//! Detached launch of the long-running node.

use std::ffi::{OsStr, OsString};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::config::NetworkConfig;
use crate::errors::BootstrapError;
use crate::identity::Address;
use crate::runtime::NodeRuntime;
use crate::workspace::Workspace;

/// Node command line, built from configuration without side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    args: Vec<OsString>,
}

impl LaunchPlan {
    /// Build the command line for `address`, unlocked with `passphrase_file`.
    pub fn build(
        workspace: &Workspace,
        passphrase_file: &Path,
        address: &Address,
        network: &NetworkConfig,
    ) -> Self {
        let mut plan = Self { args: Vec::new() };
        let account = address.to_prefixed();

        plan.flag_value("--datadir", workspace.root());
        plan.flag_value("--networkid", network.network_id.to_string());

        let rpc = &network.rpc;
        if rpc.enabled {
            plan.flag("--http");
            if let Some(addr) = &rpc.addr {
                plan.flag_value("--http.addr", addr);
            }
            plan.flag_value("--http.port", rpc.port.to_string());
            plan.flag_value("--http.api", rpc.api_surface().join(","));
        }
        if network.allow_insecure_unlock {
            plan.flag("--allow-insecure-unlock");
        }

        plan.flag_value("--unlock", &account);
        plan.flag_value("--password", passphrase_file);

        if network.mine {
            plan.flag("--mine");
            plan.flag_value("--miner.etherbase", &account);
        }
        if !network.discovery {
            plan.flag("--nodiscover");
        }

        plan
    }

    fn flag(&mut self, name: &str) {
        self.args.push(name.into());
    }

    fn flag_value(&mut self, name: &str, value: impl AsRef<OsStr>) {
        self.args.push(name.into());
        self.args.push(value.as_ref().to_os_string());
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Whether `name` appears on the command line.
    pub fn has_flag(&self, name: &str) -> bool {
        self.args.iter().any(|a| a == name)
    }

    /// The argument following `name`, if present.
    pub fn value_of(&self, name: &str) -> Option<&OsStr> {
        self.args
            .iter()
            .position(|a| a == name)
            .and_then(|i| self.args.get(i + 1))
            .map(OsString::as_os_str)
    }
}

/// A launched node. The process itself is not tracked further.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessHandle {
    pub pid: u32,
    pub log_path: PathBuf,
}

/// Starts the node and hands it off.
#[derive(Debug)]
pub struct NodeLauncher<'a, R> {
    runtime: &'a R,
}

impl<'a, R: NodeRuntime> NodeLauncher<'a, R> {
    pub fn new(runtime: &'a R) -> Self {
        Self { runtime }
    }

    /// Spawn the node, detached, with combined output appended to the workspace log.
    ///
    /// Success means the spawn call succeeded. Readiness, RPC availability and
    /// the unlock itself are left to the node.
    pub fn launch(
        &self,
        workspace: &Workspace,
        passphrase_file: &Path,
        address: &Address,
        network: &NetworkConfig,
    ) -> Result<ProcessHandle, BootstrapError> {
        let plan = LaunchPlan::build(workspace, passphrase_file, address, network);

        let log_path = workspace.log_path();
        if let Some(parent) = log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| BootstrapError::filesystem(parent, e))?;
        }
        let log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .map_err(|e| BootstrapError::filesystem(&log_path, e))?;

        tracing::info!(
            program = %self.runtime.program(),
            network_id = network.network_id,
            rpc_port = ?network.rpc.enabled.then_some(network.rpc.port),
            log = %log_path.display(),
            "launching node"
        );
        let pid = self
            .runtime
            .spawn_detached(plan.args(), log)
            .map_err(|source| BootstrapError::LaunchFailed {
                program: self.runtime.program(),
                source,
            })?;

        tracing::info!(pid, "node detached");
        Ok(ProcessHandle { pid, log_path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RpcConfig;
    use crate::runtime::mock::{MockRuntime, MOCK_PID};
    use tempfile::TempDir;

    fn private_network() -> NetworkConfig {
        NetworkConfig {
            network_id: 1337,
            discovery: false,
            allow_insecure_unlock: true,
            mine: true,
            rpc: RpcConfig {
                enabled: true,
                addr: None,
                port: 8545,
                api: ["eth", "net", "web3", "personal", "miner"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
            },
        }
    }

    fn plan_for(network: &NetworkConfig) -> LaunchPlan {
        let ws = Workspace::with_root("/srv/data");
        LaunchPlan::build(
            &ws,
            Path::new("/srv/password.txt"),
            &"abc123".parse().unwrap(),
            network,
        )
    }

    #[test]
    fn test_private_mining_node_plan() {
        let plan = plan_for(&private_network());

        assert_eq!(plan.value_of("--unlock"), Some(OsStr::new("0xabc123")));
        assert_eq!(
            plan.value_of("--miner.etherbase"),
            Some(OsStr::new("0xabc123"))
        );
        assert!(plan.has_flag("--nodiscover"));
        assert!(plan.has_flag("--mine"));
        assert!(plan.has_flag("--http"));
        assert!(plan.has_flag("--allow-insecure-unlock"));
        assert_eq!(plan.value_of("--networkid"), Some(OsStr::new("1337")));
        assert_eq!(plan.value_of("--http.port"), Some(OsStr::new("8545")));
        assert_eq!(
            plan.value_of("--http.api"),
            Some(OsStr::new("eth,net,web3,personal,miner"))
        );
        assert_eq!(plan.value_of("--datadir"), Some(OsStr::new("/srv/data")));
        assert_eq!(
            plan.value_of("--password"),
            Some(OsStr::new("/srv/password.txt"))
        );
        assert!(!plan.has_flag("--http.addr"));
    }

    #[test]
    fn test_each_flag_appears_once() {
        let plan = plan_for(&private_network());
        let flags: Vec<&OsString> = plan
            .args()
            .iter()
            .filter(|a| a.to_string_lossy().starts_with("--"))
            .collect();
        for flag in &flags {
            assert_eq!(
                flags.iter().filter(|f| f == &flag).count(),
                1,
                "{flag:?} repeated"
            );
        }
    }

    #[test]
    fn test_optional_flags_follow_config() {
        let mut network = private_network();
        network.rpc.enabled = false;
        network.mine = false;
        network.discovery = true;
        network.allow_insecure_unlock = false;

        let plan = plan_for(&network);
        for flag in [
            "--http",
            "--http.port",
            "--http.api",
            "--mine",
            "--miner.etherbase",
            "--nodiscover",
            "--allow-insecure-unlock",
        ] {
            assert!(!plan.has_flag(flag), "{flag} should be absent");
        }
        assert_eq!(plan.value_of("--unlock"), Some(OsStr::new("0xabc123")));
    }

    #[test]
    fn test_bind_address_and_deduped_api() {
        let mut network = private_network();
        network.rpc.addr = Some("0.0.0.0".to_string());
        network.rpc.api = vec!["eth".into(), "net".into(), "eth".into()];

        let plan = plan_for(&network);
        assert_eq!(plan.value_of("--http.addr"), Some(OsStr::new("0.0.0.0")));
        assert_eq!(plan.value_of("--http.api"), Some(OsStr::new("eth,net")));
    }

    #[test]
    fn test_launch_appends_to_log_and_reports_handle() {
        let dir = TempDir::new().unwrap();
        let ws = Workspace::with_root(dir.path().join("data"));
        std::fs::create_dir_all(ws.root()).unwrap();
        std::fs::write(ws.log_path(), "previous run\n").unwrap();
        let runtime = MockRuntime::default();

        let handle = NodeLauncher::new(&runtime)
            .launch(
                &ws,
                Path::new("password.txt"),
                &"abc123".parse().unwrap(),
                &private_network(),
            )
            .unwrap();

        assert_eq!(handle.pid, MOCK_PID);
        assert_eq!(handle.log_path, ws.log_path());
        assert_eq!(
            std::fs::read_to_string(ws.log_path()).unwrap(),
            "previous run\n"
        );
        assert_eq!(runtime.spawned().len(), 1);
    }

    #[test]
    fn test_spawn_failure_is_launch_failed() {
        let dir = TempDir::new().unwrap();
        let ws = Workspace::with_root(dir.path().join("data"));
        let runtime = MockRuntime {
            fail_spawn: true,
            ..Default::default()
        };

        let err = NodeLauncher::new(&runtime)
            .launch(
                &ws,
                Path::new("password.txt"),
                &"abc123".parse().unwrap(),
                &private_network(),
            )
            .unwrap_err();
        assert!(matches!(err, BootstrapError::LaunchFailed { .. }));
    }
}
