//! Bootstrap sequence orchestration.
//!
//! ```text
//! Start → WorkspaceReady → ChainReady → IdentityReady → Launched → Done
//!   └──────────────┴─────────────┴─────────────┴────────────┴──→ Aborted
//! ```
//!
//! Every step is attempted exactly once; the first failure aborts the run.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::chain::ChainInitializer;
use crate::config::NetworkConfig;
use crate::errors::BootstrapError;
use crate::identity::{Address, IdentityProvisioner};
use crate::launcher::NodeLauncher;
use crate::runtime::NodeRuntime;
use crate::startup::checks::prepare_workspace_dir;
use crate::workspace::Workspace;

/// Position in the bootstrap state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BootState {
    Start,
    WorkspaceReady,
    ChainReady,
    IdentityReady,
    Launched,
    Done,
    Aborted,
}

impl BootState {
    /// The step that leads into this state, for operator messages.
    pub fn step(self) -> &'static str {
        match self {
            Self::Start => "starting",
            Self::WorkspaceReady => "preparing the workspace",
            Self::ChainReady => "initializing chain data",
            Self::IdentityReady => "provisioning the account",
            Self::Launched => "launching the node",
            Self::Done => "reporting",
            Self::Aborted => "aborting",
        }
    }
}

impl fmt::Display for BootState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootReport {
    /// Account the node was unlocked with.
    pub address: Address,
    /// Where the node writes its output.
    pub log_path: PathBuf,
    /// Pid of the detached node at spawn time.
    pub pid: u32,
    /// States visited, in order.
    pub states: Vec<BootState>,
}

impl fmt::Display for BootReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Node started (pid {})", self.pid)?;
        writeln!(f, "  account: {}", self.address)?;
        write!(f, "  log:     {}", self.log_path.display())
    }
}

/// A run that ended in [`BootState::Aborted`].
#[derive(Debug, Error)]
#[error("bootstrap aborted while {}: {error}", .stage.step())]
pub struct BootstrapAbort {
    /// The state the failed step was trying to reach.
    pub stage: BootState,
    /// States visited before and including `Aborted`.
    pub states: Vec<BootState>,
    #[source]
    pub error: BootstrapError,
}

/// Drives one bootstrap run against a workspace.
pub struct Orchestrator<'a, R> {
    workspace: &'a Workspace,
    network: &'a NetworkConfig,
    runtime: &'a R,
    state: BootState,
    states: Vec<BootState>,
}

impl<'a, R: NodeRuntime> Orchestrator<'a, R> {
    pub fn new(workspace: &'a Workspace, network: &'a NetworkConfig, runtime: &'a R) -> Self {
        Self {
            workspace,
            network,
            runtime,
            state: BootState::Start,
            states: vec![BootState::Start],
        }
    }

    /// Current state.
    pub fn state(&self) -> BootState {
        self.state
    }

    /// States visited so far.
    pub fn states(&self) -> &[BootState] {
        &self.states
    }

    /// Run the sequence to `Done` or `Aborted`.
    ///
    /// The workspace lock is held until this returns. The node exists only if
    /// `Launched` was reached, and it outlives this call.
    pub fn run(&mut self) -> Result<BootReport, BootstrapAbort> {
        let workspace = self.workspace;
        let network = self.network;
        let runtime = self.runtime;

        let _lock = self.attempt(BootState::WorkspaceReady, || {
            prepare_workspace_dir(workspace.root())?;
            workspace.lock()
        })?;

        self.attempt(BootState::ChainReady, || {
            ChainInitializer::new(runtime).ensure_initialized(workspace, workspace.genesis_file())
        })?;

        let address = self.attempt(BootState::IdentityReady, || {
            IdentityProvisioner::new(runtime).ensure_identity(workspace, workspace.password_file())
        })?;

        let handle = self.attempt(BootState::Launched, || {
            NodeLauncher::new(runtime).launch(
                workspace,
                workspace.password_file(),
                &address,
                network,
            )
        })?;

        self.enter(BootState::Done);
        tracing::info!(
            %address,
            pid = handle.pid,
            log = %handle.log_path.display(),
            "bootstrap complete"
        );

        Ok(BootReport {
            address,
            log_path: handle.log_path,
            pid: handle.pid,
            states: self.states.clone(),
        })
    }

    fn attempt<T>(
        &mut self,
        next: BootState,
        step: impl FnOnce() -> Result<T, BootstrapError>,
    ) -> Result<T, BootstrapAbort> {
        tracing::debug!(from = %self.state, to = %next, "{}", next.step());
        match step() {
            Ok(value) => {
                self.enter(next);
                Ok(value)
            }
            Err(error) => {
                tracing::error!(stage = %next, "{error}");
                self.enter(BootState::Aborted);
                Err(BootstrapAbort {
                    stage: next,
                    states: self.states.clone(),
                    error,
                })
            }
        }
    }

    fn enter(&mut self, state: BootState) {
        self.state = state;
        self.states.push(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::mock::{MockRuntime, MOCK_PID};
    use crate::state::StateStore;
    use tempfile::TempDir;

    const ADDR: &str = "abcdef0123456789abcdef0123456789abcdef01";

    fn setup() -> (TempDir, Workspace) {
        let dir = TempDir::new().unwrap();
        let genesis = dir.path().join("genesis.json");
        let password = dir.path().join("password.txt");
        std::fs::write(&genesis, b"{}").unwrap();
        std::fs::write(&password, b"secret").unwrap();
        let ws = Workspace::with_root(dir.path().join("data"))
            .with_genesis_file(genesis)
            .with_password_file(password);
        (dir, ws)
    }

    #[test]
    fn test_fresh_workspace_visits_every_state_in_order() {
        let (_dir, ws) = setup();
        let network = NetworkConfig::default();
        let runtime = MockRuntime::new(ADDR);

        let mut orchestrator = Orchestrator::new(&ws, &network, &runtime);
        let report = orchestrator.run().unwrap();

        let expected = vec![
            BootState::Start,
            BootState::WorkspaceReady,
            BootState::ChainReady,
            BootState::IdentityReady,
            BootState::Launched,
            BootState::Done,
        ];
        assert_eq!(report.states, expected);
        assert_eq!(orchestrator.states(), expected.as_slice());
        assert_eq!(orchestrator.state(), BootState::Done);
        assert_eq!(report.address.as_str(), ADDR);
        assert_eq!(report.log_path, ws.log_path());
        assert_eq!(report.pid, MOCK_PID);
    }

    #[test]
    fn test_second_run_reuses_chain_and_identity() {
        let (_dir, ws) = setup();
        let network = NetworkConfig::default();
        let runtime = MockRuntime::new(ADDR);

        let first = Orchestrator::new(&ws, &network, &runtime).run().unwrap();
        let second = Orchestrator::new(&ws, &network, &runtime).run().unwrap();

        assert_eq!(runtime.count("init"), 1);
        assert_eq!(runtime.count("account"), 1);
        assert_eq!(runtime.spawned().len(), 2);
        assert_eq!(first.address, second.address);
    }

    #[test]
    fn test_init_failure_aborts_before_identity_and_launch() {
        let (_dir, ws) = setup();
        let network = NetworkConfig::default();
        let runtime = MockRuntime {
            fail_init: true,
            ..MockRuntime::new(ADDR)
        };

        let mut orchestrator = Orchestrator::new(&ws, &network, &runtime);
        let abort = orchestrator.run().unwrap_err();

        assert_eq!(abort.stage, BootState::ChainReady);
        assert!(matches!(abort.error, BootstrapError::InitializationFailed(_)));
        assert_eq!(
            abort.states,
            vec![
                BootState::Start,
                BootState::WorkspaceReady,
                BootState::Aborted
            ]
        );
        assert_eq!(orchestrator.state(), BootState::Aborted);
        assert!(!ws.identity_path().exists());
        assert_eq!(runtime.count("account"), 0);
        assert!(runtime.spawned().is_empty());
        assert!(abort.to_string().contains("initializing chain data"));
    }

    #[test]
    fn test_launch_failure_keeps_identity() {
        let (_dir, ws) = setup();
        let network = NetworkConfig::default();
        let runtime = MockRuntime {
            fail_spawn: true,
            ..MockRuntime::new(ADDR)
        };

        let abort = Orchestrator::new(&ws, &network, &runtime)
            .run()
            .unwrap_err();

        assert_eq!(abort.stage, BootState::Launched);
        assert!(matches!(abort.error, BootstrapError::LaunchFailed { .. }));
        assert_eq!(
            StateStore::new(&ws).read_identity().unwrap().unwrap().as_str(),
            ADDR
        );
    }

    #[test]
    fn test_busy_workspace_aborts_without_side_effects() {
        let (_dir, ws) = setup();
        std::fs::create_dir_all(ws.root()).unwrap();
        let _held = ws.lock().unwrap();
        let network = NetworkConfig::default();
        let runtime = MockRuntime::new(ADDR);

        let abort = Orchestrator::new(&ws, &network, &runtime)
            .run()
            .unwrap_err();

        assert_eq!(abort.stage, BootState::WorkspaceReady);
        assert!(matches!(abort.error, BootstrapError::WorkspaceBusy { .. }));
        assert_eq!(runtime.count("init"), 0);
        assert!(runtime.spawned().is_empty());
    }

    #[test]
    fn test_lock_released_after_run() {
        let (_dir, ws) = setup();
        let network = NetworkConfig::default();
        let runtime = MockRuntime::new(ADDR);

        Orchestrator::new(&ws, &network, &runtime).run().unwrap();
        assert!(ws.lock().is_ok());
    }

    #[test]
    fn test_identity_stable_across_passphrase_change() {
        let (dir, ws) = setup();
        let network = NetworkConfig::default();
        let runtime = MockRuntime::new(ADDR);
        let first = Orchestrator::new(&ws, &network, &runtime).run().unwrap();

        let other_password = dir.path().join("other.txt");
        std::fs::write(&other_password, b"different").unwrap();
        let ws = ws.with_password_file(&other_password);
        let runtime = MockRuntime::new("2222222222222222222222222222222222222222");
        let second = Orchestrator::new(&ws, &network, &runtime).run().unwrap();

        assert_eq!(first.address, second.address);
        assert_eq!(runtime.count("account"), 0);
        let unlock_password = &runtime.spawned()[0];
        assert!(unlock_password.contains(&other_password.display().to_string()));
    }
}
