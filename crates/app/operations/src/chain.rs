//! One-time chain data initialization from a genesis description.

use std::ffi::OsString;
use std::path::Path;

use crate::errors::BootstrapError;
use crate::runtime::{NodeRuntime, RoutineFailure};
use crate::state::StateStore;
use crate::workspace::Workspace;

/// What [`ChainInitializer::ensure_initialized`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainStatus {
    /// The init marker was already present; nothing ran.
    AlreadyInitialized,
    /// The init routine ran successfully.
    Initialized,
}

/// Runs the runtime's `init` routine at most once per workspace.
#[derive(Debug)]
pub struct ChainInitializer<'a, R> {
    runtime: &'a R,
}

impl<'a, R: NodeRuntime> ChainInitializer<'a, R> {
    pub fn new(runtime: &'a R) -> Self {
        Self { runtime }
    }

    /// Initialize `workspace` from `genesis` unless its init marker exists.
    ///
    /// The genesis contents are passed through unchecked; only its presence is
    /// verified before invoking the routine.
    pub fn ensure_initialized(
        &self,
        workspace: &Workspace,
        genesis: &Path,
    ) -> Result<ChainStatus, BootstrapError> {
        let store = StateStore::new(workspace);
        if store.has_initialized_chain() {
            tracing::info!(
                marker = %workspace.init_marker_path().display(),
                "chain data already initialized"
            );
            return Ok(ChainStatus::AlreadyInitialized);
        }

        if !genesis.is_file() {
            return Err(BootstrapError::InitializationFailed(
                RoutineFailure::MissingInput(format!(
                    "genesis file '{}' not found",
                    genesis.display()
                )),
            ));
        }

        tracing::info!(
            genesis = %genesis.display(),
            workspace = %workspace.root().display(),
            "initializing chain data"
        );
        let args: Vec<OsString> = vec![
            "init".into(),
            "--datadir".into(),
            workspace.root().into(),
            genesis.into(),
        ];
        self.runtime
            .run(&args)
            .map_err(BootstrapError::InitializationFailed)?;

        if !store.has_initialized_chain() {
            // The next run will initialize again; harmless for an identical genesis.
            tracing::warn!(
                marker = %workspace.init_marker_path().display(),
                "init routine succeeded but the init marker is missing"
            );
        }
        Ok(ChainStatus::Initialized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::mock::MockRuntime;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Workspace) {
        let dir = TempDir::new().unwrap();
        let genesis = dir.path().join("genesis.json");
        std::fs::write(&genesis, b"{}").unwrap();
        let ws = Workspace::with_root(dir.path().join("data")).with_genesis_file(genesis);
        (dir, ws)
    }

    #[test]
    fn test_initializes_once() {
        let (_dir, ws) = setup();
        let runtime = MockRuntime::default();
        let init = ChainInitializer::new(&runtime);

        assert_eq!(
            init.ensure_initialized(&ws, ws.genesis_file()).unwrap(),
            ChainStatus::Initialized
        );
        assert_eq!(
            init.ensure_initialized(&ws, ws.genesis_file()).unwrap(),
            ChainStatus::AlreadyInitialized
        );
        assert_eq!(runtime.count("init"), 1);
        assert!(StateStore::new(&ws).has_initialized_chain());
    }

    #[test]
    fn test_passes_datadir_and_genesis() {
        let (_dir, ws) = setup();
        let runtime = MockRuntime::default();
        ChainInitializer::new(&runtime)
            .ensure_initialized(&ws, ws.genesis_file())
            .unwrap();

        let calls = runtime.calls.borrow();
        assert_eq!(
            calls[0],
            vec![
                "init".to_string(),
                "--datadir".to_string(),
                ws.root().display().to_string(),
                ws.genesis_file().display().to_string(),
            ]
        );
    }

    #[test]
    fn test_routine_failure_aborts() {
        let (_dir, ws) = setup();
        let runtime = MockRuntime {
            fail_init: true,
            ..Default::default()
        };

        let err = ChainInitializer::new(&runtime)
            .ensure_initialized(&ws, ws.genesis_file())
            .unwrap_err();
        assert!(matches!(err, BootstrapError::InitializationFailed(_)));
        assert!(!StateStore::new(&ws).has_initialized_chain());
    }

    #[test]
    fn test_missing_genesis_fails_before_running() {
        let (dir, ws) = setup();
        let runtime = MockRuntime::default();

        let err = ChainInitializer::new(&runtime)
            .ensure_initialized(&ws, &dir.path().join("absent.json"))
            .unwrap_err();
        assert!(matches!(
            err,
            BootstrapError::InitializationFailed(RoutineFailure::MissingInput(_))
        ));
        assert_eq!(runtime.count("init"), 0);
    }
}
