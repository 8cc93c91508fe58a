//! Bootstrap infrastructure for geth-compatible development nodes.
//!
//! This crate brings a node from an empty directory to a running, mining,
//! RPC-exposed process:
//!
//! - **Config**: YAML-based configuration with fail-fast validation
//! - **Workspace**: resolved paths, persisted markers and an advisory lock
//! - **Chain / Identity / Launcher**: the three node-facing steps, each idempotent
//! - **Startup**: the state machine that sequences them
//! - **Genesis / Maintenance**: development genesis generation, log tailing, reset
//!
//! # Example
//!
//! ```no_run
//! use chainboot_operations::{
//!     config::load_config, init_logging_from_config, Orchestrator, ProcessRuntime, Workspace,
//! };
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("chainboot.yaml")?;
//!     init_logging_from_config(
//!         &config.observability.log_level,
//!         &config.observability.log_format,
//!     );
//!
//!     let workspace = Workspace::from_config(&config.workspace);
//!     let runtime = ProcessRuntime::new(&config.runtime.binary);
//!     let report = Orchestrator::new(&workspace, &config.network, &runtime).run()?;
//!     println!("{report}");
//!     Ok(())
//! }
//! ```

pub mod chain;
pub mod config;
pub mod errors;
pub mod genesis;
pub mod identity;
pub mod launcher;
pub mod maintenance;
pub mod observability;
pub mod runtime;
pub mod startup;
pub mod state;
pub mod workspace;

pub use chain::{ChainInitializer, ChainStatus};
pub use config::{load_config, validate_config, NetworkConfig, NodeConfig, ObservabilityConfig};
pub use errors::{AddressError, BootstrapError, ConfigError, GenesisError, IdentityParseError};
pub use identity::{parse_account_output, Address, IdentityProvisioner};
pub use launcher::{LaunchPlan, NodeLauncher, ProcessHandle};
pub use maintenance::{reset_workspace, tail_lines, ResetOutcome};
pub use observability::{init_logging, init_logging_from_config, parse_level, LogFormat};
pub use runtime::{NodeRuntime, ProcessRuntime, RoutineFailure, RoutineOutput};
pub use startup::{BootReport, BootState, BootstrapAbort, Orchestrator};
pub use state::StateStore;
pub use workspace::{Workspace, WorkspaceLock};
