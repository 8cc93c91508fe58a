//! Chainboot daemon launcher (chainbootd)
//!
//! Brings a private geth development node from an empty directory to a
//! running, mining, RPC-exposed process. Every run is idempotent: chain
//! initialization and account creation happen once per data directory, and
//! later runs reuse them.
//!
//! ## Usage
//!
//! ```bash
//! # Write a genesis funding one account, and the passphrase file
//! echo "dev-passphrase" | chainbootd genesis \
//!     --alloc 0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266=1000 --password-stdin
//!
//! # Initialize, provision and launch (the default subcommand)
//! chainbootd start --network-id 1337 --rpc-port 8545
//!
//! # Inspect the node log
//! chainbootd logs --lines 50
//!
//! # Throw the workspace away
//! chainbootd reset --yes
//! ```
//!
//! Configuration layers as defaults < `chainboot.yaml` < `CHAINBOOT_*`
//! environment < flags. `chainbootd init-config` writes the defaults.

use std::io::BufRead;
use std::process::ExitCode;

use chainboot_node::cli::resolve_node_config_common;
use chainboot_node::{
    init_config_file, init_tracing, resolve_node_config, run_bootstrap, CommonNodeArgs, StartArgs,
};
use chainboot_operations::genesis::{write_genesis, write_password_file, GenesisAllocation};
use chainboot_operations::maintenance::DEFAULT_TAIL_LINES;
use chainboot_operations::{reset_workspace, tail_lines, ResetOutcome, Workspace};
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "chainbootd")]
#[command(about = "Bootstrap and launch a private geth development node")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    common: CommonNodeArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the chain, provision the account and launch the node
    Start(StartArgs),
    /// Write the default configuration file
    InitConfig(InitConfigArgs),
    /// Write a development genesis file
    Genesis(GenesisArgs),
    /// Print the tail of the node log
    Logs(LogsArgs),
    /// Delete the data directory
    Reset(ResetArgs),
}

#[derive(Args)]
struct InitConfigArgs {
    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
}

#[derive(Args)]
struct GenesisArgs {
    /// Pre-funded account as <0x address>=<eth amount>, repeatable
    #[arg(long = "alloc", required = true)]
    allocations: Vec<GenesisAllocation>,

    /// Read the account passphrase from stdin and write the passphrase file
    #[arg(long)]
    password_stdin: bool,
}

#[derive(Args)]
struct LogsArgs {
    /// Number of lines to print
    #[arg(long, default_value_t = DEFAULT_TAIL_LINES)]
    lines: usize,
}

#[derive(Args)]
struct ResetArgs {
    /// Confirm deletion of chain data and keystore
    #[arg(long)]
    yes: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        None => start(&cli.common, &StartArgs::default()),
        Some(Commands::Start(args)) => start(&cli.common, &args),
        Some(Commands::InitConfig(args)) => init_config(&cli.common, &args),
        Some(Commands::Genesis(args)) => genesis(&cli.common, &args),
        Some(Commands::Logs(args)) => logs(&cli.common, &args),
        Some(Commands::Reset(args)) => reset(&cli.common, &args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

type CommandResult = Result<(), String>;

fn start(common: &CommonNodeArgs, args: &StartArgs) -> CommandResult {
    let config = resolve_node_config(common, args).map_err(|e| e.to_string())?;
    init_tracing(&config);

    let report = run_bootstrap(&config).map_err(|abort| {
        let states: Vec<String> = abort.states.iter().map(ToString::to_string).collect();
        format!("{abort}\nstates: {}", states.join(" -> "))
    })?;
    println!("{report}");
    Ok(())
}

fn init_config(common: &CommonNodeArgs, args: &InitConfigArgs) -> CommandResult {
    init_config_file(&common.config, args.force).map_err(|e| e.to_string())?;
    println!("wrote {}", common.config.display());
    Ok(())
}

fn genesis(common: &CommonNodeArgs, args: &GenesisArgs) -> CommandResult {
    let config = resolve_node_config_common(common).map_err(|e| e.to_string())?;
    init_tracing(&config);
    let workspace = &config.workspace;

    write_genesis(
        &workspace.genesis_file,
        config.network.network_id,
        &args.allocations,
    )
    .map_err(|e| e.to_string())?;
    println!("wrote {}", workspace.genesis_file.display());

    if args.password_stdin {
        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| format!("failed to read passphrase from stdin: {e}"))?;
        let passphrase = line.trim_end_matches(['\r', '\n']);
        write_password_file(&workspace.password_file, passphrase).map_err(|e| e.to_string())?;
        println!("wrote {}", workspace.password_file.display());
    }
    Ok(())
}

fn logs(common: &CommonNodeArgs, args: &LogsArgs) -> CommandResult {
    let config = resolve_node_config_common(common).map_err(|e| e.to_string())?;
    init_tracing(&config);
    let workspace = Workspace::from_config(&config.workspace);
    let path = workspace.log_path();

    if !path.exists() {
        println!("no node log at {} yet, run `chainbootd start` first", path.display());
        return Ok(());
    }
    let lines = tail_lines(&path, args.lines)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

fn reset(common: &CommonNodeArgs, args: &ResetArgs) -> CommandResult {
    let config = resolve_node_config_common(common).map_err(|e| e.to_string())?;
    init_tracing(&config);
    let workspace = Workspace::from_config(&config.workspace);

    if !args.yes {
        return Err(format!(
            "refusing to delete {} without --yes",
            workspace.root().display()
        ));
    }

    match reset_workspace(&workspace).map_err(|e| e.to_string())? {
        ResetOutcome::Removed => println!("removed {}", workspace.root().display()),
        ResetOutcome::NotFound => println!("nothing to remove at {}", workspace.root().display()),
    }
    Ok(())
}
