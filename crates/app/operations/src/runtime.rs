//! Seam between the bootstrap sequence and the external node executable.
//!
//! The bootstrap never speaks to the chain directly: it runs two short-lived
//! routines (`init`, `account new`) and spawns one long-lived node. All three
//! go through [`NodeRuntime`], so the sequencing logic can be exercised without
//! a real node binary.

use std::ffi::OsString;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};

use thiserror::Error;

/// Captured output of a routine that ran to completion.
#[derive(Debug, Clone, Default)]
pub struct RoutineOutput {
    pub stdout: String,
    pub stderr: String,
}

impl RoutineOutput {
    /// Stdout followed by stderr.
    pub fn combined(&self) -> String {
        let mut text = String::with_capacity(self.stdout.len() + self.stderr.len() + 1);
        text.push_str(&self.stdout);
        if !self.stdout.is_empty() && !self.stdout.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(&self.stderr);
        text
    }
}

/// Why an external routine did not succeed.
#[derive(Debug, Error)]
pub enum RoutineFailure {
    /// The executable could not be started.
    #[error("could not run '{program}': {source}")]
    Spawn { program: String, source: io::Error },

    /// The routine exited unsuccessfully.
    #[error("'{program}' exited with {status}: {detail}")]
    Exit {
        program: String,
        status: String,
        detail: String,
    },

    /// An input the routine needs is missing.
    #[error("{0}")]
    MissingInput(String),
}

impl RoutineFailure {
    fn exit(program: &str, status: ExitStatus, output: &RoutineOutput) -> Self {
        let detail = last_line(&output.stderr)
            .or_else(|| last_line(&output.stdout))
            .unwrap_or("no output")
            .to_string();
        Self::Exit {
            program: program.to_string(),
            status: status.to_string(),
            detail,
        }
    }
}

fn last_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).rfind(|line| !line.is_empty())
}

/// External node executable.
pub trait NodeRuntime {
    /// Name used in diagnostics.
    fn program(&self) -> String;

    /// Run a routine to completion, capturing its output.
    fn run(&self, args: &[OsString]) -> Result<RoutineOutput, RoutineFailure>;

    /// Start the node with stdout and stderr appended to `log`, and release it.
    ///
    /// Returns the pid of the detached process. The caller does not wait on it.
    fn spawn_detached(&self, args: &[OsString], log: File) -> io::Result<u32>;
}

/// [`NodeRuntime`] backed by a real executable.
#[derive(Debug, Clone)]
pub struct ProcessRuntime {
    program: PathBuf,
}

impl ProcessRuntime {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.program
    }
}

impl NodeRuntime for ProcessRuntime {
    fn program(&self) -> String {
        self.program.display().to_string()
    }

    fn run(&self, args: &[OsString]) -> Result<RoutineOutput, RoutineFailure> {
        tracing::debug!(program = %self.program.display(), ?args, "running routine");

        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| RoutineFailure::Spawn {
                program: self.program(),
                source,
            })?;

        let captured = RoutineOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if !output.status.success() {
            return Err(RoutineFailure::exit(
                &self.program(),
                output.status,
                &captured,
            ));
        }
        Ok(captured)
    }

    fn spawn_detached(&self, args: &[OsString], log: File) -> io::Result<u32> {
        let stderr = log.try_clone()?;

        let mut command = Command::new(&self.program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::from(log))
            .stderr(Stdio::from(stderr));

        // Own process group: Ctrl-C in the invoking terminal must not reach the node.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        tracing::debug!(program = %self.program.display(), ?args, "spawning node");
        let child = command.spawn()?;
        Ok(detach(child))
    }
}

/// Release a spawned child without waiting on it.
///
/// Dropping a [`Child`] neither kills nor reaps the process, so the node keeps
/// running after the bootstrap exits.
fn detach(child: Child) -> u32 {
    let pid = child.id();
    drop(child);
    pid
}

#[cfg(test)]
pub(crate) mod mock {
    //! Recording runtime that imitates the node's filesystem effects.

    use super::*;
    use std::cell::RefCell;

    pub(crate) const INIT_MARKER: &str = "geth/chaindata/LOG";
    pub(crate) const MOCK_PID: u32 = 4242;

    #[derive(Default)]
    pub(crate) struct MockRuntime {
        pub account_output: String,
        pub fail_init: bool,
        pub fail_account: bool,
        pub fail_spawn: bool,
        pub calls: RefCell<Vec<Vec<String>>>,
        pub spawned: RefCell<Vec<Vec<String>>>,
    }

    impl MockRuntime {
        pub(crate) fn new(address_hex: &str) -> Self {
            Self {
                account_output: format!("Address: {{{address_hex}}}\n"),
                ..Default::default()
            }
        }

        pub(crate) fn count(&self, routine: &str) -> usize {
            self.calls
                .borrow()
                .iter()
                .filter(|args| args.first().map(String::as_str) == Some(routine))
                .count()
        }

        pub(crate) fn spawned(&self) -> Vec<Vec<String>> {
            self.spawned.borrow().clone()
        }

        fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
            args.iter()
                .position(|a| a == name)
                .and_then(|i| args.get(i + 1))
                .map(String::as_str)
        }

        fn failure(&self, detail: &str) -> RoutineFailure {
            RoutineFailure::Exit {
                program: self.program(),
                status: "exit status: 1".to_string(),
                detail: detail.to_string(),
            }
        }
    }

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    impl NodeRuntime for MockRuntime {
        fn program(&self) -> String {
            "mock-geth".to_string()
        }

        fn run(&self, args: &[OsString]) -> Result<RoutineOutput, RoutineFailure> {
            let args = strings(args);
            self.calls.borrow_mut().push(args.clone());

            match args.first().map(String::as_str) {
                Some("init") if self.fail_init => Err(self.failure("invalid genesis file")),
                Some("init") => {
                    let datadir = Self::flag(&args, "--datadir").expect("init without --datadir");
                    let marker = Path::new(datadir).join(INIT_MARKER);
                    std::fs::create_dir_all(marker.parent().unwrap()).unwrap();
                    std::fs::write(marker, b"").unwrap();
                    Ok(RoutineOutput::default())
                }
                Some("account") if self.fail_account => {
                    Err(self.failure("Failed to read password file"))
                }
                Some("account") => Ok(RoutineOutput {
                    stdout: self.account_output.clone(),
                    stderr: String::new(),
                }),
                _ => Err(self.failure("unexpected routine")),
            }
        }

        fn spawn_detached(&self, args: &[OsString], _log: File) -> io::Result<u32> {
            if self.fail_spawn {
                return Err(io::Error::new(io::ErrorKind::NotFound, "no such file"));
            }
            self.spawned.borrow_mut().push(strings(args));
            Ok(MOCK_PID)
        }
    }
}
