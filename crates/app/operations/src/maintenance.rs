//! Operator maintenance: inspecting the node log and resetting a workspace.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::errors::BootstrapError;
use crate::workspace::Workspace;

/// Default number of log lines shown.
pub const DEFAULT_TAIL_LINES: usize = 20;

const INITIAL_WINDOW: usize = 1024;

/// The last `count` lines of the file at `path`.
///
/// Reads the file once, keeping at most `count` lines in memory.
pub fn tail_lines(path: &Path, count: usize) -> io::Result<Vec<String>> {
    let reader = BufReader::new(File::open(path)?);
    let mut window = VecDeque::with_capacity(count.min(INITIAL_WINDOW));
    for line in reader.lines() {
        let line = line?;
        if count == 0 {
            continue;
        }
        if window.len() == count {
            window.pop_front();
        }
        window.push_back(line);
    }
    Ok(window.into())
}

/// What [`reset_workspace`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    Removed,
    NotFound,
}

/// Delete the workspace directory and everything in it.
///
/// Refuses while another bootstrap run holds the workspace lock. The chain
/// data, keystore and identity marker are all lost.
pub fn reset_workspace(workspace: &Workspace) -> Result<ResetOutcome, BootstrapError> {
    let root = workspace.root();
    if !root.exists() {
        return Ok(ResetOutcome::NotFound);
    }
    if !root.is_dir() {
        return Err(BootstrapError::InvalidWorkspace {
            path: root.to_path_buf(),
            reason: "not a directory".to_string(),
        });
    }

    let lock = workspace.lock()?;
    tracing::warn!(path = %root.display(), "deleting workspace");
    let result = std::fs::remove_dir_all(root);
    drop(lock);
    result.map_err(|e| BootstrapError::filesystem(root, e))?;

    Ok(ResetOutcome::Removed)
}
