//! Workspace layout and the advisory lock that serializes bootstrap runs.

use std::fs::{File, OpenOptions, TryLockError};
use std::path::{Path, PathBuf};

use crate::config::WorkspaceConfig;
use crate::errors::BootstrapError;

/// Lock file created inside the data directory.
pub const LOCK_FILE_NAME: &str = ".chainboot.lock";

/// Resolved paths for one node workspace.
///
/// Every component receives this value instead of consulting ambient defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
    password_file: PathBuf,
    genesis_file: PathBuf,
    init_marker: PathBuf,
    identity_file: PathBuf,
    log_file: PathBuf,
}

impl Workspace {
    pub fn from_config(config: &WorkspaceConfig) -> Self {
        Self {
            root: config.data_dir.clone(),
            password_file: config.password_file.clone(),
            genesis_file: config.genesis_file.clone(),
            init_marker: config.init_marker.clone(),
            identity_file: config.identity_file.clone(),
            log_file: config.log_file.clone(),
        }
    }

    /// Workspace rooted at `root` with the conventional file names, and the
    /// passphrase and genesis files next to it.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let parent = root.parent().map(Path::to_path_buf).unwrap_or_default();
        let defaults = WorkspaceConfig::default();
        Self {
            password_file: parent.join("password.txt"),
            genesis_file: parent.join("genesis.json"),
            init_marker: defaults.init_marker,
            identity_file: defaults.identity_file,
            log_file: defaults.log_file,
            root,
        }
    }

    pub fn with_password_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.password_file = path.into();
        self
    }

    pub fn with_genesis_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.genesis_file = path.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn password_file(&self) -> &Path {
        &self.password_file
    }

    pub fn genesis_file(&self) -> &Path {
        &self.genesis_file
    }

    pub fn init_marker_path(&self) -> PathBuf {
        self.root.join(&self.init_marker)
    }

    pub fn identity_path(&self) -> PathBuf {
        self.root.join(&self.identity_file)
    }

    /// Node log path. Absolute `log_file` values are used as is.
    pub fn log_path(&self) -> PathBuf {
        self.root.join(&self.log_file)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.root.join(LOCK_FILE_NAME)
    }

    /// Take the exclusive advisory lock for this workspace.
    ///
    /// The root directory must already exist. Fails with
    /// [`BootstrapError::WorkspaceBusy`] if another holder exists, in this
    /// process or any other.
    pub fn lock(&self) -> Result<WorkspaceLock, BootstrapError> {
        let path = self.lock_path();
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|e| BootstrapError::filesystem(&path, e))?;

        match file.try_lock() {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "workspace lock acquired");
                Ok(WorkspaceLock { file, path })
            }
            Err(TryLockError::WouldBlock) => Err(BootstrapError::WorkspaceBusy {
                path: self.root.clone(),
            }),
            Err(TryLockError::Error(e)) => Err(BootstrapError::filesystem(&path, e)),
        }
    }
}

/// Held for the duration of a run; released on drop.
///
/// The lock file is opened close-on-exec, so a spawned node never inherits it.
#[derive(Debug)]
pub struct WorkspaceLock {
    file: File,
    path: PathBuf,
}

impl WorkspaceLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for WorkspaceLock {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            tracing::warn!(path = %self.path.display(), "failed to release workspace lock: {e}");
        }
    }
}
