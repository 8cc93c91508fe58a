//! Durable markers recording what a workspace already has.

use std::ffi::OsString;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::errors::BootstrapError;
use crate::identity::Address;
use crate::workspace::Workspace;

/// Reads and writes the initialization and identity markers of a workspace.
#[derive(Debug, Clone, Copy)]
pub struct StateStore<'a> {
    workspace: &'a Workspace,
}

impl<'a> StateStore<'a> {
    pub fn new(workspace: &'a Workspace) -> Self {
        Self { workspace }
    }

    /// Whether the chain-data init artifact exists.
    ///
    /// A missing workspace simply reports `false`.
    pub fn has_initialized_chain(&self) -> bool {
        self.workspace.init_marker_path().exists()
    }

    /// The persisted identity, if the marker exists and is non-empty.
    ///
    /// The marker is authoritative: the keystore is never consulted.
    pub fn read_identity(&self) -> Result<Option<Address>, BootstrapError> {
        let path = self.workspace.identity_path();
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(BootstrapError::filesystem(path, e)),
        };

        let value = content.trim();
        if value.is_empty() {
            return Ok(None);
        }

        Address::parse_full_length(value)
            .map(Some)
            .map_err(|source| BootstrapError::CorruptIdentity { path, source })
    }

    /// Persist `address` as the workspace identity.
    ///
    /// Writes a sibling temp file, syncs it and renames it over the marker, so a
    /// reader sees either no marker or a complete one.
    pub fn write_identity(&self, address: &Address) -> Result<(), BootstrapError> {
        let path = self.workspace.identity_path();
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent).map_err(|e| BootstrapError::filesystem(parent, e))?;

        let tmp = temp_path(&path);
        let write = || -> std::io::Result<()> {
            let mut file = File::create(&tmp)?;
            writeln!(file, "{}", address.as_str())?;
            file.sync_all()
        };
        if let Err(e) = write() {
            let _ = std::fs::remove_file(&tmp);
            return Err(BootstrapError::filesystem(&tmp, e));
        }

        std::fs::rename(&tmp, &path).map_err(|e| BootstrapError::filesystem(&path, e))?;
        sync_dir(parent).map_err(|e| BootstrapError::filesystem(parent, e))?;

        tracing::debug!(path = %path.display(), "identity marker written");
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("identity"));
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> std::io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}
