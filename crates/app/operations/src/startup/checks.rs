//! Individual startup checks.

use std::path::Path;

use crate::errors::BootstrapError;

/// Create the workspace directory if needed and check it can be written.
pub fn prepare_workspace_dir(path: &Path) -> Result<(), BootstrapError> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "creating workspace directory");
        std::fs::create_dir_all(path).map_err(|e| BootstrapError::filesystem(path, e))?;
    }

    check_workspace_dir(path)
}

/// Check that the workspace path is an existing, writable directory.
pub fn check_workspace_dir(path: &Path) -> Result<(), BootstrapError> {
    if !path.exists() {
        return Err(BootstrapError::InvalidWorkspace {
            path: path.to_path_buf(),
            reason: "path does not exist".to_string(),
        });
    }

    if !path.is_dir() {
        return Err(BootstrapError::InvalidWorkspace {
            path: path.to_path_buf(),
            reason: "not a directory".to_string(),
        });
    }

    // Check write access by attempting to create a temp file
    let test_file = path.join(".chainboot_write_test");
    match std::fs::write(&test_file, b"test") {
        Ok(()) => {
            let _ = std::fs::remove_file(&test_file);
            Ok(())
        }
        Err(e) => Err(BootstrapError::InvalidWorkspace {
            path: path.to_path_buf(),
            reason: format!("not writable: {e}"),
        }),
    }
}
