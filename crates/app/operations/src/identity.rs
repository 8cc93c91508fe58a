//! Managed account provisioning.
//!
//! A workspace owns at most one managed account. The first run creates it via
//! the runtime's `account new` routine and records its address in the identity
//! marker; every later run returns the recorded address as is.
//!
//! The marker is trusted without re-verification: if the keystore has been
//! removed but the marker survives, the address is still returned and the
//! node's own unlock step is where the failure surfaces.

use std::ffi::OsString;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::errors::{AddressError, BootstrapError, IdentityParseError};
use crate::runtime::NodeRuntime;
use crate::state::StateStore;
use crate::workspace::Workspace;

/// Hex digits in an address printed by the account routine.
pub const ADDRESS_HEX_LEN: usize = 40;

/// Account address, stored as lowercase hex without a `0x` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address(String);

impl Address {
    /// Bare lowercase hex.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `0x`-prefixed form used on the node command line.
    pub fn to_prefixed(&self) -> String {
        format!("0x{}", self.0)
    }

    /// Parse an address that must have exactly [`ADDRESS_HEX_LEN`] hex digits.
    pub fn parse_full_length(s: &str) -> Result<Self, AddressError> {
        let address: Self = s.parse()?;
        if address.0.len() != ADDRESS_HEX_LEN {
            return Err(AddressError(s.to_string()));
        }
        Ok(address)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    /// Accepts hex digits in any case, with or without a `0x` prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let hex = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AddressError(s.to_string()));
        }
        Ok(Self(hex.to_ascii_lowercase()))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.0)
    }
}

/// Extract the new account's address from `account new` output.
///
/// The address is the full-length hex token enclosed in `{` `}`. Other brace
/// pairs are ignored. The same address printed twice is accepted; two
/// different addresses are ambiguous.
pub fn parse_account_output(output: &str) -> Result<Address, IdentityParseError> {
    let mut candidates: Vec<String> = Vec::new();
    let mut start = 0;

    for (close, _) in output.match_indices('}') {
        let segment = &output[start..close];
        start = close + 1;
        // Innermost pair: the last `{` before this `}`.
        let Some(open) = segment.rfind('{') else {
            continue;
        };
        if let Ok(address) = Address::parse_full_length(&segment[open + 1..]) {
            if !candidates.contains(&address.0) {
                candidates.push(address.0);
            }
        }
    }

    match candidates.len() {
        0 => Err(IdentityParseError::NoAddress),
        1 => Ok(Address(candidates.remove(0))),
        _ => Err(IdentityParseError::Ambiguous(candidates)),
    }
}

/// Ensures the workspace has exactly one managed account.
#[derive(Debug)]
pub struct IdentityProvisioner<'a, R> {
    runtime: &'a R,
}

impl<'a, R: NodeRuntime> IdentityProvisioner<'a, R> {
    pub fn new(runtime: &'a R) -> Self {
        Self { runtime }
    }

    /// Return the workspace identity, creating it under `passphrase_file` if absent.
    ///
    /// Nothing is written unless the routine succeeded and its output parsed,
    /// so a failed attempt leaves the workspace without a marker.
    pub fn ensure_identity(
        &self,
        workspace: &Workspace,
        passphrase_file: &Path,
    ) -> Result<Address, BootstrapError> {
        let store = StateStore::new(workspace);
        if let Some(address) = store.read_identity()? {
            tracing::info!(%address, "reusing recorded account");
            return Ok(address);
        }

        tracing::info!(
            workspace = %workspace.root().display(),
            "no recorded account, creating one"
        );
        let args: Vec<OsString> = vec![
            "account".into(),
            "new".into(),
            "--datadir".into(),
            workspace.root().into(),
            "--password".into(),
            passphrase_file.into(),
        ];
        let output = self
            .runtime
            .run(&args)
            .map_err(BootstrapError::IdentityCreationFailed)?;

        let address = parse_account_output(&output.combined())?;
        store.write_identity(&address)?;
        tracing::info!(%address, "account created");
        Ok(address)
    }
}
