//! Development genesis and passphrase file generation.
//!
//! Produces a development genesis with every fork active at block zero and a
//! pre-funded `alloc` section.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use alloy_primitives::utils::parse_ether;
use alloy_primitives::{Address, U256};
use serde::Serialize;

use crate::errors::GenesisError;

/// Gas limit of the genesis block.
pub const GENESIS_GAS_LIMIT: &str = "8000000";

/// Difficulty of the genesis block.
pub const GENESIS_DIFFICULTY: &str = "1";

/// One pre-funded account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenesisAllocation {
    pub address: Address,
    pub balance_wei: U256,
}

impl FromStr for GenesisAllocation {
    type Err = GenesisError;

    /// Parse `<0x address>=<eth amount>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (address, amount) = s
            .split_once('=')
            .ok_or_else(|| GenesisError::MalformedAllocation(s.to_string()))?;
        Ok(Self {
            address: parse_address(address.trim())?,
            balance_wei: eth_to_wei(amount.trim())?,
        })
    }
}

fn parse_address(s: &str) -> Result<Address, GenesisError> {
    let hex = s
        .strip_prefix("0x")
        .ok_or_else(|| GenesisError::InvalidAddress(s.to_string()))?;
    if hex.len() != 40 {
        return Err(GenesisError::InvalidAddress(s.to_string()));
    }
    s.parse::<Address>()
        .map_err(|_| GenesisError::InvalidAddress(s.to_string()))
}

/// Convert a decimal ETH amount to wei without floating point.
pub fn eth_to_wei(amount: &str) -> Result<U256, GenesisError> {
    if amount.is_empty() || amount.starts_with('-') {
        return Err(GenesisError::InvalidAmount(amount.to_string()));
    }
    parse_ether(amount).map_err(|_| GenesisError::InvalidAmount(amount.to_string()))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChainParams {
    chain_id: u64,
    homestead_block: u64,
    eip150_block: u64,
    eip155_block: u64,
    eip158_block: u64,
    byzantium_block: u64,
    constantinople_block: u64,
    petersburg_block: u64,
    istanbul_block: u64,
    berlin_block: u64,
    london_block: u64,
    terminal_total_difficulty: u64,
}

impl ChainParams {
    fn all_forks_at_genesis(chain_id: u64) -> Self {
        Self {
            chain_id,
            homestead_block: 0,
            eip150_block: 0,
            eip155_block: 0,
            eip158_block: 0,
            byzantium_block: 0,
            constantinople_block: 0,
            petersburg_block: 0,
            istanbul_block: 0,
            berlin_block: 0,
            london_block: 0,
            terminal_total_difficulty: 0,
        }
    }
}

#[derive(Debug, Serialize)]
struct AllocEntry {
    balance: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenesisDocument {
    config: ChainParams,
    difficulty: &'static str,
    gas_limit: &'static str,
    alloc: BTreeMap<String, AllocEntry>,
}

/// Render the genesis document as pretty JSON.
///
/// Addresses are keyed in EIP-55 checksum form, balances in decimal wei.
pub fn render_genesis(
    chain_id: u64,
    allocations: &[GenesisAllocation],
) -> Result<String, GenesisError> {
    if allocations.is_empty() {
        return Err(GenesisError::NoAllocations);
    }

    let mut alloc = BTreeMap::new();
    for allocation in allocations {
        let key = allocation.address.to_checksum(None);
        let entry = AllocEntry {
            balance: allocation.balance_wei.to_string(),
        };
        if alloc.insert(key.clone(), entry).is_some() {
            return Err(GenesisError::DuplicateAllocation(key));
        }
    }

    let document = GenesisDocument {
        config: ChainParams::all_forks_at_genesis(chain_id),
        difficulty: GENESIS_DIFFICULTY,
        gas_limit: GENESIS_GAS_LIMIT,
        alloc,
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Write the genesis document to `path`.
pub fn write_genesis(
    path: &Path,
    chain_id: u64,
    allocations: &[GenesisAllocation],
) -> Result<(), GenesisError> {
    let json = render_genesis(chain_id, allocations)?;
    std::fs::write(path, json + "\n").map_err(|source| GenesisError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), accounts = allocations.len(), "genesis written");
    Ok(())
}

/// Store the passphrase in plain text, owner-readable only on Unix.
pub fn write_password_file(path: &Path, passphrase: &str) -> Result<(), GenesisError> {
    if passphrase.is_empty() {
        return Err(GenesisError::EmptyPassphrase);
    }

    let write_err = |source: std::io::Error| GenesisError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path).map_err(write_err)?;
    file.write_all(passphrase.as_bytes()).map_err(write_err)?;
    tracing::warn!(
        path = %path.display(),
        "passphrase stored in plain text, use for local development only"
    );
    Ok(())
}
