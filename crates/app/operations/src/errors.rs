//! Error types for the operations crate.

use std::path::PathBuf;

use thiserror::Error;

use crate::runtime::RoutineFailure;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O error when loading config.
    #[error("failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },

    /// File I/O error when writing the default config.
    #[error("failed to write config file '{path}': {source}")]
    FileWrite {
        path: String,
        source: std::io::Error,
    },

    /// The config file already exists and overwriting was not requested.
    #[error("config file '{0}' already exists (use --force to overwrite)")]
    AlreadyExists(String),

    /// YAML parsing error.
    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },

    /// YAML serialization error.
    #[error("failed to serialize config: {0}")]
    Serialize(serde_yaml::Error),

    /// Merging file, environment and flag layers failed.
    #[error("failed to assemble configuration: {0}")]
    Layered(String),

    /// Validation failed with one or more errors.
    #[error("config validation failed:\n{}", .0.join("\n"))]
    ValidationFailed(Vec<String>),
}

/// The account routine printed something other than exactly one address token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityParseError {
    /// No `{<address>}` token was present.
    #[error("account routine output contains no {{address}} token")]
    NoAddress,

    /// More than one distinct address token was present.
    #[error("account routine output is ambiguous: found addresses {}", .0.join(", "))]
    Ambiguous(Vec<String>),
}

/// A hex address could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid address '{0}': expected hex digits")]
pub struct AddressError(pub String);

/// Bootstrap failures. Every variant is fatal to the run.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Reading or writing workspace files failed.
    #[error("filesystem error at '{}': {source}", path.display())]
    Filesystem {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The workspace path exists but cannot host a node.
    #[error("workspace '{}' is unusable: {reason}", path.display())]
    InvalidWorkspace { path: PathBuf, reason: String },

    /// The identity marker exists but does not hold an address.
    #[error("identity marker '{}' is corrupt: {source}", path.display())]
    CorruptIdentity { path: PathBuf, source: AddressError },

    /// The external chain initialization routine failed.
    #[error("chain initialization failed: {0}")]
    InitializationFailed(RoutineFailure),

    /// The external account creation routine failed.
    #[error("account creation failed: {0}")]
    IdentityCreationFailed(RoutineFailure),

    /// The account creation routine succeeded but its output held no usable address.
    #[error(transparent)]
    IdentityParse(#[from] IdentityParseError),

    /// The node process could not be spawned.
    #[error("failed to launch '{program}': {source}")]
    LaunchFailed {
        program: String,
        source: std::io::Error,
    },

    /// Another bootstrap run holds the workspace lock.
    #[error("workspace '{}' is locked by another bootstrap run", path.display())]
    WorkspaceBusy { path: PathBuf },
}

impl BootstrapError {
    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }
}

/// Errors from the development genesis helpers.
#[derive(Debug, Error)]
pub enum GenesisError {
    /// An allocation was not of the form `<address>=<eth>`.
    #[error("invalid allocation '{0}': expected <address>=<eth amount>")]
    MalformedAllocation(String),

    /// Address is not a 20-byte hex value.
    #[error("invalid address '{0}': it must be 0x followed by 40 hex digits")]
    InvalidAddress(String),

    /// Balance is not a non-negative decimal ETH amount.
    #[error("'{0}' is not a valid ETH amount")]
    InvalidAmount(String),

    /// The same address was allocated twice.
    #[error("address {0} is allocated more than once")]
    DuplicateAllocation(String),

    /// No allocations were supplied.
    #[error("at least one allocation is required")]
    NoAllocations,

    /// The passphrase was empty.
    #[error("passphrase must not be empty")]
    EmptyPassphrase,

    /// JSON encoding failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing an output file failed.
    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}
