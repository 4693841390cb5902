//! Error types for cmdflag
//!
//! Only user-input failures are represented here. Programming errors in the
//! declarations (binding twice, binding an undeclared flag, mismatched
//! storage, redefining a flag) panic at the call site instead.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for cmdflag operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors of loading program configuration
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be read
    #[error("Failed to read config file '{path}': {error}")]
    ConfigFile { path: PathBuf, error: io::Error },

    /// YAML parsing errors
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Errors produced while parsing an argument vector against a flag set
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlagError {
    #[error("flag provided but not defined: {0}")]
    NotDefined(String),

    #[error("flag needs an argument: {0}")]
    NeedsArgument(String),

    #[error("invalid value {value:?} for flag {flag}: {reason}")]
    InvalidValue {
        flag: String,
        value: String,
        reason: String,
    },

    /// Any other rejection reported by the parsing engine
    #[error("invalid arguments: {0}")]
    Rejected(String),

    #[error("help requested")]
    Help,
}

/// Specialized result type for flag parsing
pub type FlagResult<T> = std::result::Result<T, FlagError>;

/// Helper to determine if an error is an explicit help request
/// (which exits successfully rather than as a failure)
pub fn is_help(err: &FlagError) -> bool {
    matches!(err, FlagError::Help)
}
