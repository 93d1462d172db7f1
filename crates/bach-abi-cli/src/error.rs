//! CLI error types

use thiserror::Error;

/// CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid hex string
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Encoding, decoding or parsing failure
    #[error(transparent)]
    Abi(#[from] bach_abi::AbiError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config error
    #[error("Config error: {0}")]
    Config(String),
}

impl From<hex::FromHexError> for CliError {
    fn from(err: hex::FromHexError) -> Self {
        CliError::InvalidHex(err.to_string())
    }
}
