//! ABI error types

use bach_primitives::PrimitiveError;
use thiserror::Error;

/// ABI error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbiError {
    /// Malformed type string, unknown base kind, forbidden or missing suffix
    #[error("ABI parse error: {0}")]
    Parse(String),

    /// Value does not match its type, or cannot be converted
    #[error("ABI encoding error: {0}")]
    Encoding(String),

    /// Numeric value outside the range of its declared width
    #[error("value out of bounds: {0}")]
    ValueOutOfBounds(String),

    /// Structurally inconsistent input bytes
    #[error("ABI decoding error: {0}")]
    Decoding(String),
}

impl AbiError {
    pub(crate) fn parse(msg: impl Into<String>) -> Self {
        AbiError::Parse(msg.into())
    }

    pub(crate) fn encoding(msg: impl Into<String>) -> Self {
        AbiError::Encoding(msg.into())
    }

    pub(crate) fn decoding(msg: impl Into<String>) -> Self {
        AbiError::Decoding(msg.into())
    }
}

impl From<PrimitiveError> for AbiError {
    fn from(e: bach_primitives::PrimitiveError) -> Self {
        match e {
            PrimitiveError::Overflow(_) => AbiError::ValueOutOfBounds(e.to_string()),
            _ => AbiError::Encoding(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for AbiError {
    fn from(e: serde_json::Error) -> Self {
        AbiError::Parse(format!("invalid JSON ABI: {}", e))
    }
}

impl From<hex::FromHexError> for AbiError {
    fn from(e: hex::FromHexError) -> Self {
        AbiError::Encoding(format!("invalid hex: {}", e))
    }
}
