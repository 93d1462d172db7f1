//! Common error types for primitives

use thiserror::Error;

/// Primitive operation error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrimitiveError {
    /// Invalid hex string
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    /// Byte length does not match the fixed width
    #[error("invalid length: expected {expected} bytes, got {got}")]
    InvalidLength {
        /// Required number of bytes
        expected: usize,
        /// Number of bytes supplied
        got: usize,
    },

    /// Integer does not fit into the target width
    #[error("value does not fit in {0} bytes")]
    Overflow(usize),

    /// Malformed decimal integer
    #[error("invalid integer: {0}")]
    InvalidInteger(String),
}
