//! Fixed-width byte strings (addresses, hashes)

use std::fmt;
use std::str::FromStr;

use primitive_types::U256;

use crate::PrimitiveError;

/// Fixed-width byte string of `N` bytes
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FixedBytes<const N: usize>([u8; N]);

/// Ethereum-compatible 20-byte address
pub type Address = FixedBytes<20>;

/// 256-bit hash (32 bytes)
pub type H256 = FixedBytes<32>;

impl<const N: usize> FixedBytes<N> {
    /// Size in bytes
    pub const LEN: usize = N;

    /// All-zero value
    pub const ZERO: Self = FixedBytes([0u8; N]);

    /// Create from bytes
    pub const fn from_bytes(bytes: [u8; N]) -> Self {
        FixedBytes(bytes)
    }

    /// Create from slice, which must be exactly `N` bytes long
    pub fn from_slice(slice: &[u8]) -> Result<Self, PrimitiveError> {
        if slice.len() != N {
            return Err(PrimitiveError::InvalidLength {
                expected: N,
                got: slice.len(),
            });
        }
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(slice);
        Ok(FixedBytes(bytes))
    }

    /// Parse from hex string (with or without 0x prefix)
    pub fn from_hex(s: &str) -> Result<Self, PrimitiveError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| PrimitiveError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Create from an integer, right-aligned in `N` bytes.
    ///
    /// Fails if the integer needs more than `N` bytes.
    pub fn from_uint(value: &U256) -> Result<Self, PrimitiveError> {
        let mut word = [0u8; 32];
        value.to_big_endian(&mut word);

        let mut bytes = [0u8; N];
        if N >= 32 {
            bytes[N - 32..].copy_from_slice(&word);
        } else {
            let (high, low) = word.split_at(32 - N);
            if high.iter().any(|b| *b != 0) {
                return Err(PrimitiveError::Overflow(N));
            }
            bytes.copy_from_slice(low);
        }
        Ok(FixedBytes(bytes))
    }

    /// Get as bytes
    pub fn as_bytes(&self) -> &[u8; N] {
        &self.0
    }

    /// Get as mutable bytes
    pub fn as_bytes_mut(&mut self) -> &mut [u8; N] {
        &mut self.0
    }

    /// Check if all bytes are zero
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// Convert to hex string with 0x prefix
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl<const N: usize> Default for FixedBytes<N> {
    fn default() -> Self {
        Self::ZERO
    }
}

impl<const N: usize> fmt::Debug for FixedBytes<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FixedBytes<{}>({})", N, self.to_hex())
    }
}

impl<const N: usize> fmt::Display for FixedBytes<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl<const N: usize> FromStr for FixedBytes<N> {
    type Err = PrimitiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl<const N: usize> From<[u8; N]> for FixedBytes<N> {
    fn from(bytes: [u8; N]) -> Self {
        FixedBytes(bytes)
    }
}

impl<const N: usize> AsRef<[u8]> for FixedBytes<N> {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
