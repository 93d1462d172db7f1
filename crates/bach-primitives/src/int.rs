//! Signed 256-bit integer

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use primitive_types::U256;

use crate::PrimitiveError;

/// Signed 256-bit integer stored as sign and magnitude.
///
/// Zero is always non-negative, so derived equality is exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct I256 {
    abs: U256,
    negative: bool,
}

impl I256 {
    /// Zero
    pub const ZERO: I256 = I256 {
        abs: U256::zero(),
        negative: false,
    };

    /// Create from magnitude and sign
    pub fn new(abs: U256, negative: bool) -> Self {
        Self {
            abs,
            negative: negative && !abs.is_zero(),
        }
    }

    /// Create from i128
    pub fn from_i128(value: i128) -> Self {
        Self::new(U256::from(value.unsigned_abs()), value < 0)
    }

    /// Interpret a 256-bit word as two's complement
    pub fn from_twos_complement(word: U256) -> Self {
        if word.bit(255) {
            let (abs, _) = (!word).overflowing_add(U256::one());
            Self::new(abs, true)
        } else {
            Self::new(word, false)
        }
    }

    /// Two's complement representation modulo 2^256
    pub fn to_twos_complement(&self) -> U256 {
        if self.negative {
            (!self.abs).overflowing_add(U256::one()).0
        } else {
            self.abs
        }
    }

    /// Parse a decimal string with optional leading sign
    pub fn from_dec_str(s: &str) -> Result<Self, PrimitiveError> {
        let (negative, digits) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PrimitiveError::InvalidInteger(s.to_string()));
        }
        let abs = U256::from_dec_str(digits)
            .map_err(|_| PrimitiveError::InvalidInteger(s.to_string()))?;
        Ok(Self::new(abs, negative))
    }

    /// Magnitude
    pub fn abs(&self) -> U256 {
        self.abs
    }

    /// Check if negative
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.abs.is_zero()
    }

    /// Check that the value lies in `[-2^(bits-1), 2^(bits-1))`
    pub fn fits_bits(&self, bits: usize) -> bool {
        if bits == 0 || bits > 256 {
            return false;
        }
        let bound = U256::one() << (bits - 1);
        if self.negative {
            self.abs <= bound
        } else {
            self.abs < bound
        }
    }
}

impl Ord for I256 {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.negative, other.negative) {
            (false, false) => self.abs.cmp(&other.abs),
            (true, true) => other.abs.cmp(&self.abs),
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
        }
    }
}

impl PartialOrd for I256 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for I256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-{}", self.abs)
        } else {
            write!(f, "{}", self.abs)
        }
    }
}

impl FromStr for I256 {
    type Err = PrimitiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_dec_str(s)
    }
}

impl From<i64> for I256 {
    fn from(value: i64) -> Self {
        Self::from_i128(value as i128)
    }
}

impl From<i128> for I256 {
    fn from(value: i128) -> Self {
        Self::from_i128(value)
    }
}

impl From<U256> for I256 {
    fn from(value: U256) -> Self {
        Self::new(value, false)
    }
}
