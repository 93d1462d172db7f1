//! Exact decimal values for `fixed`/`ufixed` types

use std::fmt;
use std::str::FromStr;

use bach_primitives::{I256, U256, U512};

use crate::AbiError;

/// Exact decimal number: sign, integer part and fractional digits.
///
/// Fractional digits never end in zero and zero is never negative, so
/// derived equality compares values.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Decimal {
    negative: bool,
    int_part: U256,
    frac_digits: Vec<u8>,
}

impl Decimal {
    fn normalized(negative: bool, int_part: U256, mut frac_digits: Vec<u8>) -> Self {
        while frac_digits.last() == Some(&0) {
            frac_digits.pop();
        }
        let is_zero = int_part.is_zero() && frac_digits.is_empty();
        Self {
            negative: negative && !is_zero,
            int_part,
            frac_digits,
        }
    }

    /// Whole-number value
    pub fn from_int(value: I256) -> Self {
        Self::normalized(value.is_negative(), value.abs(), Vec::new())
    }

    /// Exact value of `raw / 2^frac_bits`
    pub fn from_scaled(raw: I256, frac_bits: usize) -> Self {
        let abs = raw.abs();
        if frac_bits == 0 {
            return Self::from_int(raw);
        }
        let int_part = if frac_bits >= 256 {
            U256::zero()
        } else {
            abs >> frac_bits
        };

        // Binary fractions terminate after at most `frac_bits` decimal digits
        let mask = (U512::one() << frac_bits) - U512::one();
        let mut rem = U512::from(abs) & mask;
        let mut digits = Vec::new();
        while !rem.is_zero() {
            rem = rem * U512::from(10u8);
            digits.push((rem >> frac_bits).low_u32() as u8);
            rem = rem & mask;
        }
        Self::normalized(raw.is_negative(), int_part, digits)
    }

    /// `floor(|self| * 2^frac_bits)` and whether the product was exact
    pub fn scaled_magnitude(&self, frac_bits: usize) -> (U512, bool) {
        let mut scaled = U512::from(self.int_part) << frac_bits;

        // Repeated doubling of the fraction yields its binary digits
        let mut digits = self.frac_digits.clone();
        for bit in (0..frac_bits).rev() {
            let mut carry = 0u8;
            for digit in digits.iter_mut().rev() {
                let doubled = *digit * 2 + carry;
                *digit = doubled % 10;
                carry = doubled / 10;
            }
            if carry == 1 {
                scaled = scaled | (U512::one() << bit);
            }
        }
        let exact = digits.iter().all(|d| *d == 0);
        (scaled, exact)
    }

    /// Check if negative
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.int_part.is_zero() && self.frac_digits.is_empty()
    }

    /// Integer part (truncated toward zero) magnitude
    pub fn int_part(&self) -> U256 {
        self.int_part
    }
}

impl FromStr for Decimal {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AbiError::encoding(format!("invalid decimal '{}'", s));

        let (negative, body) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };
        let (int_str, frac_str) = body.split_once('.').unwrap_or((body, ""));
        if int_str.is_empty() && frac_str.is_empty() {
            return Err(invalid());
        }
        if !int_str.bytes().chain(frac_str.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let int_part = if int_str.is_empty() {
            U256::zero()
        } else {
            U256::from_dec_str(int_str).map_err(|_| invalid())?
        };
        let frac_digits = frac_str.bytes().map(|b| b - b'0').collect();
        Ok(Self::normalized(negative, int_part, frac_digits))
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            f.write_str("-")?;
        }
        write!(f, "{}", self.int_part)?;
        if !self.frac_digits.is_empty() {
            f.write_str(".")?;
            for digit in &self.frac_digits {
                write!(f, "{}", digit)?;
            }
        }
        Ok(())
    }
}

impl From<I256> for Decimal {
    fn from(value: I256) -> Self {
        Self::from_int(value)
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Self::from_int(I256::from(value))
    }
}
