//! # bach-primitives
//!
//! Primitive value types for the BachLedger ABI codec.
//!
//! - Fixed-width byte strings ([`Address`], [`H256`], [`FixedBytes`])
//! - Signed 256-bit integers ([`I256`]) next to the unsigned [`U256`]
//! - Keccak-256 hashing

#![warn(missing_docs)]
#![warn(clippy::all)]

mod bytes;
mod error;
mod hash;
mod int;

pub use bytes::{Address, FixedBytes, H256};
pub use error::PrimitiveError;
pub use hash::keccak256;
pub use int::I256;

// Re-export primitive-types for U256 and the wide intermediate U512
pub use primitive_types::{U256, U512};
