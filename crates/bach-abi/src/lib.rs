//! # bach-abi
//!
//! Solidity ABI codec for BachLedger.
//!
//! ## Features
//!
//! - **Types**: parse type strings such as `uint256[2][]` or `(string,uint8)`
//! - **Encoding**: standard head/tail encoding and packed encoding
//! - **Decoding**: standard decoding that rejects overlapping, backwards or
//!   out-of-bounds offsets in untrusted input
//! - **Interfaces**: function selectors, event topics, call data and log
//!   decoding from JSON ABIs
//!
//! ## Example
//!
//! ```rust
//! use bach_abi::{decode, encode, parse_all, Token};
//!
//! let types = parse_all(&["string", "uint8[]"]).unwrap();
//! let values = vec![
//!     Token::string("hello"),
//!     Token::Array(vec![Token::uint(1u64), Token::uint(2u64)]),
//! ];
//!
//! let data = encode(&types, &values).unwrap();
//! assert_eq!(decode(&types, &data).unwrap(), values);
//! ```
//!
//! ## Contract Interaction
//!
//! ```rust
//! use bach_abi::{DecodedCall, Interface, Token};
//! use bach_primitives::Address;
//!
//! let erc20 = Interface::erc20();
//! let owner = Address::from_hex("0x742d35Cc6634C0532925a3b844Bc9e7595f0aB3d").unwrap();
//! let data = erc20.encode_call("balanceOf", &[Token::Address(owner)]).unwrap();
//!
//! match erc20.decode_call(&data).unwrap() {
//!     DecodedCall::Known(call) => assert_eq!(call.function.name, "balanceOf"),
//!     DecodedCall::Unknown { .. } => unreachable!(),
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod decimal;
mod decode;
mod encode;
mod error;
mod event;
mod function;
mod interface;
mod packed;
mod param;
mod param_type;
mod parser;
pub mod signature;
mod token;
mod tokenize;

pub use decimal::Decimal;
pub use decode::{decode, decode_single};
pub use encode::{encode, encode_function_call, encode_single};
pub use error::AbiError;
pub use event::{DecodedLog, Event, LogParam, RawLog};
pub use function::{Function, StateMutability};
pub use interface::{DecodedCall, FunctionCall, Interface};
pub use packed::{encode_packed, encode_packed_types};
pub use param::{parse_params, Param};
pub use param_type::{ParamType, TupleParam};
pub use parser::{parse, parse_all};
pub use signature::{event_topic, function_selector, selector, selector_hex};
pub use token::Token;
pub use tokenize::tokenize;
