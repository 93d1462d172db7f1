//! ABI values

use std::fmt;

use bach_primitives::{Address, I256, U256};

use crate::decimal::Decimal;
use crate::param_type::ParamType;
use crate::AbiError;

/// Solidity ABI token types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Address (20 bytes)
    Address(Address),
    /// Boolean
    Bool(bool),
    /// Unsigned integer (8-256 bits)
    Uint(U256),
    /// Signed integer (8-256 bits)
    Int(I256),
    /// Fixed-point number (signed or unsigned)
    Fixed(Decimal),
    /// Fixed-size bytes (1-32)
    FixedBytes(Vec<u8>),
    /// Dynamic bytes
    Bytes(Vec<u8>),
    /// UTF-8 string
    String(String),
    /// Right-aligned hash of N bytes
    Hash(Vec<u8>),
    /// Dynamic array
    Array(Vec<Token>),
    /// Fixed-size array
    FixedArray(Vec<Token>),
    /// Tuple (struct)
    Tuple(Vec<Token>),
}

impl Token {
    /// Create an address token
    pub fn address(addr: Address) -> Self {
        Token::Address(addr)
    }

    /// Address from a hex string (with or without 0x prefix)
    pub fn address_from_hex(s: &str) -> Result<Self, AbiError> {
        Ok(Token::Address(Address::from_hex(s)?))
    }

    /// Address from exactly 20 raw bytes
    pub fn address_from_bytes(bytes: &[u8]) -> Result<Self, AbiError> {
        Ok(Token::Address(Address::from_slice(bytes)?))
    }

    /// Address from an integer that fits in 160 bits
    pub fn address_from_uint(value: U256) -> Result<Self, AbiError> {
        Ok(Token::Address(Address::from_uint(&value)?))
    }

    /// Hash from a hex string (with or without 0x prefix)
    pub fn hash_from_hex(s: &str) -> Result<Self, AbiError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        Ok(Token::Hash(hex::decode(s)?))
    }

    /// Hash from raw bytes
    pub fn hash_from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Token::Hash(bytes.into())
    }

    /// Hash of `size` bytes from an integer
    pub fn hash_from_uint(value: U256, size: usize) -> Result<Self, AbiError> {
        let mut word = [0u8; 32];
        value.to_big_endian(&mut word);
        if size == 0 || size > 32 || word[..32 - size].iter().any(|b| *b != 0) {
            return Err(AbiError::ValueOutOfBounds(format!(
                "{} does not fit in hash{}",
                value, size
            )));
        }
        Ok(Token::Hash(word[32 - size..].to_vec()))
    }

    /// Create a uint token
    pub fn uint(value: impl Into<U256>) -> Self {
        Token::Uint(value.into())
    }

    /// Create an int token
    pub fn int(value: i128) -> Self {
        Token::Int(I256::from_i128(value))
    }

    /// Create a bool token
    pub fn bool(value: bool) -> Self {
        Token::Bool(value)
    }

    /// Create a bytes token
    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        Token::Bytes(data.into())
    }

    /// Create a string token
    pub fn string(s: impl Into<String>) -> Self {
        Token::String(s.into())
    }

    /// Create a fixed-point token from a decimal string
    pub fn fixed(s: &str) -> Result<Self, AbiError> {
        Ok(Token::Fixed(s.parse()?))
    }

    /// Short name of the variant, used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Token::Address(_) => "address",
            Token::Bool(_) => "bool",
            Token::Uint(_) => "uint",
            Token::Int(_) => "int",
            Token::Fixed(_) => "fixed",
            Token::FixedBytes(_) => "fixed bytes",
            Token::Bytes(_) => "bytes",
            Token::String(_) => "string",
            Token::Hash(_) => "hash",
            Token::Array(_) => "array",
            Token::FixedArray(_) => "fixed array",
            Token::Tuple(_) => "tuple",
        }
    }

    /// Check that this token has the shape of `param_type`.
    ///
    /// Numeric ranges are not checked here; the encoder reports those.
    pub fn type_check(&self, param_type: &ParamType) -> bool {
        match (param_type, self) {
            (ParamType::Address, Token::Address(_))
            | (ParamType::Bool, Token::Bool(_))
            | (ParamType::Uint(_), Token::Uint(_))
            | (ParamType::Int(_), Token::Int(_))
            | (ParamType::Fixed(..), Token::Fixed(_))
            | (ParamType::UFixed(..), Token::Fixed(_))
            | (ParamType::Bytes, Token::Bytes(_))
            | (ParamType::String, Token::String(_)) => true,
            (ParamType::FixedBytes(size), Token::FixedBytes(bytes)) => bytes.len() <= *size,
            (ParamType::Hash(size), Token::Hash(bytes)) => bytes.len() == *size,
            (ParamType::Array(inner), Token::Array(tokens)) => {
                tokens.iter().all(|t| t.type_check(inner))
            }
            (ParamType::FixedArray(inner, len), Token::FixedArray(tokens)) => {
                tokens.len() == *len && tokens.iter().all(|t| t.type_check(inner))
            }
            (ParamType::Tuple(components), Token::Tuple(tokens)) => {
                components.len() == tokens.len()
                    && components
                        .iter()
                        .zip(tokens)
                        .all(|(c, t)| t.type_check(&c.kind))
            }
            _ => false,
        }
    }

    fn write(&self, f: &mut fmt::Formatter<'_>, nested: bool) -> fmt::Result {
        match self {
            Token::Address(addr) => write!(f, "{}", addr),
            Token::Bool(b) => write!(f, "{}", b),
            Token::Uint(value) => write!(f, "{}", value),
            Token::Int(value) => write!(f, "{}", value),
            Token::Fixed(value) => write!(f, "{}", value),
            Token::FixedBytes(bytes) | Token::Bytes(bytes) | Token::Hash(bytes) => {
                write!(f, "0x{}", hex::encode(bytes))
            }
            Token::String(s) if nested => write!(f, "{:?}", s),
            Token::String(s) => f.write_str(s),
            Token::Array(tokens) | Token::FixedArray(tokens) => {
                f.write_str("[")?;
                write_list(f, tokens)?;
                f.write_str("]")
            }
            Token::Tuple(tokens) => {
                f.write_str("(")?;
                write_list(f, tokens)?;
                f.write_str(")")
            }
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, tokens: &[Token]) -> fmt::Result {
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        token.write(f, true)?;
    }
    Ok(())
}

impl fmt::Display for Token {
    /// Strings are quoted only inside arrays and tuples
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(f, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_constructors() {
        let from_hex = Token::address_from_hex("0x00000000000000000000000000000000000000ff").unwrap();
        let from_uint = Token::address_from_uint(U256::from(255)).unwrap();
        let mut raw = [0u8; 20];
        raw[19] = 0xff;
        let from_bytes = Token::address_from_bytes(&raw).unwrap();

        assert_eq!(from_hex, from_uint);
        assert_eq!(from_hex, from_bytes);
    }

    #[test]
    fn test_address_constructors_reject_bad_input() {
        // 20 ASCII characters are raw text, never reinterpreted as hex
        assert!(Token::address_from_hex("abcdefghijabcdefghij").is_err());
        assert!(Token::address_from_bytes(&[0u8; 19]).is_err());
        assert!(matches!(
            Token::address_from_uint(U256::one() << 160),
            Err(AbiError::ValueOutOfBounds(_))
        ));
        assert!(matches!(
            Token::address_from_bytes(&[0u8; 19]),
            Err(AbiError::Encoding(_))
        ));
    }

    #[test]
    fn test_hash_constructors() {
        assert_eq!(Token::hash_from_hex("0xdead").unwrap(), Token::Hash(vec![0xde, 0xad]));
        assert_eq!(Token::hash_from_uint(U256::from(0xdead), 2).unwrap(), Token::Hash(vec![0xde, 0xad]));
        assert!(matches!(
            Token::hash_from_uint(U256::from(0x1_0000), 2),
            Err(AbiError::ValueOutOfBounds(_))
        ));
    }

    #[test]
    fn test_type_check() {
        assert!(Token::uint(5u64).type_check(&ParamType::Uint(8)));
        assert!(!Token::uint(5u64).type_check(&ParamType::Int(8)));
        assert!(Token::FixedBytes(vec![1, 2]).type_check(&ParamType::FixedBytes(4)));
        assert!(!Token::FixedBytes(vec![0; 5]).type_check(&ParamType::FixedBytes(4)));

        let ty = ParamType::FixedArray(Box::new(ParamType::Bool), 2);
        assert!(Token::FixedArray(vec![Token::Bool(true), Token::Bool(false)]).type_check(&ty));
        assert!(!Token::FixedArray(vec![Token::Bool(true)]).type_check(&ty));

        let tuple = ParamType::tuple([ParamType::String, ParamType::Bool]);
        assert!(Token::Tuple(vec![Token::string("a"), Token::Bool(true)]).type_check(&tuple));
        assert!(!Token::Tuple(vec![Token::Bool(true), Token::string("a")]).type_check(&tuple));
    }

    #[test]
    fn test_display() {
        assert_eq!(Token::int(-5).to_string(), "-5");
        assert_eq!(Token::bytes(vec![0xab, 0xcd]).to_string(), "0xabcd");
        assert_eq!(Token::string("hi").to_string(), "hi");
        assert_eq!(
            Token::Array(vec![Token::string("a\"b"), Token::uint(1u64)]).to_string(),
            "[\"a\\\"b\",1]"
        );
        assert_eq!(
            Token::Tuple(vec![Token::Bool(true), Token::fixed("-1.5").unwrap()]).to_string(),
            "(true,-1.5)"
        );
    }
}
