//! ABI encoding
//!
//! Static values occupy their words in place. Dynamic values are appended to
//! the tail of the enclosing container and referenced from the head by an
//! offset relative to the start of that container.

use bach_primitives::{Address, I256, U256, U512};

use crate::decimal::Decimal;
use crate::param_type::ParamType;
use crate::token::Token;
use crate::AbiError;

/// Encode an argument list according to the Solidity ABI specification
pub fn encode(types: &[ParamType], tokens: &[Token]) -> Result<Vec<u8>, AbiError> {
    if types.len() != tokens.len() {
        return Err(AbiError::encoding(format!(
            "expected {} values, got {}",
            types.len(),
            tokens.len()
        )));
    }
    if let Some(ty) = types.iter().find(|ty| ty.size_overflows()) {
        return Err(AbiError::encoding(format!("{} is too large to encode", ty)));
    }
    encode_params(types.iter().zip(tokens))
}

/// Encode a single value on its own.
///
/// For dynamic types this is the value's own encoding (length or count word
/// first), without the offset word an enclosing argument list would add.
pub fn encode_single(param_type: &ParamType, token: &Token) -> Result<Vec<u8>, AbiError> {
    if param_type.size_overflows() {
        return Err(AbiError::encoding(format!("{} is too large to encode", param_type)));
    }
    encode_token(param_type, token)
}

/// Encode function call (selector + params)
pub fn encode_function_call(
    selector: [u8; 4],
    types: &[ParamType],
    tokens: &[Token],
) -> Result<Vec<u8>, AbiError> {
    let mut result = selector.to_vec();
    result.extend(encode(types, tokens)?);
    Ok(result)
}

/// Head/tail encoding of a sequence of values
fn encode_params<'a, I>(params: I) -> Result<Vec<u8>, AbiError>
where
    I: Iterator<Item = (&'a ParamType, &'a Token)> + Clone,
{
    let head_size: usize = params.clone().map(|(ty, _)| ty.head_size()).sum();

    let mut head = Vec::with_capacity(head_size);
    let mut tail = Vec::new();

    for (param_type, token) in params {
        let encoded = encode_token(param_type, token)?;
        if param_type.is_dynamic() {
            head.extend_from_slice(&usize_word(head_size + tail.len()));
            tail.extend(encoded);
        } else {
            head.extend(encoded);
        }
    }

    head.extend(tail);
    Ok(head)
}

/// Encode a single token
fn encode_token(param_type: &ParamType, token: &Token) -> Result<Vec<u8>, AbiError> {
    match (param_type, token) {
        (ParamType::Address, Token::Address(addr)) => Ok(left_pad(addr.as_bytes())),
        (ParamType::Address, Token::Uint(value)) => {
            let addr = Address::from_uint(value).map_err(|_| {
                AbiError::ValueOutOfBounds(format!("{} does not fit in an address", value))
            })?;
            Ok(left_pad(addr.as_bytes()))
        }
        (ParamType::Bool, Token::Bool(b)) => Ok(u256_word(&U256::from(*b as u8)).to_vec()),
        (ParamType::Uint(bits), Token::Uint(_) | Token::Int(_)) => {
            encode_uint(*bits, integer_value(token))
        }
        (ParamType::Int(bits), Token::Uint(_) | Token::Int(_)) => {
            encode_int(*bits, integer_value(token))
        }
        (ParamType::Fixed(high, low), _) => {
            encode_fixed(true, *high, *low, &decimal_value(param_type, token)?)
        }
        (ParamType::UFixed(high, low), _) => {
            encode_fixed(false, *high, *low, &decimal_value(param_type, token)?)
        }
        (ParamType::FixedBytes(size), Token::FixedBytes(data)) => {
            if data.len() > (*size).min(32) {
                return Err(AbiError::encoding(format!(
                    "{} bytes do not fit in bytes{}",
                    data.len(),
                    size
                )));
            }
            let mut buf = [0u8; 32];
            buf[..data.len()].copy_from_slice(data);
            Ok(buf.to_vec())
        }
        (ParamType::Hash(size), Token::Hash(data) | Token::FixedBytes(data)) => {
            if data.len() != *size || *size > 32 {
                return Err(AbiError::encoding(format!(
                    "hash{} needs exactly {} bytes, got {}",
                    size,
                    size,
                    data.len()
                )));
            }
            Ok(left_pad(data))
        }
        (ParamType::Hash(size), Token::Uint(value)) => {
            let word = u256_word(value);
            if *size > 32 || word[..32 - size].iter().any(|b| *b != 0) {
                return Err(AbiError::ValueOutOfBounds(format!(
                    "{} does not fit in hash{}",
                    value, size
                )));
            }
            Ok(word.to_vec())
        }
        (ParamType::Bytes, Token::Bytes(data)) => Ok(encode_bytes(data)),
        (ParamType::String, Token::String(s)) => Ok(encode_bytes(s.as_bytes())),
        (ParamType::Array(inner), Token::Array(tokens) | Token::FixedArray(tokens)) => {
            let mut result = usize_word(tokens.len()).to_vec();
            result.extend(encode_params(std::iter::repeat(inner.as_ref()).zip(tokens))?);
            Ok(result)
        }
        (ParamType::FixedArray(inner, len), Token::Array(tokens) | Token::FixedArray(tokens)) => {
            if tokens.len() != *len {
                return Err(AbiError::encoding(format!(
                    "{} expects {} elements, got {}",
                    param_type,
                    len,
                    tokens.len()
                )));
            }
            encode_params(std::iter::repeat(inner.as_ref()).zip(tokens))
        }
        (ParamType::Tuple(components), Token::Tuple(tokens)) => {
            if tokens.len() != components.len() {
                return Err(AbiError::encoding(format!(
                    "{} expects {} components, got {}",
                    param_type,
                    components.len(),
                    tokens.len()
                )));
            }
            encode_params(components.iter().map(|c| &c.kind).zip(tokens))
        }
        _ => Err(mismatch(param_type, token)),
    }
}

fn mismatch(param_type: &ParamType, token: &Token) -> AbiError {
    AbiError::encoding(format!(
        "type mismatch: cannot encode {} value as {}",
        token.kind_name(),
        param_type
    ))
}

/// Integer value of a `Uint` or `Int` token
fn integer_value(token: &Token) -> I256 {
    match token {
        Token::Int(value) => *value,
        Token::Uint(value) => I256::from(*value),
        _ => I256::ZERO,
    }
}

fn decimal_value(param_type: &ParamType, token: &Token) -> Result<Decimal, AbiError> {
    match token {
        Token::Fixed(value) => Ok(value.clone()),
        Token::Uint(_) | Token::Int(_) => Ok(Decimal::from_int(integer_value(token))),
        _ => Err(mismatch(param_type, token)),
    }
}

fn encode_uint(bits: usize, value: I256) -> Result<Vec<u8>, AbiError> {
    let in_range = !value.is_negative() && (bits >= 256 || value.abs() < U256::one() << bits);
    if !in_range {
        return Err(AbiError::ValueOutOfBounds(format!(
            "{} is outside the range of uint{}",
            value, bits
        )));
    }
    Ok(u256_word(&value.abs()).to_vec())
}

fn encode_int(bits: usize, value: I256) -> Result<Vec<u8>, AbiError> {
    if !value.fits_bits(bits) {
        return Err(AbiError::ValueOutOfBounds(format!(
            "{} is outside the range of int{}",
            value, bits
        )));
    }
    // Negative values are sign-extended to the full word (modulo 2^256)
    Ok(u256_word(&value.to_twos_complement()).to_vec())
}

/// Scale by `2^low`, truncate toward zero, then encode as an integer word
fn encode_fixed(signed: bool, high: usize, low: usize, value: &Decimal) -> Result<Vec<u8>, AbiError> {
    let out_of_bounds = || {
        let kind = if signed { "fixed" } else { "ufixed" };
        AbiError::ValueOutOfBounds(format!("{} is outside the range of {}{}x{}", value, kind, high, low))
    };

    let (magnitude, exact) = value.scaled_magnitude(low);
    let total = high + low;
    let in_range = if signed {
        let limit = U512::one() << (total - 1);
        magnitude < limit || (value.is_negative() && exact && magnitude == limit)
    } else {
        !value.is_negative() && magnitude < U512::one() << total
    };
    if !in_range {
        return Err(out_of_bounds());
    }

    let magnitude = U256::try_from(magnitude).map_err(|_| out_of_bounds())?;
    let raw = I256::new(magnitude, value.is_negative());
    Ok(u256_word(&raw.to_twos_complement()).to_vec())
}

/// Encode dynamic bytes: length word, then content zero-padded to a word boundary
fn encode_bytes(data: &[u8]) -> Vec<u8> {
    let mut result = usize_word(data.len()).to_vec();

    let padded_len = data.len().div_ceil(32) * 32;
    let mut padded = vec![0u8; padded_len];
    padded[..data.len()].copy_from_slice(data);
    result.extend(padded);

    result
}

/// Right-align `data` in a 32-byte word
fn left_pad(data: &[u8]) -> Vec<u8> {
    let mut buf = vec![0u8; 32];
    buf[32 - data.len()..].copy_from_slice(data);
    buf
}

/// Convert U256 to 32-byte big-endian array
pub(crate) fn u256_word(value: &U256) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    bytes
}

fn usize_word(value: usize) -> [u8; 32] {
    u256_word(&U256::from(value))
}
