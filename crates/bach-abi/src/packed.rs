//! Non-standard packed encoding (`abi.encodePacked`)
//!
//! Values are concatenated at their minimal width with no padding, offsets,
//! or length words. The result cannot be decoded in general, so no decoder
//! exists.

use crate::encode::encode_single;
use crate::param_type::ParamType;
use crate::parser::parse_all;
use crate::token::Token;
use crate::AbiError;

/// Packed encoding driven by type strings
pub fn encode_packed<S: AsRef<str>>(type_strs: &[S], tokens: &[Token]) -> Result<Vec<u8>, AbiError> {
    let types = parse_all(type_strs)?;
    encode_packed_types(&types, tokens)
}

/// Packed encoding of already parsed types
pub fn encode_packed_types(types: &[ParamType], tokens: &[Token]) -> Result<Vec<u8>, AbiError> {
    if types.len() != tokens.len() {
        return Err(AbiError::encoding(format!(
            "expected {} values, got {}",
            types.len(),
            tokens.len()
        )));
    }

    let mut out = Vec::new();
    for (param_type, token) in types.iter().zip(tokens) {
        pack_into(&mut out, param_type, token)?;
    }
    Ok(out)
}

fn pack_into(out: &mut Vec<u8>, param_type: &ParamType, token: &Token) -> Result<(), AbiError> {
    match (param_type, token) {
        (ParamType::Bytes, Token::Bytes(data)) => out.extend_from_slice(data),
        (ParamType::String, Token::String(s)) => out.extend_from_slice(s.as_bytes()),
        (ParamType::Array(inner), Token::Array(tokens) | Token::FixedArray(tokens)) => {
            for token in tokens {
                pack_into(out, inner, token)?;
            }
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
            for token in tokens {
                pack_into(out, inner, token)?;
            }
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
            for (component, token) in components.iter().zip(tokens) {
                pack_into(out, &component.kind, token)?;
            }
        }
        _ => {
            // One-word values share the standard encoder's checks, then keep
            // only their significant bytes
            let word = encode_single(param_type, token)?;
            let range = packed_range(param_type).ok_or_else(|| {
                AbiError::encoding(format!(
                    "type mismatch: cannot pack {} value as {}",
                    token.kind_name(),
                    param_type
                ))
            })?;
            out.extend_from_slice(&word[range]);
        }
    }
    Ok(())
}

/// Bytes of the standard word that make up the packed form
fn packed_range(param_type: &ParamType) -> Option<std::ops::Range<usize>> {
    let width = match param_type {
        ParamType::Address => 20,
        ParamType::Bool => 1,
        ParamType::Uint(bits) | ParamType::Int(bits) => bits / 8,
        ParamType::Fixed(high, low) | ParamType::UFixed(high, low) => (high + low) / 8,
        ParamType::Hash(size) => *size,
        ParamType::FixedBytes(size) => return Some(0..*size),
        _ => return None,
    };
    Some(32 - width..32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bach_primitives::Address;

    #[test]
    fn test_packed_minimal_widths() {
        let encoded = encode_packed(
            &["uint40", "int64", "bool", "bytes2"],
            &[
                Token::uint(0x0102030405u64),
                Token::int(-2),
                Token::Bool(true),
                Token::FixedBytes(vec![0xab]),
            ],
        )
        .unwrap();

        let mut expected = vec![0x01, 0x02, 0x03, 0x04, 0x05];
        expected.extend_from_slice(&[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe]);
        expected.push(0x01);
        expected.extend_from_slice(&[0xab, 0x00]);
        assert_eq!(encoded, expected);
    }

    #[test]
    fn test_packed_address_and_string() {
        let addr = Address::from_bytes([0x11; 20]);
        let encoded = encode_packed(
            &["address", "string", "bytes"],
            &[Token::Address(addr), Token::string("hi"), Token::bytes(vec![0xca, 0xfe])],
        )
        .unwrap();

        let mut expected = vec![0x11; 20];
        expected.extend_from_slice(b"hi");
        expected.extend_from_slice(&[0xca, 0xfe]);
        assert_eq!(encoded, expected);
    }

    #[test]
    fn test_packed_arrays_and_tuples_concatenate() {
        let encoded = encode_packed(
            &["uint8[]", "(uint16,string)"],
            &[
                Token::Array(vec![Token::uint(1u64), Token::uint(2u64)]),
                Token::Tuple(vec![Token::uint(0x0304u64), Token::string("z")]),
            ],
        )
        .unwrap();
        assert_eq!(encoded, vec![1, 2, 3, 4, b'z']);
    }

    #[test]
    fn test_packed_range_checks() {
        assert!(matches!(
            encode_packed(&["uint8"], &[Token::uint(256u64)]),
            Err(AbiError::ValueOutOfBounds(_))
        ));
        assert!(matches!(
            encode_packed(&["uint7"], &[Token::uint(1u64)]),
            Err(AbiError::Parse(_))
        ));
        assert!(matches!(
            encode_packed(&["bool"], &[Token::string("true")]),
            Err(AbiError::Encoding(_))
        ));
    }
}
