//! ABI decoding
//!
//! Input is untrusted. Every value is decoded from the exact byte region it
//! owns: static values from their head slot, dynamic values from the range
//! between their offset and the next offset of the same container (or the
//! container end). Regions therefore never overlap, and total work is
//! bounded by the input length.

use bach_primitives::{Address, I256, U256};
use tracing::debug;

use crate::decimal::Decimal;
use crate::param_type::ParamType;
use crate::token::Token;
use crate::AbiError;

/// Decode an argument list from ABI-encoded data
pub fn decode(types: &[ParamType], data: &[u8]) -> Result<Vec<Token>, AbiError> {
    if let Some(ty) = types.iter().find(|ty| ty.size_overflows()) {
        return Err(AbiError::decoding(format!("{} is too large to decode", ty)));
    }
    decode_tuple(types.iter(), data)
}

/// Decode a single value from its own encoding (see [`crate::encode_single`])
pub fn decode_single(param_type: &ParamType, data: &[u8]) -> Result<Token, AbiError> {
    if param_type.size_overflows() {
        return Err(AbiError::decoding(format!("{} is too large to decode", param_type)));
    }
    decode_value(param_type, data)
}

/// Decode a value that owns all of `data`
fn decode_value(param_type: &ParamType, data: &[u8]) -> Result<Token, AbiError> {
    match param_type {
        ParamType::Bytes => Ok(Token::Bytes(decode_bytes(data)?.to_vec())),
        ParamType::String => {
            let bytes = decode_bytes(data)?;
            let s = std::str::from_utf8(bytes)
                .map_err(|e| AbiError::decoding(format!("invalid UTF-8: {}", e)))?;
            Ok(Token::String(s.to_string()))
        }
        ParamType::Array(inner) => {
            let count = read_usize(word_at(data, 0)?)?;
            let body = &data[32..];
            // Every element takes at least one word, in the head or in the offset table
            let min_len = count.checked_mul(32).filter(|n| *n <= body.len());
            if min_len.is_none() {
                debug!(count, available = body.len(), "array count exceeds payload");
                return Err(AbiError::decoding(format!(
                    "array count {} exceeds the {} bytes available",
                    count,
                    body.len()
                )));
            }
            Ok(Token::Array(decode_sequence(inner, count, body)?))
        }
        ParamType::FixedArray(inner, len) => Ok(Token::FixedArray(decode_sequence(inner, *len, data)?)),
        ParamType::Tuple(components) => {
            Ok(Token::Tuple(decode_tuple(components.iter().map(|c| &c.kind), data)?))
        }
        _ => {
            if data.len() != 32 {
                return Err(AbiError::decoding(format!(
                    "{} needs exactly 32 bytes, got {}",
                    param_type,
                    data.len()
                )));
            }
            decode_word(param_type, word_at(data, 0)?)
        }
    }
}

/// Decode a one-word value type
fn decode_word(param_type: &ParamType, word: &[u8; 32]) -> Result<Token, AbiError> {
    match param_type {
        ParamType::Address => {
            let mut bytes = [0u8; 20];
            bytes.copy_from_slice(&word[12..]);
            Ok(Token::Address(Address::from_bytes(bytes)))
        }
        ParamType::Bool => Ok(Token::Bool(word[31] == 1)),
        ParamType::Uint(_) => Ok(Token::Uint(U256::from_big_endian(word))),
        ParamType::Int(bits) => Ok(Token::Int(signed_word(word, *bits, param_type)?)),
        ParamType::Fixed(high, low) => {
            let raw = signed_word(word, high + low, param_type)?;
            Ok(Token::Fixed(Decimal::from_scaled(raw, *low)))
        }
        ParamType::UFixed(_, low) => {
            let raw = I256::from(U256::from_big_endian(word));
            Ok(Token::Fixed(Decimal::from_scaled(raw, *low)))
        }
        ParamType::FixedBytes(size) if *size <= 32 => Ok(Token::FixedBytes(word[..*size].to_vec())),
        ParamType::Hash(size) if *size <= 32 => Ok(Token::Hash(word[32 - size..].to_vec())),
        _ => Err(AbiError::decoding(format!("cannot decode {} from a single word", param_type))),
    }
}

/// Two's-complement word that must fit in `bits` bits
fn signed_word(word: &[u8; 32], bits: usize, param_type: &ParamType) -> Result<I256, AbiError> {
    let value = I256::from_twos_complement(U256::from_big_endian(word));
    if !value.fits_bits(bits) {
        debug!(%value, %param_type, "signed word outside declared width");
        return Err(AbiError::decoding(format!(
            "{} is outside the range of {}",
            value, param_type
        )));
    }
    Ok(value)
}

/// Length word followed by exactly the padded content
fn decode_bytes(data: &[u8]) -> Result<&[u8], AbiError> {
    let len = read_usize(word_at(data, 0)?)?;
    let rest = &data[32..];
    let padded = if len <= rest.len() {
        len.div_ceil(32) * 32
    } else {
        usize::MAX
    };
    if padded != rest.len() {
        debug!(len, available = rest.len(), "byte string size mismatch");
        return Err(AbiError::decoding(format!(
            "length {} does not match the {} bytes that follow",
            len,
            rest.len()
        )));
    }
    Ok(&rest[..len])
}

/// `count` elements of the same type laid out as a head/tail sequence
fn decode_sequence(inner: &ParamType, count: usize, data: &[u8]) -> Result<Vec<Token>, AbiError> {
    if let Some(size) = inner.static_size() {
        let expected = count.checked_mul(size);
        if expected != Some(data.len()) {
            return Err(AbiError::decoding(format!(
                "{} elements of {} need {} bytes, got {}",
                count,
                inner,
                count.saturating_mul(size),
                data.len()
            )));
        }
        if size == 0 {
            return (0..count).map(|_| decode_value(inner, &[])).collect();
        }
        return data.chunks(size).map(|chunk| decode_value(inner, chunk)).collect();
    }

    if count == 0 {
        if !data.is_empty() {
            debug!(len = data.len(), "trailing bytes after empty array");
            return Err(AbiError::decoding(format!(
                "empty {} array followed by {} trailing bytes",
                inner,
                data.len()
            )));
        }
        return Ok(Vec::new());
    }

    // Offset table of dynamic elements: each offset must lie past the table
    // and no element may start before the previous one
    let head_size = count
        .checked_mul(32)
        .filter(|n| *n <= data.len())
        .ok_or_else(|| AbiError::decoding(format!("offset table of {} entries exceeds payload", count)))?;

    let mut offsets = Vec::with_capacity(count);
    for i in 0..count {
        let offset = read_usize(word_at(data, i * 32)?)?;
        let previous = offsets.last().copied().unwrap_or(head_size);
        if offset < head_size || offset > data.len() || offset < previous {
            debug!(index = i, offset, head_size, previous, len = data.len(), "rejecting array element offset");
            return Err(AbiError::decoding(format!(
                "element {} has invalid offset {} (table ends at {}, previous element at {}, length {})",
                i,
                offset,
                head_size,
                previous,
                data.len()
            )));
        }
        offsets.push(offset);
    }

    offsets
        .iter()
        .enumerate()
        .map(|(i, start)| {
            let end = offsets.get(i + 1).copied().unwrap_or(data.len());
            decode_value(inner, &data[*start..end])
        })
        .collect()
}

/// Head/tail decoding of a heterogeneous sequence.
///
/// Dynamic components are paired with their byte ranges by sorting the
/// declared offsets, so the range of each ends where the next-higher offset
/// begins regardless of declaration order.
fn decode_tuple<'a, I>(kinds: I, data: &[u8]) -> Result<Vec<Token>, AbiError>
where
    I: Iterator<Item = &'a ParamType> + Clone,
{
    let head_size: usize = kinds.clone().map(|k| k.head_size()).sum();
    if data.len() < head_size {
        return Err(AbiError::decoding(format!(
            "need at least {} bytes for the head, got {}",
            head_size,
            data.len()
        )));
    }

    let mut tokens: Vec<Option<Token>> = Vec::new();
    let mut pointers = Vec::new();
    let mut pos = 0;
    for (index, kind) in kinds.clone().enumerate() {
        if kind.is_dynamic() {
            let pointer = read_usize(word_at(data, pos)?)?;
            pointers.push((index, pointer));
            tokens.push(None);
            pos += 32;
        } else {
            let size = kind.head_size();
            tokens.push(Some(decode_value(kind, &data[pos..pos + size])?));
            pos += size;
        }
    }

    if pointers.is_empty() && data.len() != head_size {
        return Err(AbiError::decoding(format!(
            "static data must be exactly {} bytes, got {}",
            head_size,
            data.len()
        )));
    }

    let kinds: Vec<&ParamType> = kinds.collect();
    pointers.sort_by_key(|(_, pointer)| *pointer);
    for (i, (index, start)) in pointers.iter().enumerate() {
        let end = pointers.get(i + 1).map(|(_, next)| *next).unwrap_or(data.len());
        if *start < head_size || *start > data.len() || end < *start || end > data.len() {
            debug!(index, start, end, head_size, len = data.len(), "rejecting tuple component offset");
            return Err(AbiError::decoding(format!(
                "component {} has invalid range {}..{} (head ends at {}, length {})",
                index,
                start,
                end,
                head_size,
                data.len()
            )));
        }
        tokens[*index] = Some(decode_value(kinds[*index], &data[*start..end])?);
    }

    tokens
        .into_iter()
        .map(|t| t.ok_or_else(|| AbiError::decoding("component left undecoded")))
        .collect()
}

/// The 32-byte word at `pos`
fn word_at(data: &[u8], pos: usize) -> Result<&[u8; 32], AbiError> {
    pos.checked_add(32)
        .and_then(|end| data.get(pos..end))
        .and_then(|slice| slice.try_into().ok())
        .ok_or_else(|| {
            AbiError::decoding(format!(
                "insufficient data: need 32 bytes at offset {}, have {}",
                pos,
                data.len()
            ))
        })
}

/// Length, count or offset word as a `usize`
fn read_usize(word: &[u8; 32]) -> Result<usize, AbiError> {
    let value = U256::from_big_endian(word);
    if value.bits() > 64 {
        return Err(AbiError::decoding(format!("{} is too large for a length or offset", value)));
    }
    usize::try_from(value.low_u64())
        .map_err(|_| AbiError::decoding(format!("{} is too large for a length or offset", value)))
}
