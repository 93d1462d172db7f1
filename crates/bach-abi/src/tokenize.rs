//! Text to token conversion
//!
//! Accepted forms: decimal or `0x` hex integers, `true`/`false`, decimals for
//! fixed-point types, `0x` hex for byte types and addresses, strings either
//! raw or double-quoted, `[a,b,...]` arrays and `(a,b,...)` tuples. Inside
//! arrays and tuples, strings containing `,`, `]` or `)` must be quoted.

use bach_primitives::{I256, U256};

use crate::param_type::ParamType;
use crate::token::Token;
use crate::AbiError;

/// Parse a textual value of the given type
pub fn tokenize(param_type: &ParamType, value: &str) -> Result<Token, AbiError> {
    let value = value.trim();
    match param_type {
        ParamType::Address => Token::address_from_hex(value),
        ParamType::Bool => match value {
            "true" => Ok(Token::Bool(true)),
            "false" => Ok(Token::Bool(false)),
            _ => Err(invalid(param_type, value)),
        },
        ParamType::Uint(_) => Ok(Token::Uint(parse_uint(value).ok_or_else(|| invalid(param_type, value))?)),
        ParamType::Int(_) => {
            let parsed = match parse_uint(value) {
                Some(abs) if value.starts_with("0x") => Some(I256::from(abs)),
                _ => I256::from_dec_str(value).ok(),
            };
            Ok(Token::Int(parsed.ok_or_else(|| invalid(param_type, value))?))
        }
        ParamType::Fixed(..) | ParamType::UFixed(..) => Token::fixed(value),
        ParamType::FixedBytes(_) => Ok(Token::FixedBytes(decode_hex(value)?)),
        ParamType::Bytes => Ok(Token::Bytes(decode_hex(value)?)),
        ParamType::Hash(_) => Token::hash_from_hex(value),
        ParamType::String => Ok(Token::String(unquote(value)?)),
        ParamType::Array(inner) => {
            let items = split_list(value, '[', ']')?;
            let tokens = items
                .into_iter()
                .map(|item| tokenize(inner, item))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Token::Array(tokens))
        }
        ParamType::FixedArray(inner, len) => {
            let items = split_list(value, '[', ']')?;
            if items.len() != *len {
                return Err(AbiError::encoding(format!(
                    "{} expects {} elements, got {}",
                    param_type,
                    len,
                    items.len()
                )));
            }
            let tokens = items
                .into_iter()
                .map(|item| tokenize(inner, item))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Token::FixedArray(tokens))
        }
        ParamType::Tuple(components) => {
            let items = split_list(value, '(', ')')?;
            if items.len() != components.len() {
                return Err(AbiError::encoding(format!(
                    "{} expects {} components, got {}",
                    param_type,
                    components.len(),
                    items.len()
                )));
            }
            let tokens = components
                .iter()
                .zip(items)
                .map(|(component, item)| tokenize(&component.kind, item))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Token::Tuple(tokens))
        }
    }
}

fn invalid(param_type: &ParamType, value: &str) -> AbiError {
    AbiError::encoding(format!("invalid {} value '{}'", param_type, value))
}

fn parse_uint(value: &str) -> Option<U256> {
    match value.strip_prefix("0x") {
        Some(digits) if !digits.is_empty() => U256::from_str_radix(digits, 16).ok(),
        Some(_) => None,
        None if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) => {
            U256::from_dec_str(value).ok()
        }
        None => None,
    }
}

fn decode_hex(value: &str) -> Result<Vec<u8>, AbiError> {
    Ok(hex::decode(value.strip_prefix("0x").unwrap_or(value))?)
}

/// Remove surrounding quotes and resolve escapes; unquoted text is kept as is
fn unquote(value: &str) -> Result<String, AbiError> {
    let Some(inner) = value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) else {
        return Ok(value.to_string());
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            other => {
                return Err(AbiError::encoding(format!(
                    "unsupported escape '\\{}' in {}",
                    other.map(String::from).unwrap_or_default(),
                    value
                )))
            }
        }
    }
    Ok(out)
}

/// Items of `open item,item,... close`, split on commas outside quotes and
/// nested brackets
fn split_list(value: &str, open: char, close: char) -> Result<Vec<&str>, AbiError> {
    let inner = value
        .strip_prefix(open)
        .and_then(|v| v.strip_suffix(close))
        .ok_or_else(|| AbiError::encoding(format!("expected {}...{} but got '{}'", open, close, value)))?;
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' | '(' => depth += 1,
            ']' | ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| AbiError::encoding(format!("unbalanced brackets in '{}'", value)))?;
            }
            ',' if depth == 0 => {
                items.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if in_string || depth != 0 {
        return Err(AbiError::encoding(format!("unterminated value '{}'", value)));
    }
    items.push(inner[start..].trim());
    Ok(items)
}
