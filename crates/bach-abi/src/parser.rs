//! Type string parser
//!
//! Grammar: `base[subtype]([dim])*` for elementary types and
//! `"(" type ("," type)* ")" ([dim])*` for tuples. Tuple components may carry
//! a field name after the type (`(address to,uint256 amount)`).

use crate::param_type::{ParamType, TupleParam};
use crate::AbiError;

/// Parse a type string (e.g., "uint256[2][]", "(string,uint8)")
pub fn parse(type_str: &str) -> Result<ParamType, AbiError> {
    let s = type_str.trim();
    if s.is_empty() {
        return Err(AbiError::parse("empty type string"));
    }

    let (base, dims) = if s.starts_with('(') {
        let close = matching_paren(s)?;
        (&s[..=close], &s[close + 1..])
    } else {
        let end = s.find('[').unwrap_or(s.len());
        (&s[..end], &s[end..])
    };

    let ty = if base.starts_with('(') {
        parse_tuple(base)?
    } else {
        parse_elementary(base)?
    };
    with_dimensions(ty, dims)
}

/// Wrap `ty` in the array levels of a suffix such as `[2][]`
pub(crate) fn with_dimensions(mut ty: ParamType, dims: &str) -> Result<ParamType, AbiError> {
    // The rightmost suffix is the outermost array level
    for dim in parse_dimensions(dims)? {
        ty = match dim {
            // A zero-length marker is read the same as `[]`
            None | Some(0) => ParamType::Array(Box::new(ty)),
            Some(len) => ParamType::FixedArray(Box::new(ty), len),
        };
    }
    if ty.size_overflows() {
        return Err(AbiError::parse(format!("{} is too large to encode", ty)));
    }
    Ok(ty)
}

/// Parse a list of type strings
pub fn parse_all<S: AsRef<str>>(type_strs: &[S]) -> Result<Vec<ParamType>, AbiError> {
    type_strs.iter().map(|s| parse(s.as_ref())).collect()
}

/// Split `s` on separator characters that are not nested inside `()` or `[]`
pub(crate) fn split_top_level(
    s: &str,
    is_separator: impl Fn(char) -> bool,
) -> Result<Vec<&str>, AbiError> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| AbiError::parse(format!("unbalanced brackets in '{}'", s)))?;
            }
            c if depth == 0 && is_separator(c) => {
                parts.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(AbiError::parse(format!("unbalanced brackets in '{}'", s)));
    }
    parts.push(&s[start..]);
    Ok(parts)
}

/// Whether `s` can be used as a field name
pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Byte index of the parenthesis closing the one at index 0
fn matching_paren(s: &str) -> Result<usize, AbiError> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(i);
                }
            }
            _ => {}
        }
    }
    Err(AbiError::parse(format!("unbalanced parentheses in '{}'", s)))
}

fn parse_tuple(base: &str) -> Result<ParamType, AbiError> {
    let inner = &base[1..base.len() - 1];
    if inner.trim().is_empty() {
        return Err(AbiError::parse("tuple must have at least one component"));
    }

    let components = split_top_level(inner, |c| c == ',')?
        .into_iter()
        .map(parse_component)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ParamType::Tuple(components))
}

fn parse_component(component: &str) -> Result<TupleParam, AbiError> {
    let component = component.trim();
    if component.is_empty() {
        return Err(AbiError::parse("empty tuple component"));
    }

    let words: Vec<&str> = split_top_level(component, char::is_whitespace)?
        .into_iter()
        .filter(|w| !w.is_empty())
        .collect();
    match words.as_slice() {
        [ty] => Ok(TupleParam::new(parse(ty)?)),
        [ty, name] if is_identifier(name) => Ok(TupleParam::named(*name, parse(ty)?)),
        _ => Err(AbiError::parse(format!("invalid tuple component '{}'", component))),
    }
}

fn parse_elementary(base: &str) -> Result<ParamType, AbiError> {
    let split = base
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(base.len());
    let (kind, sub) = base.split_at(split);

    match kind {
        "address" | "bool" | "string" => {
            if !sub.is_empty() {
                return Err(AbiError::parse(format!("'{}' takes no suffix, got '{}'", kind, base)));
            }
            Ok(match kind {
                "address" => ParamType::Address,
                "bool" => ParamType::Bool,
                _ => ParamType::String,
            })
        }
        "bytes" => {
            if sub.is_empty() {
                return Ok(ParamType::Bytes);
            }
            let size = parse_number(sub, base)?;
            if !(1..=32).contains(&size) {
                return Err(AbiError::parse(format!("bytes size must be 1-32, got '{}'", base)));
            }
            Ok(ParamType::FixedBytes(size))
        }
        "hash" => {
            if sub.is_empty() {
                return Err(AbiError::parse("hash requires a size suffix"));
            }
            let size = parse_number(sub, base)?;
            if !(1..=32).contains(&size) {
                return Err(AbiError::parse(format!("hash size must be 1-32, got '{}'", base)));
            }
            Ok(ParamType::Hash(size))
        }
        "uint" | "int" => {
            let bits = if sub.is_empty() {
                256
            } else {
                parse_number(sub, base)?
            };
            if bits % 8 != 0 || !(8..=256).contains(&bits) {
                return Err(AbiError::parse(format!(
                    "integer width must be a multiple of 8 in 8-256, got '{}'",
                    base
                )));
            }
            Ok(if kind == "uint" {
                ParamType::Uint(bits)
            } else {
                ParamType::Int(bits)
            })
        }
        "fixed" | "ufixed" => {
            let (high, low) = sub.split_once('x').ok_or_else(|| {
                AbiError::parse(format!("'{}' requires a <high>x<low> suffix", kind))
            })?;
            let high = parse_number(high, base)?;
            let low = parse_number(low, base)?;
            let total = high.checked_add(low).unwrap_or(usize::MAX);
            if high % 8 != 0 || low % 8 != 0 || !(8..=256).contains(&total) {
                return Err(AbiError::parse(format!(
                    "fixed-point widths must be multiples of 8 totalling 8-256, got '{}'",
                    base
                )));
            }
            Ok(if kind == "fixed" {
                ParamType::Fixed(high, low)
            } else {
                ParamType::UFixed(high, low)
            })
        }
        "tuple" => Err(AbiError::parse("tuple type requires a component list")),
        "" => Err(AbiError::parse(format!("missing base type in '{}'", base))),
        _ => Err(AbiError::parse(format!("unknown base type '{}'", kind))),
    }
}

fn parse_number(digits: &str, context: &str) -> Result<usize, AbiError> {
    let valid = !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && !(digits.len() > 1 && digits.starts_with('0'));
    if !valid {
        return Err(AbiError::parse(format!("invalid numeric suffix in '{}'", context)));
    }
    digits
        .parse()
        .map_err(|_| AbiError::parse(format!("numeric suffix too large in '{}'", context)))
}

/// Dimensions in textual order; `None` stands for `[]`
fn parse_dimensions(mut dims: &str) -> Result<Vec<Option<usize>>, AbiError> {
    let mut result = Vec::new();
    while !dims.is_empty() {
        let rest = dims
            .strip_prefix('[')
            .ok_or_else(|| AbiError::parse(format!("unexpected characters '{}'", dims)))?;
        let close = rest
            .find(']')
            .ok_or_else(|| AbiError::parse(format!("unterminated array dimension '{}'", dims)))?;
        let inner = &rest[..close];
        if inner.is_empty() {
            result.push(None);
        } else if inner.bytes().all(|b| b.is_ascii_digit()) {
            let len = inner
                .parse()
                .map_err(|_| AbiError::parse(format!("array dimension too large '{}'", inner)))?;
            result.push(Some(len));
        } else {
            return Err(AbiError::parse(format!("invalid array dimension '[{}]'", inner)));
        }
        dims = &rest[close + 1..];
    }
    Ok(result)
}
