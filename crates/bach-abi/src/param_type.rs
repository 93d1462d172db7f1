//! ABI type model

use std::fmt;

/// Solidity parameter types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    /// Address
    Address,
    /// Boolean
    Bool,
    /// Unsigned integer with bit size (8, 16, ..., 256)
    Uint(usize),
    /// Signed integer with bit size
    Int(usize),
    /// Signed fixed-point number with integer bits and fractional bits
    Fixed(usize, usize),
    /// Unsigned fixed-point number with integer bits and fractional bits
    UFixed(usize, usize),
    /// Fixed-size bytes (size 1-32), left-aligned in the word
    FixedBytes(usize),
    /// Dynamic bytes
    Bytes,
    /// UTF-8 string
    String,
    /// Hash of N bytes (1-32), right-aligned in the word
    Hash(usize),
    /// Dynamic array
    Array(Box<ParamType>),
    /// Fixed-size array
    FixedArray(Box<ParamType>, usize),
    /// Tuple
    Tuple(Vec<TupleParam>),
}

/// One tuple component, optionally named.
///
/// The name is metadata only: two components are equal when their types are.
#[derive(Debug, Clone, Eq)]
pub struct TupleParam {
    /// Field name, if known
    pub name: Option<String>,
    /// Field type
    pub kind: ParamType,
}

impl TupleParam {
    /// Unnamed component
    pub fn new(kind: ParamType) -> Self {
        Self { name: None, kind }
    }

    /// Named component
    pub fn named(name: impl Into<String>, kind: ParamType) -> Self {
        Self {
            name: Some(name.into()),
            kind,
        }
    }
}

impl PartialEq for TupleParam {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl From<ParamType> for TupleParam {
    fn from(kind: ParamType) -> Self {
        TupleParam::new(kind)
    }
}

impl ParamType {
    /// Tuple of unnamed components
    pub fn tuple(kinds: impl IntoIterator<Item = ParamType>) -> Self {
        ParamType::Tuple(kinds.into_iter().map(TupleParam::new).collect())
    }

    /// Check if this type is dynamic (variable length)
    pub fn is_dynamic(&self) -> bool {
        match self {
            ParamType::Bytes | ParamType::String | ParamType::Array(_) => true,
            ParamType::FixedArray(inner, _) => inner.is_dynamic(),
            ParamType::Tuple(components) => components.iter().any(|c| c.kind.is_dynamic()),
            _ => false,
        }
    }

    /// Encoded size in bytes, or `None` for dynamic types and for static
    /// types too large to address (see [`ParamType::size_overflows`])
    pub fn static_size(&self) -> Option<usize> {
        match self {
            ParamType::Bytes | ParamType::String | ParamType::Array(_) => None,
            ParamType::FixedArray(inner, len) => inner.static_size()?.checked_mul(*len),
            ParamType::Tuple(components) => components
                .iter()
                .try_fold(0usize, |total, c| total.checked_add(c.kind.static_size()?)),
            _ => Some(32),
        }
    }

    /// Whether this type, or any type nested in it, has an encoded size or
    /// head that does not fit in `usize`
    pub fn size_overflows(&self) -> bool {
        match self {
            ParamType::Array(inner) => inner.size_overflows(),
            ParamType::FixedArray(inner, _) => {
                inner.size_overflows() || (!inner.is_dynamic() && self.static_size().is_none())
            }
            ParamType::Tuple(components) => {
                components.iter().any(|c| c.kind.size_overflows())
                    || components
                        .iter()
                        .try_fold(0usize, |total, c| total.checked_add(c.kind.head_size()))
                        .is_none()
            }
            _ => false,
        }
    }

    /// Bytes this type occupies in the head of an enclosing container
    pub fn head_size(&self) -> usize {
        self.static_size().unwrap_or(32)
    }

    /// Array sizes from outermost to innermost; `0` marks a dynamic level
    pub fn dimensions(&self) -> Vec<usize> {
        let mut dims = Vec::new();
        let mut current = self;
        loop {
            match current {
                ParamType::Array(inner) => {
                    dims.push(0);
                    current = inner;
                }
                ParamType::FixedArray(inner, len) => {
                    dims.push(*len);
                    current = inner;
                }
                _ => return dims,
            }
        }
    }

    /// Element type of an array, `None` for non-arrays
    pub fn nested(&self) -> Option<&ParamType> {
        match self {
            ParamType::Array(inner) | ParamType::FixedArray(inner, _) => Some(inner),
            _ => None,
        }
    }

    /// Whether this type occupies exactly one word and is not a composite
    pub fn is_value_type(&self) -> bool {
        !matches!(
            self,
            ParamType::Bytes
                | ParamType::String
                | ParamType::Array(_)
                | ParamType::FixedArray(..)
                | ParamType::Tuple(_)
        )
    }
}

impl fmt::Display for ParamType {
    /// Canonical type string, as used in signatures
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Address => f.write_str("address"),
            ParamType::Bool => f.write_str("bool"),
            ParamType::Uint(bits) => write!(f, "uint{}", bits),
            ParamType::Int(bits) => write!(f, "int{}", bits),
            ParamType::Fixed(high, low) => write!(f, "fixed{}x{}", high, low),
            ParamType::UFixed(high, low) => write!(f, "ufixed{}x{}", high, low),
            ParamType::FixedBytes(size) => write!(f, "bytes{}", size),
            ParamType::Bytes => f.write_str("bytes"),
            ParamType::String => f.write_str("string"),
            ParamType::Hash(size) => write!(f, "hash{}", size),
            ParamType::Array(inner) => write!(f, "{}[]", inner),
            ParamType::FixedArray(inner, len) => write!(f, "{}[{}]", inner, len),
            ParamType::Tuple(components) => {
                f.write_str("(")?;
                for (i, component) in components.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", component.kind)?;
                }
                f.write_str(")")
            }
        }
    }
}
