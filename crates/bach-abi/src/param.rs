//! Named parameters of functions and events
//!
//! [`Param`] mirrors one entry of a JSON ABI `inputs`/`outputs` list. It can
//! also be built from human-readable declarations such as
//! `address indexed from`.

use serde::{Deserialize, Serialize};

use crate::param_type::{ParamType, TupleParam};
use crate::parser::{self, is_identifier, split_top_level, with_dimensions};
use crate::AbiError;

/// A named function or event parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    /// Parameter name, empty when unnamed
    #[serde(default)]
    pub name: String,
    /// Type as written in the ABI (`tuple[]`, `uint256`, ...)
    #[serde(rename = "type")]
    pub kind: String,
    /// Tuple components
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Param>,
    /// Whether an event parameter is stored in a topic
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub indexed: bool,
    /// Source-level type (e.g. `struct Order`), informational only
    #[serde(rename = "internalType", default, skip_serializing_if = "Option::is_none")]
    pub internal_type: Option<String>,
}

impl Param {
    /// Parameter of a parsed type; tuple component names are kept
    pub fn new(name: impl Into<String>, param_type: &ParamType) -> Self {
        let mut base = param_type;
        while let Some(inner) = base.nested() {
            base = inner;
        }

        let (kind, components) = match base {
            ParamType::Tuple(fields) => {
                // Display renders the base first, then the array suffixes
                let rendered = param_type.to_string();
                let suffix = &rendered[base.to_string().len()..];
                let components = fields
                    .iter()
                    .map(|f| Param::new(f.name.clone().unwrap_or_default(), &f.kind))
                    .collect();
                (format!("tuple{}", suffix), components)
            }
            _ => (param_type.to_string(), Vec::new()),
        };

        Self {
            name: name.into(),
            kind,
            components,
            indexed: false,
            internal_type: None,
        }
    }

    /// Mark as indexed (builder style)
    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }

    /// Type string used in canonical signatures.
    ///
    /// `tuple` becomes `(c1,c2,...)` and `enum` becomes `uint8`; array
    /// suffixes are kept.
    pub fn canonical_type(&self) -> String {
        if let Some(suffix) = self.kind.strip_prefix("tuple") {
            let components: Vec<String> = self.components.iter().map(|c| c.canonical_type()).collect();
            format!("({}){}", components.join(","), suffix)
        } else if let Some(rest) = self.kind.strip_prefix("enum") {
            let suffix = rest.find('[').map(|i| &rest[i..]).unwrap_or("");
            format!("uint8{}", suffix)
        } else {
            self.kind.clone()
        }
    }

    /// Parsed type, with tuple component names attached
    pub fn param_type(&self) -> Result<ParamType, AbiError> {
        let Some(suffix) = self.kind.strip_prefix("tuple") else {
            return parser::parse(&self.canonical_type());
        };
        if self.components.is_empty() {
            return Err(AbiError::parse(format!(
                "tuple parameter '{}' has no components",
                self.name
            )));
        }

        let components = self
            .components
            .iter()
            .map(|c| {
                Ok(TupleParam {
                    name: (!c.name.is_empty()).then(|| c.name.clone()),
                    kind: c.param_type()?,
                })
            })
            .collect::<Result<Vec<_>, AbiError>>()?;
        with_dimensions(ParamType::Tuple(components), suffix)
    }
}

/// Parse a human-readable parameter list such as
/// `address indexed from, (uint256 a, bool b)[] items, uint256`
pub fn parse_params(list: &str) -> Result<Vec<Param>, AbiError> {
    if list.trim().is_empty() {
        return Ok(Vec::new());
    }
    split_top_level(list, |c| c == ',')?
        .into_iter()
        .map(parse_param)
        .collect()
}

fn parse_param(decl: &str) -> Result<Param, AbiError> {
    let words: Vec<&str> = split_top_level(decl.trim(), char::is_whitespace)?
        .into_iter()
        .filter(|w| !w.is_empty())
        .collect();

    let (ty, indexed, name) = match words.as_slice() {
        [ty] => (*ty, false, ""),
        [ty, "indexed"] => (*ty, true, ""),
        [ty, "indexed", name] => (*ty, true, *name),
        [ty, name] => (*ty, false, *name),
        _ => return Err(AbiError::parse(format!("invalid parameter '{}'", decl.trim()))),
    };
    if !name.is_empty() && !is_identifier(name) {
        return Err(AbiError::parse(format!("invalid parameter name '{}'", name)));
    }

    let mut param = Param::new(name, &parser::parse(ty)?);
    param.indexed = indexed;
    Ok(param)
}

/// Split `name(params) rest` into its three parts
pub(crate) fn split_signature(signature: &str) -> Result<(&str, &str, &str), AbiError> {
    let signature = signature.trim();
    let open = signature
        .find('(')
        .ok_or_else(|| AbiError::parse(format!("missing '(' in signature '{}'", signature)))?;
    let name = signature[..open].trim();
    if !is_identifier(name) {
        return Err(AbiError::parse(format!("invalid name in signature '{}'", signature)));
    }

    let mut depth = 0usize;
    for (i, c) in signature[open..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    let close = open + i;
                    return Ok((name, &signature[open + 1..close], signature[close + 1..].trim()));
                }
            }
            _ => {}
        }
    }
    Err(AbiError::parse(format!("unbalanced parentheses in signature '{}'", signature)))
}

/// Names of `params` paired with `tokens`, skipping unnamed entries
pub(crate) fn named<'a, T>(params: &'a [Param], values: &'a [T]) -> Vec<(&'a str, &'a T)> {
    params
        .iter()
        .zip(values)
        .filter(|(p, _)| !p.name.is_empty())
        .map(|(p, v)| (p.name.as_str(), v))
        .collect()
}
