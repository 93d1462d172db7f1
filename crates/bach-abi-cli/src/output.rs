//! Output formatting

use bach_abi::Token;
use serde_json::{json, Value};
use std::collections::HashMap;

/// Output builder for formatted CLI output
pub struct Output {
    json_mode: bool,
    fields: HashMap<String, Value>,
    message: Option<String>,
}

impl Output {
    /// Create a new output builder
    pub fn new(json_mode: bool) -> Self {
        Self {
            json_mode,
            fields: HashMap::new(),
            message: None,
        }
    }

    /// Add a string field to the output
    pub fn field(mut self, key: &str, value: &str) -> Self {
        self.fields.insert(key.to_string(), Value::String(value.to_string()));
        self
    }

    /// Add a boolean field to the output
    pub fn field_bool(mut self, key: &str, value: bool) -> Self {
        self.fields.insert(key.to_string(), Value::Bool(value));
        self
    }

    /// Add a JSON value field to the output
    pub fn field_value(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    /// Set the human-readable message
    pub fn message(mut self, msg: &str) -> Self {
        self.message = Some(msg.to_string());
        self
    }

    /// Print the output
    pub fn print(self) {
        if self.json_mode {
            let json = json!(self.fields);
            println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
        } else if let Some(msg) = self.message {
            println!("{}", msg);
        }
    }
}

/// JSON rendering of a decoded value.
///
/// Integers and fixed-point numbers are strings so 256-bit values survive
/// JSON readers that use doubles.
pub fn token_json(token: &Token) -> Value {
    match token {
        Token::Bool(b) => Value::Bool(*b),
        Token::String(s) => Value::String(s.clone()),
        Token::Array(tokens) | Token::FixedArray(tokens) | Token::Tuple(tokens) => {
            Value::Array(tokens.iter().map(token_json).collect())
        }
        other => Value::String(other.to_string()),
    }
}

/// JSON object of `name -> value`, with unnamed entries keyed by position
pub fn named_json<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a Token)>) -> Value {
    let object = pairs
        .into_iter()
        .enumerate()
        .map(|(i, (name, token))| {
            let key = if name.is_empty() { i.to_string() } else { name.to_string() };
            (key, token_json(token))
        })
        .collect::<serde_json::Map<_, _>>();
    Value::Object(object)
}
