//! Encoding and decoding commands

use bach_abi::{decode, encode, encode_packed_types, Param, Token};
use clap::Args;
use serde_json::Value;

use super::{parse_hex, parse_type_list, tokenize_values};
use crate::output::{named_json, token_json};
use crate::{Output, CliError};

/// Arguments of `encode` and `encode-packed`
#[derive(Debug, Args)]
pub struct EncodeArgs {
    /// Comma-separated types, e.g. "address,uint256[]"
    types: String,
    /// One value per type, e.g. 0x... or [1,2,3]
    #[arg(allow_hyphen_values = true)]
    values: Vec<String>,
}

/// Arguments of `decode`
#[derive(Debug, Args)]
pub struct DecodeArgs {
    /// Comma-separated types, optionally named: "uint256 amount,string memo"
    types: String,
    /// Hex-encoded data
    data: String,
}

impl EncodeArgs {
    /// Standard head/tail encoding
    pub fn encode(self, json: bool) -> Result<(), CliError> {
        let (_, types) = parse_type_list(&self.types)?;
        let tokens = tokenize_values(&types, &self.values)?;
        let encoded = encode(&types, &tokens)?;
        tracing::debug!(types = %self.types, len = encoded.len(), "Encoded values");
        print_encoded(&encoded, json);
        Ok(())
    }

    /// Packed (non-standard) encoding
    pub fn encode_packed(self, json: bool) -> Result<(), CliError> {
        let (_, types) = parse_type_list(&self.types)?;
        let tokens = tokenize_values(&types, &self.values)?;
        let encoded = encode_packed_types(&types, &tokens)?;
        tracing::debug!(types = %self.types, len = encoded.len(), "Packed values");
        print_encoded(&encoded, json);
        Ok(())
    }
}

impl DecodeArgs {
    /// Decode data as the given types
    pub fn execute(self, json: bool) -> Result<(), CliError> {
        let (params, types) = parse_type_list(&self.types)?;
        let data = parse_hex(&self.data)?;
        let tokens = decode(&types, &data)?;

        Output::new(json)
            .field_value("values", Value::Array(tokens.iter().map(token_json).collect()))
            .field_value("named", named_json(pairs(&params, &tokens)))
            .message(&describe(&params, &tokens))
            .print();
        Ok(())
    }
}

fn print_encoded(encoded: &[u8], json: bool) {
    let hex = format!("0x{}", hex::encode(encoded));
    Output::new(json)
        .field("encoded", &hex)
        .field_value("length", Value::from(encoded.len()))
        .message(&hex)
        .print();
}

fn pairs<'a>(params: &'a [Param], tokens: &'a [Token]) -> impl Iterator<Item = (&'a str, &'a Token)> {
    params.iter().map(|p| p.name.as_str()).zip(tokens)
}

/// One line per value, prefixed by its name when it has one
pub(crate) fn describe(params: &[Param], tokens: &[Token]) -> String {
    pairs(params, tokens)
        .map(|(name, token)| {
            if name.is_empty() {
                token.to_string()
            } else {
                format!("{}: {}", name, token)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
