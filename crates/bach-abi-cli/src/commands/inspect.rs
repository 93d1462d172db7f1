//! Call data and log inspection against known interfaces

use std::path::PathBuf;

use bach_abi::{DecodedCall, RawLog};
use clap::Args;
use serde_json::Value;

use super::{load_interface, parse_hex};
use crate::output::{named_json, token_json};
use crate::{config::Config, CliError, Output};

/// Arguments of `decode-call`
#[derive(Debug, Args)]
pub struct DecodeCallArgs {
    /// JSON ABI file (repeatable)
    #[arg(long = "abi")]
    abis: Vec<PathBuf>,
    /// Hex-encoded call data, selector first
    data: String,
}

/// Arguments of `decode-log`
#[derive(Debug, Args)]
pub struct DecodeLogArgs {
    /// JSON ABI file (repeatable)
    #[arg(long = "abi")]
    abis: Vec<PathBuf>,
    /// Log topic, topic0 first (repeatable)
    #[arg(long = "topic")]
    topics: Vec<String>,
    /// Hex-encoded log data
    #[arg(long, default_value = "0x")]
    data: String,
}

impl DecodeCallArgs {
    /// Match the selector and decode the arguments
    pub fn execute(self, config: &Config, json: bool) -> Result<(), CliError> {
        let interface = load_interface(&self.abis, config)?;
        let data = parse_hex(&self.data)?;

        match interface.decode_call(&data)? {
            DecodedCall::Known(call) => {
                let signature = call.function.signature();
                let named = call.named();
                let lines: Vec<String> = named
                    .iter()
                    .map(|(name, token)| format!("  {}: {}", name, token))
                    .collect();

                Output::new(json)
                    .field_bool("known", true)
                    .field("function", &call.function.name)
                    .field("signature", &signature)
                    .field_value("args", named_json(named.iter().copied()))
                    .message(&format!("{}\n{}", signature, lines.join("\n")))
                    .print();
            }
            DecodedCall::Unknown { selector } => {
                let selector = selector
                    .map(|s| format!("0x{}", hex::encode(s)))
                    .unwrap_or_default();
                tracing::debug!(%selector, "No function matches selector");

                Output::new(json)
                    .field_bool("known", false)
                    .field("selector", &selector)
                    .message(&format!("Unknown function selector {}", selector))
                    .print();
            }
        }
        Ok(())
    }
}

impl DecodeLogArgs {
    /// Match topic0 and decode indexed and data parameters
    pub fn execute(self, config: &Config, json: bool) -> Result<(), CliError> {
        if self.topics.is_empty() {
            return Err(CliError::InvalidInput("at least one --topic is required".to_string()));
        }
        let interface = load_interface(&self.abis, config)?;
        let log = RawLog::from_hex(self.topics.as_slice(), &self.data)?;

        let Some(decoded) = interface.decode_log(&log)? else {
            Output::new(json)
                .field_bool("known", false)
                .field("topic0", &log.topics[0].to_hex())
                .message(&format!("Unknown event topic {}", log.topics[0].to_hex()))
                .print();
            return Ok(());
        };

        let params: Vec<Value> = decoded
            .params
            .iter()
            .map(|p| {
                serde_json::json!({
                    "name": p.name,
                    "value": token_json(&p.value),
                    "indexed": p.indexed,
                })
            })
            .collect();
        let lines: Vec<String> = decoded
            .params
            .iter()
            .map(|p| {
                let marker = if p.indexed { " (indexed)" } else { "" };
                format!("  {}{}: {}", p.name, marker, p.value)
            })
            .collect();

        Output::new(json)
            .field_bool("known", true)
            .field("event", &decoded.event)
            .field_value("params", Value::Array(params))
            .message(&format!("{}\n{}", decoded.event, lines.join("\n")))
            .print();
        Ok(())
    }
}
