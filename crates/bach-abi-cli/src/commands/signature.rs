//! Selector and topic commands

use bach_abi::{Event, Function};
use clap::Args;

use crate::{CliError, Output};

/// Argument of `selector` and `topic`
#[derive(Debug, Args)]
pub struct SignatureArgs {
    /// Declaration such as "transfer(address to, uint256 amount)"
    signature: String,
}

impl SignatureArgs {
    /// Print the 4-byte function selector
    pub fn selector(self, json: bool) -> Result<(), CliError> {
        let function = Function::from_signature(&self.signature)?;
        let canonical = function.signature();
        let selector = function.selector_hex();

        Output::new(json)
            .field("signature", &canonical)
            .field("selector", &selector)
            .message(&format!("{}  {}", selector, canonical))
            .print();
        Ok(())
    }

    /// Print the event topic hash
    pub fn topic(self, json: bool) -> Result<(), CliError> {
        let event = Event::from_signature(&self.signature)?;
        let canonical = event.signature();
        let topic = event.topic().to_hex();

        Output::new(json)
            .field("signature", &canonical)
            .field("topic", &topic)
            .field_bool("anonymous", event.anonymous)
            .message(&format!("{}  {}", topic, canonical))
            .print();
        Ok(())
    }
}
