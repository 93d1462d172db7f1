//! Contract interfaces: sets of functions and events
//!
//! An [`Interface`] is usually loaded from a JSON ABI and used to recognise
//! call data by selector and logs by event topic.

use std::io::Read;

use serde_json::Value;
use tracing::{debug, trace};

use crate::event::{DecodedLog, Event, RawLog};
use crate::function::{Function, StateMutability};
use crate::param::{named, Param};
use crate::param_type::ParamType;
use crate::token::Token;
use crate::AbiError;

/// Set of functions and events
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Interface {
    functions: Vec<Function>,
    events: Vec<Event>,
}

/// Call data matched against a known function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall {
    /// Matched function
    pub function: Function,
    /// Positional arguments
    pub args: Vec<Token>,
}

impl FunctionCall {
    /// Argument by parameter name
    pub fn get(&self, name: &str) -> Option<&Token> {
        self.function
            .inputs
            .iter()
            .position(|p| p.name == name)
            .and_then(|i| self.args.get(i))
    }

    /// Named arguments as `(name, value)` pairs
    pub fn named(&self) -> Vec<(&str, &Token)> {
        named(&self.function.inputs, &self.args)
    }
}

/// Result of decoding call data against an interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedCall {
    /// Selector matched a known function
    Known(FunctionCall),
    /// No function has this selector
    Unknown {
        /// The first 4 bytes of the call data, if present
        selector: Option<[u8; 4]>,
    },
}

impl Interface {
    /// Create an empty interface
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a function with builder pattern
    pub fn with_function(mut self, function: Function) -> Self {
        self.functions.push(function);
        self
    }

    /// Add an event with builder pattern
    pub fn with_event(mut self, event: Event) -> Self {
        self.events.push(event);
        self
    }

    /// Add a function definition
    pub fn add_function(&mut self, function: Function) {
        self.functions.push(function);
    }

    /// Add an event definition
    pub fn add_event(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Merge the definitions of another interface into this one
    pub fn extend(&mut self, other: Interface) {
        self.functions.extend(other.functions);
        self.events.extend(other.events);
    }

    /// Parse a JSON ABI (an array of entries).
    ///
    /// Entries without a `type` are functions. Constructors, errors,
    /// fallback and receive entries are skipped.
    pub fn from_json(json: &str) -> Result<Self, AbiError> {
        let entries: Vec<Value> = serde_json::from_str(json)?;
        Self::from_entries(entries)
    }

    /// Read a JSON ABI from a reader
    pub fn load<R: Read>(reader: R) -> Result<Self, AbiError> {
        let entries: Vec<Value> = serde_json::from_reader(reader)?;
        Self::from_entries(entries)
    }

    fn from_entries(entries: Vec<Value>) -> Result<Self, AbiError> {
        let mut interface = Self::new();
        for entry in entries {
            let kind = entry.get("type").and_then(Value::as_str).unwrap_or("function");
            match kind {
                "function" => interface.add_function(serde_json::from_value(entry)?),
                "event" => interface.add_event(serde_json::from_value(entry)?),
                other => trace!(kind = other, "skipping ABI entry"),
            }
        }
        debug!(
            functions = interface.functions.len(),
            events = interface.events.len(),
            "loaded interface"
        );
        Ok(interface)
    }

    /// All functions
    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    /// All events
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Get a function by name (first overload)
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Get an event by name
    pub fn event(&self, name: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.name == name)
    }

    /// Get a function by selector
    pub fn function_by_selector(&self, selector: [u8; 4]) -> Option<&Function> {
        self.functions.iter().find(|f| f.selector() == selector)
    }

    /// Encode a call to a function by name
    pub fn encode_call(&self, name: &str, args: &[Token]) -> Result<bytes::Bytes, AbiError> {
        let function = self
            .function(name)
            .ok_or_else(|| AbiError::encoding(format!("unknown function: {}", name)))?;
        function.encode_input(args)
    }

    /// Decode call data.
    ///
    /// An unmatched selector is not an error; malformed arguments for a
    /// matched function are.
    pub fn decode_call(&self, data: &[u8]) -> Result<DecodedCall, AbiError> {
        let Some(selector) = data.get(..4).and_then(|s| <[u8; 4]>::try_from(s).ok()) else {
            trace!(len = data.len(), "call data shorter than a selector");
            return Ok(DecodedCall::Unknown { selector: None });
        };

        match self.function_by_selector(selector) {
            Some(function) => Ok(DecodedCall::Known(FunctionCall {
                function: function.clone(),
                args: function.decode_input(data)?,
            })),
            None => {
                debug!(selector = %hex::encode(selector), "no function matches selector");
                Ok(DecodedCall::Unknown {
                    selector: Some(selector),
                })
            }
        }
    }

    /// Decode a log against the event whose topic matches topic 0.
    ///
    /// Returns `None` when no non-anonymous event matches.
    pub fn decode_log(&self, log: &RawLog) -> Result<Option<DecodedLog>, AbiError> {
        let Some(topic0) = log.topics.first() else {
            trace!("log without topics");
            return Ok(None);
        };
        match self
            .events
            .iter()
            .find(|e| !e.anonymous && e.topic() == *topic0)
        {
            Some(event) => event.parse_log(log).map(Some),
            None => {
                debug!(topic = %topic0, "no event matches topic");
                Ok(None)
            }
        }
    }

    /// Standard ERC-20 token interface
    pub fn erc20() -> Self {
        let address = ParamType::Address;
        let uint = ParamType::Uint(256);
        let p = |name: &str, ty: &ParamType| Param::new(name, ty);
        let view = |function: Function| Function {
            state_mutability: Some(StateMutability::View),
            ..function
        };
        let nonpayable = |function: Function| Function {
            state_mutability: Some(StateMutability::Nonpayable),
            ..function
        };

        Self::new()
            .with_function(view(Function::new("name", vec![], vec![p("", &ParamType::String)])))
            .with_function(view(Function::new("symbol", vec![], vec![p("", &ParamType::String)])))
            .with_function(view(Function::new("decimals", vec![], vec![p("", &ParamType::Uint(8))])))
            .with_function(view(Function::new("totalSupply", vec![], vec![p("", &uint)])))
            .with_function(view(Function::new(
                "balanceOf",
                vec![p("owner", &address)],
                vec![p("", &uint)],
            )))
            .with_function(nonpayable(Function::new(
                "transfer",
                vec![p("to", &address), p("value", &uint)],
                vec![p("", &ParamType::Bool)],
            )))
            .with_function(nonpayable(Function::new(
                "approve",
                vec![p("spender", &address), p("value", &uint)],
                vec![p("", &ParamType::Bool)],
            )))
            .with_function(view(Function::new(
                "allowance",
                vec![p("owner", &address), p("spender", &address)],
                vec![p("", &uint)],
            )))
            .with_function(nonpayable(Function::new(
                "transferFrom",
                vec![p("from", &address), p("to", &address), p("value", &uint)],
                vec![p("", &ParamType::Bool)],
            )))
            .with_event(Event::new(
                "Transfer",
                vec![p("from", &address).indexed(), p("to", &address).indexed(), p("value", &uint)],
                false,
            ))
            .with_event(Event::new(
                "Approval",
                vec![
                    p("owner", &address).indexed(),
                    p("spender", &address).indexed(),
                    p("value", &uint),
                ],
                false,
            ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bach_primitives::{Address, U256};

    #[test]
    fn test_erc20_selectors() {
        let erc20 = Interface::erc20();
        let selector = |name: &str| erc20.function(name).unwrap().selector_hex();

        assert_eq!(selector("transfer"), "0xa9059cbb");
        assert_eq!(selector("balanceOf"), "0x70a08231");
        assert_eq!(selector("approve"), "0x095ea7b3");
        assert_eq!(selector("allowance"), "0xdd62ed3e");
        assert_eq!(selector("transferFrom"), "0x23b872dd");
        assert_eq!(selector("totalSupply"), "0x18160ddd");
        assert_eq!(selector("decimals"), "0x313ce567");
    }

    #[test]
    fn test_encode_call() {
        let erc20 = Interface::erc20();
        let owner = Address::from_hex("0x1234567890123456789012345678901234567890").unwrap();

        let data = erc20.encode_call("balanceOf", &[Token::Address(owner)]).unwrap();
        assert_eq!(&data[..4], &[0x70, 0xa0, 0x82, 0x31]);
        assert_eq!(data.len(), 36);

        assert!(matches!(
            erc20.encode_call("mint", &[]),
            Err(AbiError::Encoding(_))
        ));
    }

    #[test]
    fn test_decode_call_known() {
        let erc20 = Interface::erc20();
        let to = Address::from_bytes([0x33; 20]);
        let data = erc20
            .encode_call("transfer", &[Token::Address(to), Token::uint(5u64)])
            .unwrap();

        match erc20.decode_call(&data).unwrap() {
            DecodedCall::Known(call) => {
                assert_eq!(call.function.name, "transfer");
                assert_eq!(call.args, vec![Token::Address(to), Token::uint(5u64)]);
                assert_eq!(call.get("value"), Some(&Token::Uint(U256::from(5u64))));
                assert_eq!(call.named()[0], ("to", &Token::Address(to)));
            }
            other => panic!("Expected known call, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_call_unknown() {
        let erc20 = Interface::erc20();
        assert_eq!(
            erc20.decode_call(&[0xde, 0xad, 0xbe, 0xef]).unwrap(),
            DecodedCall::Unknown {
                selector: Some([0xde, 0xad, 0xbe, 0xef])
            }
        );
        assert_eq!(
            erc20.decode_call(&[0x01]).unwrap(),
            DecodedCall::Unknown { selector: None }
        );
    }

    #[test]
    fn test_decode_call_malformed_arguments() {
        let erc20 = Interface::erc20();
        // transfer selector with a truncated argument list
        let data = [0xa9, 0x05, 0x9c, 0xbb, 0x00];
        assert!(matches!(erc20.decode_call(&data), Err(AbiError::Decoding(_))));
    }

    #[test]
    fn test_decode_log() {
        let erc20 = Interface::erc20();
        let approval = erc20.event("Approval").unwrap();
        let values = vec![
            Token::Address(Address::from_bytes([0x01; 20])),
            Token::Address(Address::from_bytes([0x02; 20])),
            Token::uint(99u64),
        ];
        let log = approval.encode_log(&values).unwrap();

        let decoded = erc20.decode_log(&log).unwrap().unwrap();
        assert_eq!(decoded.event, "Approval");
        assert_eq!(decoded.get("value"), Some(&Token::uint(99u64)));

        assert_eq!(erc20.decode_log(&RawLog::default()).unwrap(), None);
        let unrelated = RawLog::new(vec![bach_primitives::H256::ZERO], vec![]);
        assert_eq!(erc20.decode_log(&unrelated).unwrap(), None);
    }

    #[test]
    fn test_from_json_skips_other_entries() {
        let json = r#"[
            {"type": "constructor", "inputs": [{"name": "supply", "type": "uint256"}]},
            {"name": "ping", "inputs": [], "outputs": []},
            {"type": "error", "name": "Denied", "inputs": []},
            {"type": "event", "name": "Pinged", "inputs": [{"name": "who", "type": "address", "indexed": true}]},
            {"type": "fallback"}
        ]"#;
        let interface = Interface::from_json(json).unwrap();
        assert_eq!(interface.functions().len(), 1);
        assert_eq!(interface.events().len(), 1);
        assert_eq!(interface.function("ping").unwrap().signature(), "ping()");
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(matches!(Interface::from_json("{"), Err(AbiError::Parse(_))));
        assert!(matches!(
            Interface::from_json(r#"[{"type": "function"}]"#),
            Err(AbiError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_reader() {
        let json = br#"[{"type":"function","name":"get","inputs":[],"outputs":[{"name":"","type":"uint256"}]}]"#;
        let interface = Interface::load(&json[..]).unwrap();
        assert_eq!(interface.function("get").unwrap().selector_hex(), "0x6d4ce63c");
    }
}
