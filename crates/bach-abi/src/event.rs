//! Contract events and log decoding
//!
//! Indexed parameters live in topics (after the event topic unless the event
//! is anonymous), the rest are ABI-encoded together in the log data. Indexed
//! values that are not a single word (strings, bytes, arrays, tuples) are
//! stored as the Keccak-256 hash of their encoding, so only that hash can be
//! recovered from a log.

use bach_primitives::{keccak256, H256};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::decode::{decode, decode_single};
use crate::encode::{encode, encode_single};
use crate::param::{named, parse_params, split_signature, Param};
use crate::param_type::ParamType;
use crate::token::Token;
use crate::AbiError;

/// Event definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Event name
    pub name: String,
    /// Parameters in declaration order
    #[serde(default)]
    pub inputs: Vec<Param>,
    /// Anonymous events carry no event topic
    #[serde(default)]
    pub anonymous: bool,
}

/// Raw log entry as returned by a node
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawLog {
    /// Log topics
    pub topics: Vec<H256>,
    /// Log data
    pub data: Bytes,
}

impl RawLog {
    /// Create a raw log
    pub fn new(topics: Vec<H256>, data: impl Into<Bytes>) -> Self {
        Self {
            topics,
            data: data.into(),
        }
    }

    /// Build from hex-encoded topics and data (`0x` prefix optional)
    pub fn from_hex<S: AsRef<str>>(topics: &[S], data: &str) -> Result<Self, AbiError> {
        let topics = topics
            .iter()
            .map(|t| H256::from_hex(t.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let data = hex::decode(data.strip_prefix("0x").unwrap_or(data))?;
        Ok(Self::new(topics, data))
    }
}

/// One decoded log parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogParam {
    /// Parameter name, empty when unnamed
    pub name: String,
    /// Decoded value (topic hash for hashed indexed values)
    pub value: Token,
    /// Whether the value came from a topic
    pub indexed: bool,
}

/// Decoded log entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedLog {
    /// Event name
    pub event: String,
    /// Parameters in declaration order
    pub params: Vec<LogParam>,
}

impl DecodedLog {
    /// Values in declaration order
    pub fn tokens(&self) -> Vec<&Token> {
        self.params.iter().map(|p| &p.value).collect()
    }

    /// Value of a named parameter
    pub fn get(&self, name: &str) -> Option<&Token> {
        self.params.iter().find(|p| p.name == name).map(|p| &p.value)
    }

    /// Named parameters as `(name, value)` pairs
    pub fn named(&self) -> Vec<(&str, &Token)> {
        self.params
            .iter()
            .filter(|p| !p.name.is_empty())
            .map(|p| (p.name.as_str(), &p.value))
            .collect()
    }
}

impl Event {
    /// Create a new event definition
    pub fn new(name: impl Into<String>, inputs: Vec<Param>, anonymous: bool) -> Self {
        Self {
            name: name.into(),
            inputs,
            anonymous,
        }
    }

    /// Parse a declaration such as
    /// `Transfer(address indexed from, address indexed to, uint256 value)`,
    /// optionally followed by `anonymous`
    pub fn from_signature(declaration: &str) -> Result<Self, AbiError> {
        let (name, inputs, rest) = split_signature(declaration)?;
        let anonymous = match rest {
            "" => false,
            "anonymous" => true,
            _ => return Err(AbiError::parse(format!("unexpected '{}' after parameters", rest))),
        };
        Ok(Self::new(name, parse_params(inputs)?, anonymous))
    }

    /// Canonical signature (e.g., "Transfer(address,address,uint256)")
    pub fn signature(&self) -> String {
        let types: Vec<String> = self.inputs.iter().map(Param::canonical_type).collect();
        format!("{}({})", self.name, types.join(","))
    }

    /// Event topic: Keccak-256 of the canonical signature
    pub fn topic(&self) -> H256 {
        keccak256(self.signature().as_bytes())
    }

    fn max_indexed(&self) -> usize {
        if self.anonymous {
            4
        } else {
            3
        }
    }

    /// Decode a log emitted by this event
    pub fn parse_log(&self, log: &RawLog) -> Result<DecodedLog, AbiError> {
        let mut topics = log.topics.iter();
        if !self.anonymous {
            let expected = self.topic();
            match topics.next() {
                Some(topic) if *topic == expected => {}
                other => {
                    trace!(event = %self.name, ?other, "event topic mismatch");
                    return Err(AbiError::decoding(format!(
                        "log is not a {} event (topic 0 must be {})",
                        self.name, expected
                    )));
                }
            }
        }

        let indexed_count = self.inputs.iter().filter(|p| p.indexed).count();
        if topics.len() != indexed_count {
            return Err(AbiError::decoding(format!(
                "{} has {} indexed parameters but the log carries {} topics for them",
                self.name,
                indexed_count,
                topics.len()
            )));
        }

        let mut data_types = Vec::new();
        let mut values: Vec<Option<Token>> = Vec::with_capacity(self.inputs.len());
        for param in &self.inputs {
            let param_type = param.param_type()?;
            if param.indexed {
                let topic = topics
                    .next()
                    .ok_or_else(|| AbiError::decoding("missing topic"))?;
                values.push(Some(decode_topic(&param_type, topic)?));
            } else {
                data_types.push(param_type);
                values.push(None);
            }
        }

        let mut data_values = decode(&data_types, &log.data)?.into_iter();
        let params = self
            .inputs
            .iter()
            .zip(values)
            .map(|(param, value)| {
                let value = match value {
                    Some(value) => value,
                    None => data_values
                        .next()
                        .ok_or_else(|| AbiError::decoding("missing data value"))?,
                };
                Ok(LogParam {
                    name: param.name.clone(),
                    value,
                    indexed: param.indexed,
                })
            })
            .collect::<Result<Vec<_>, AbiError>>()?;

        Ok(DecodedLog {
            event: self.name.clone(),
            params,
        })
    }

    /// Build the log this event emits for `values` (declaration order)
    pub fn encode_log(&self, values: &[Token]) -> Result<RawLog, AbiError> {
        if values.len() != self.inputs.len() {
            return Err(AbiError::encoding(format!(
                "{} expects {} values, got {}",
                self.name,
                self.inputs.len(),
                values.len()
            )));
        }
        let indexed_count = self.inputs.iter().filter(|p| p.indexed).count();
        if indexed_count > self.max_indexed() {
            return Err(AbiError::encoding(format!(
                "{} has {} indexed parameters, at most {} are allowed",
                self.name,
                indexed_count,
                self.max_indexed()
            )));
        }

        let mut topics = Vec::with_capacity(indexed_count + 1);
        if !self.anonymous {
            topics.push(self.topic());
        }

        let mut data_types = Vec::new();
        let mut data_values = Vec::new();
        for (param, value) in self.inputs.iter().zip(values) {
            let param_type = param.param_type()?;
            if param.indexed {
                topics.push(encode_topic(&param_type, value)?);
            } else {
                data_types.push(param_type);
                data_values.push(value.clone());
            }
        }

        Ok(RawLog::new(topics, encode(&data_types, &data_values)?))
    }

    /// Named `(name, value)` pairs for values in declaration order
    pub fn named<'a>(&'a self, values: &'a [Token]) -> Vec<(&'a str, &'a Token)> {
        named(&self.inputs, values)
    }
}

/// Value of an indexed parameter from its topic
fn decode_topic(param_type: &ParamType, topic: &H256) -> Result<Token, AbiError> {
    if param_type.is_value_type() {
        decode_single(param_type, topic.as_bytes())
    } else {
        Ok(Token::FixedBytes(topic.as_bytes().to_vec()))
    }
}

/// Topic of an indexed parameter
fn encode_topic(param_type: &ParamType, value: &Token) -> Result<H256, AbiError> {
    if param_type.is_value_type() {
        let word = encode_single(param_type, value)?;
        return Ok(H256::from_slice(&word)?);
    }
    let mut preimage = Vec::new();
    topic_preimage(&mut preimage, param_type, value, false)?;
    Ok(keccak256(&preimage))
}

/// In-place encoding hashed into the topic of a non-value indexed parameter.
///
/// Bytes and strings are raw at the top level and padded to a word boundary
/// when nested. Arrays and tuples concatenate their elements without length
/// words or offsets.
fn topic_preimage(
    out: &mut Vec<u8>,
    param_type: &ParamType,
    value: &Token,
    nested: bool,
) -> Result<(), AbiError> {
    let raw = match (param_type, value) {
        (ParamType::Bytes, Token::Bytes(data)) => Some(data.as_slice()),
        (ParamType::String, Token::String(s)) => Some(s.as_bytes()),
        _ => None,
    };
    if let Some(raw) = raw {
        out.extend_from_slice(raw);
        if nested {
            out.resize(out.len() + (32 - raw.len() % 32) % 32, 0);
        }
        return Ok(());
    }

    match (param_type, value) {
        (ParamType::Array(inner), Token::Array(values) | Token::FixedArray(values)) => {
            for value in values {
                topic_preimage(out, inner, value, true)?;
            }
        }
        (ParamType::FixedArray(inner, len), Token::Array(values) | Token::FixedArray(values))
            if values.len() == *len =>
        {
            for value in values {
                topic_preimage(out, inner, value, true)?;
            }
        }
        (ParamType::Tuple(components), Token::Tuple(values)) if values.len() == components.len() => {
            for (component, value) in components.iter().zip(values) {
                topic_preimage(out, &component.kind, value, true)?;
            }
        }
        _ if param_type.is_value_type() => out.extend(encode_single(param_type, value)?),
        _ => {
            return Err(AbiError::encoding(format!(
                "cannot encode {} value as indexed {}",
                value.kind_name(),
                param_type
            )))
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature;
    use bach_primitives::{Address, U256};

    fn transfer() -> Event {
        Event::from_signature(
            "Transfer(address indexed from, address indexed to, uint256 value)",
        )
        .unwrap()
    }

    fn address_topic(addr: &Address) -> H256 {
        let mut word = [0u8; 32];
        word[12..].copy_from_slice(addr.as_bytes());
        H256::from_bytes(word)
    }

    // ==================== Signatures ====================

    #[test]
    fn test_event_signature_and_topic() {
        let event = transfer();
        assert_eq!(event.signature(), "Transfer(address,address,uint256)");
        assert_eq!(
            event.topic().to_hex(),
            "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
        let types: Vec<ParamType> = event.inputs.iter().map(|p| p.param_type().unwrap()).collect();
        assert_eq!(signature::event_topic("Transfer", &types), event.topic());
    }

    #[test]
    fn test_from_signature_anonymous() {
        let event = Event::from_signature("Ping(uint256 indexed id) anonymous").unwrap();
        assert!(event.anonymous);
        assert!(Event::from_signature("Ping(uint256) later").is_err());
    }

    // ==================== Log decoding ====================

    #[test]
    fn test_parse_transfer_log() {
        let from = Address::from_bytes([0x11; 20]);
        let to = Address::from_bytes([0x22; 20]);
        let mut data = [0u8; 32];
        U256::from(1000u64).to_big_endian(&mut data);

        let event = transfer();
        let log = RawLog::new(
            vec![event.topic(), address_topic(&from), address_topic(&to)],
            data.to_vec(),
        );
        let decoded = event.parse_log(&log).unwrap();

        assert_eq!(decoded.event, "Transfer");
        assert_eq!(
            decoded.tokens(),
            vec![&Token::Address(from), &Token::Address(to), &Token::uint(1000u64)]
        );
        assert_eq!(decoded.get("value"), Some(&Token::uint(1000u64)));
        assert!(decoded.params[0].indexed);
        assert!(!decoded.params[2].indexed);
        assert_eq!(decoded.named().len(), 3);
    }

    #[test]
    fn test_parse_log_wrong_topic() {
        let event = transfer();
        let log = RawLog::new(vec![H256::ZERO, H256::ZERO, H256::ZERO], vec![0u8; 32]);
        assert!(matches!(event.parse_log(&log), Err(AbiError::Decoding(_))));
        assert!(event.parse_log(&RawLog::default()).is_err());
    }

    #[test]
    fn test_parse_log_topic_count_mismatch() {
        let event = transfer();
        let log = RawLog::new(vec![event.topic(), H256::ZERO], vec![0u8; 32]);
        assert!(event.parse_log(&log).is_err());
    }

    #[test]
    fn test_interleaved_indexed_params() {
        let event = Event::from_signature(
            "Mixed(string note, uint8 indexed level, bytes payload, bool indexed flag)",
        )
        .unwrap();
        let values = vec![
            Token::string("hello"),
            Token::uint(7u64),
            Token::bytes(vec![1, 2, 3]),
            Token::Bool(true),
        ];
        let log = event.encode_log(&values).unwrap();
        assert_eq!(log.topics.len(), 3);

        let decoded = event.parse_log(&log).unwrap();
        let tokens: Vec<Token> = decoded.tokens().into_iter().cloned().collect();
        assert_eq!(tokens, values);
    }

    #[test]
    fn test_dynamic_indexed_values_are_hashed() {
        let event = Event::from_signature("Named(string indexed name, uint256[] indexed ids)").unwrap();
        let values = vec![
            Token::string("alice"),
            Token::Array(vec![Token::uint(1u64), Token::uint(2u64)]),
        ];
        let log = event.encode_log(&values).unwrap();

        assert_eq!(log.topics[1], keccak256(b"alice"));
        let mut ids = vec![0u8; 64];
        ids[31] = 1;
        ids[63] = 2;
        assert_eq!(log.topics[2], keccak256(&ids));

        let decoded = event.parse_log(&log).unwrap();
        assert_eq!(
            decoded.get("name"),
            Some(&Token::FixedBytes(keccak256(b"alice").as_bytes().to_vec()))
        );
    }

    #[test]
    fn test_nested_strings_padded_in_topic() {
        let event = Event::from_signature("Tags(string[] indexed tags)").unwrap();
        let log = event
            .encode_log(&[Token::Array(vec![Token::string("a"), Token::string("b")])])
            .unwrap();

        let mut preimage = vec![0u8; 64];
        preimage[0] = b'a';
        preimage[32] = b'b';
        assert_eq!(log.topics[1], keccak256(&preimage));
    }

    #[test]
    fn test_anonymous_event_uses_all_topics() {
        let event = Event::from_signature(
            "Anon(uint256 indexed a, uint256 indexed b, uint256 indexed c, uint256 indexed d) anonymous",
        )
        .unwrap();
        let values: Vec<Token> = (1u64..=4).map(|n| Token::uint(n)).collect();
        let log = event.encode_log(&values).unwrap();
        assert_eq!(log.topics.len(), 4);
        assert_eq!(log.topics[0], H256::from_uint(&U256::from(1u64)).unwrap());

        let decoded = event.parse_log(&log).unwrap();
        assert_eq!(decoded.get("d"), Some(&Token::uint(4u64)));
    }

    #[test]
    fn test_too_many_indexed() {
        let event = Event::from_signature(
            "Busy(uint8 indexed a, uint8 indexed b, uint8 indexed c, uint8 indexed d)",
        )
        .unwrap();
        let values: Vec<Token> = (1u64..=4).map(|n| Token::uint(n)).collect();
        assert!(matches!(event.encode_log(&values), Err(AbiError::Encoding(_))));
    }

    #[test]
    fn test_raw_log_from_hex() {
        let log = RawLog::from_hex(
            &["0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"],
            "0x00ff",
        )
        .unwrap();
        assert_eq!(log.topics[0], transfer().topic());
        assert_eq!(log.data.as_ref(), &[0x00, 0xff]);
        assert!(RawLog::from_hex(&["0x12"], "").is_err());
    }

    #[test]
    fn test_event_json() {
        let json = r#"{
            "type": "event",
            "name": "Approval",
            "anonymous": false,
            "inputs": [
                {"indexed": true, "name": "owner", "type": "address"},
                {"indexed": true, "name": "spender", "type": "address"},
                {"indexed": false, "name": "value", "type": "uint256"}
            ]
        }"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(
            event.topic().to_hex(),
            "0x8c5be1e5ebec7d5bd14f71427d1e84f3dd0314c0f7b2291e5b200ac8c7c3b925"
        );
    }
}
