//! Contract functions

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::decode::decode;
use crate::encode::encode_function_call;
use crate::param::{parse_params, split_signature, Param};
use crate::param_type::ParamType;
use crate::signature;
use crate::token::Token;
use crate::AbiError;

/// Function state mutability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    /// Reads no state
    Pure,
    /// Reads but does not modify state
    View,
    /// Modifies state, rejects ether
    Nonpayable,
    /// Modifies state, accepts ether
    Payable,
}

/// Function definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Function {
    /// Function name
    pub name: String,
    /// Input parameters
    #[serde(default)]
    pub inputs: Vec<Param>,
    /// Output parameters
    #[serde(default)]
    pub outputs: Vec<Param>,
    /// State mutability, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_mutability: Option<StateMutability>,
}

impl Function {
    /// Create a new function definition
    pub fn new(name: impl Into<String>, inputs: Vec<Param>, outputs: Vec<Param>) -> Self {
        Self {
            name: name.into(),
            inputs,
            outputs,
            state_mutability: None,
        }
    }

    /// Parse a declaration such as
    /// `transfer(address to, uint256 amount) returns (bool)`
    pub fn from_signature(declaration: &str) -> Result<Self, AbiError> {
        let (name, inputs, rest) = split_signature(declaration)?;
        let outputs = if rest.is_empty() {
            Vec::new()
        } else {
            let list = rest
                .strip_prefix("returns")
                .map(str::trim)
                .and_then(|r| r.strip_prefix('('))
                .and_then(|r| r.strip_suffix(')'))
                .ok_or_else(|| AbiError::parse(format!("unexpected '{}' after parameters", rest)))?;
            parse_params(list)?
        };
        Ok(Self::new(name, parse_params(inputs)?, outputs))
    }

    /// Input parameter types
    pub fn input_types(&self) -> Result<Vec<ParamType>, AbiError> {
        self.inputs.iter().map(Param::param_type).collect()
    }

    /// Output parameter types
    pub fn output_types(&self) -> Result<Vec<ParamType>, AbiError> {
        self.outputs.iter().map(Param::param_type).collect()
    }

    /// Canonical signature (e.g., "transfer(address,uint256)")
    pub fn signature(&self) -> String {
        let types: Vec<String> = self.inputs.iter().map(Param::canonical_type).collect();
        format!("{}({})", self.name, types.join(","))
    }

    /// 4-byte selector
    pub fn selector(&self) -> [u8; 4] {
        signature::selector(&self.signature())
    }

    /// Selector as a `0x`-prefixed hex string
    pub fn selector_hex(&self) -> String {
        format!("0x{}", hex::encode(self.selector()))
    }

    /// Call data: selector followed by the encoded arguments
    pub fn encode_input(&self, args: &[Token]) -> Result<Bytes, AbiError> {
        let data = encode_function_call(self.selector(), &self.input_types()?, args)?;
        Ok(Bytes::from(data))
    }

    /// Decode call data (selector included) into positional arguments
    pub fn decode_input(&self, data: &[u8]) -> Result<Vec<Token>, AbiError> {
        if data.len() < 4 || data[..4] != self.selector() {
            return Err(AbiError::decoding(format!(
                "call data does not start with the selector of {}",
                self.signature()
            )));
        }
        decode(&self.input_types()?, &data[4..])
    }

    /// Decode return data
    pub fn decode_output(&self, data: &[u8]) -> Result<Vec<Token>, AbiError> {
        decode(&self.output_types()?, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bach_primitives::Address;

    fn transfer() -> Function {
        Function::from_signature("transfer(address to, uint256 amount) returns (bool)").unwrap()
    }

    #[test]
    fn test_from_signature() {
        let function = transfer();
        assert_eq!(function.name, "transfer");
        assert_eq!(function.inputs.len(), 2);
        assert_eq!(function.inputs[1].name, "amount");
        assert_eq!(function.outputs[0].kind, "bool");
        assert_eq!(function.signature(), "transfer(address,uint256)");
        assert_eq!(function.selector_hex(), "0xa9059cbb");
    }

    #[test]
    fn test_from_signature_invalid() {
        assert!(Function::from_signature("transfer(address)garbage").is_err());
        assert!(Function::from_signature("transfer(address) returns bool").is_err());
        assert!(Function::from_signature("transfer(addr)").is_err());
    }

    #[test]
    fn test_encode_decode_input() {
        let function = transfer();
        let to = Address::from_bytes([0x42; 20]);
        let args = vec![Token::Address(to), Token::uint(1000u64)];

        let data = function.encode_input(&args).unwrap();
        assert_eq!(data.len(), 68);
        assert_eq!(&data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(function.decode_input(&data).unwrap(), args);
    }

    #[test]
    fn test_decode_input_wrong_selector() {
        let function = transfer();
        let mut data = function.encode_input(&[Token::Address(Address::ZERO), Token::uint(1u64)]).unwrap().to_vec();
        data[0] ^= 0xff;
        assert!(matches!(function.decode_input(&data), Err(AbiError::Decoding(_))));
        assert!(function.decode_input(&[0xa9]).is_err());
    }

    #[test]
    fn test_decode_output() {
        let function = transfer();
        let mut data = [0u8; 32];
        data[31] = 1;
        assert_eq!(function.decode_output(&data).unwrap(), vec![Token::Bool(true)]);
    }

    #[test]
    fn test_function_json() {
        let json = r#"{
            "type": "function",
            "name": "balanceOf",
            "inputs": [{"name": "owner", "type": "address", "internalType": "address"}],
            "outputs": [{"name": "", "type": "uint256"}],
            "stateMutability": "view"
        }"#;
        let function: Function = serde_json::from_str(json).unwrap();
        assert_eq!(function.state_mutability, Some(StateMutability::View));
        assert_eq!(function.selector_hex(), "0x70a08231");
    }
}
