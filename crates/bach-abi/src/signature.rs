//! Canonical signatures, function selectors and event topics

use bach_primitives::{keccak256, H256};

use crate::param_type::ParamType;

/// Canonical signature: `name(type1,type2,...)`
pub fn signature(name: &str, types: &[ParamType]) -> String {
    let types: Vec<String> = types.iter().map(|t| t.to_string()).collect();
    format!("{}({})", name, types.join(","))
}

/// First 4 bytes of the Keccak-256 hash of a canonical signature
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&hash.as_bytes()[..4]);
    selector
}

/// Selector as a `0x`-prefixed hex string
pub fn selector_hex(signature: &str) -> String {
    format!("0x{}", hex::encode(selector(signature)))
}

/// Function selector from a name and parameter types
pub fn function_selector(name: &str, types: &[ParamType]) -> [u8; 4] {
    selector(&signature(name, types))
}

/// Event topic (full Keccak-256 hash of the canonical signature)
pub fn event_topic(name: &str, types: &[ParamType]) -> H256 {
    keccak256(signature(name, types).as_bytes())
}
