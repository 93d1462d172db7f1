//! Subcommand implementations

pub mod codec;
pub mod inspect;
pub mod signature;

use std::path::PathBuf;

use bach_abi::{parse_params, tokenize, Interface, Param, ParamType, Token};

use crate::{config::Config, CliError};

/// Parameters from a comma-separated list such as `uint256 amount,(bool,string)[]`
fn parse_type_list(list: &str) -> Result<(Vec<Param>, Vec<ParamType>), CliError> {
    let params = parse_params(list)?;
    let types = params
        .iter()
        .map(Param::param_type)
        .collect::<Result<Vec<_>, _>>()?;
    Ok((params, types))
}

/// Tokenize one command-line value per type
fn tokenize_values(types: &[ParamType], values: &[String]) -> Result<Vec<Token>, CliError> {
    if types.len() != values.len() {
        return Err(CliError::InvalidInput(format!(
            "expected {} values but got {}",
            types.len(),
            values.len()
        )));
    }
    types
        .iter()
        .zip(values)
        .map(|(ty, value)| tokenize(ty, value).map_err(CliError::from))
        .collect()
}

/// Bytes from a hex string, with or without `0x`
fn parse_hex(s: &str) -> Result<Vec<u8>, CliError> {
    let s = s.trim();
    let s = s.strip_prefix("0x").unwrap_or(s);
    Ok(hex::decode(s)?)
}

/// Interface built from the given ABI files plus the configured ones.
///
/// With no files at all the ERC-20 interface is used.
fn load_interface(extra: &[PathBuf], config: &Config) -> Result<Interface, CliError> {
    let paths: Vec<&PathBuf> = extra.iter().chain(&config.abi_paths).collect();
    if paths.is_empty() {
        tracing::debug!("No ABI files given, using ERC-20");
        return Ok(Interface::erc20());
    }

    let mut interface = Interface::new();
    for path in paths {
        let file = std::fs::File::open(path)
            .map_err(|e| CliError::Config(format!("cannot open ABI {}: {}", path.display(), e)))?;
        let loaded = Interface::load(file)?;
        tracing::debug!(
            path = %path.display(),
            functions = loaded.functions().len(),
            events = loaded.events().len(),
            "Loaded ABI"
        );
        interface.extend(loaded);
    }
    Ok(interface)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_type_list() {
        let (params, types) = parse_type_list("uint256 amount, (bool,string)[]").unwrap();
        assert_eq!(params[0].name, "amount");
        assert_eq!(types.len(), 2);
        assert_eq!(types[1].to_string(), "(bool,string)[]");
    }

    #[test]
    fn test_tokenize_values_arity() {
        let (_, types) = parse_type_list("uint8,bool").unwrap();
        assert!(tokenize_values(&types, &["1".to_string()]).is_err());
        let tokens = tokenize_values(&types, &["1".to_string(), "true".to_string()]).unwrap();
        assert_eq!(tokens, vec![Token::uint(1u64), Token::Bool(true)]);
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("0xcafe").unwrap(), vec![0xca, 0xfe]);
        assert_eq!(parse_hex("cafe").unwrap(), vec![0xca, 0xfe]);
        assert!(matches!(parse_hex("0xzz"), Err(CliError::InvalidHex(_))));
    }

    #[test]
    fn test_load_interface_defaults_to_erc20() {
        let interface = load_interface(&[], &Config::default()).unwrap();
        assert!(interface.function("transfer").is_some());
    }

    #[test]
    fn test_load_interface_missing_file() {
        let missing = vec![PathBuf::from("/nonexistent/abi.json")];
        assert!(matches!(
            load_interface(&missing, &Config::default()),
            Err(CliError::Config(_))
        ));
    }
}
