//! CLI configuration management

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::CliError;

/// CLI configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// JSON ABI files loaded by `decode-call` and `decode-log`
    #[serde(default)]
    pub abi_paths: Vec<PathBuf>,
    /// Output in JSON format by default
    #[serde(default)]
    pub json: bool,
    /// Default tracing filter
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            abi_paths: Vec::new(),
            json: false,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".bachledger"))
    }

    /// Get the default config file path
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("abi.toml"))
    }

    /// Load config from `path`, or the default when the file does not exist
    pub fn load_from(path: &Path) -> Result<Self, CliError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::Config(e.to_string()))
    }

    /// Save config to `path`
    pub fn save_to(&self, path: &Path) -> Result<(), CliError> {
        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| CliError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Register an ABI file, ignoring duplicates
    pub fn add_abi(&mut self, path: PathBuf) -> bool {
        if self.abi_paths.contains(&path) {
            return false;
        }
        self.abi_paths.push(path);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.abi_paths.is_empty());
        assert!(!config.json);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_config_deserialize_with_defaults() {
        let toml = r#"
            abi_paths = ["/tmp/erc20.json"]
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.abi_paths, vec![PathBuf::from("/tmp/erc20.json")]);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_config_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("abi.toml");

        let mut config = Config::default();
        assert!(config.add_abi(PathBuf::from("token.json")));
        assert!(!config.add_abi(PathBuf::from("token.json")));
        config.json = true;
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_config_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abi.toml");
        std::fs::write(&path, "abi_paths = 5").unwrap();
        assert!(matches!(Config::load_from(&path), Err(CliError::Config(_))));
    }
}
