//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::MarketConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<MarketConfig, ConfigError> {
    let config: MarketConfig = toml::from_str(content).map_err(ConfigError::Parse)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<MarketConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file() {
        let result = load_config(Path::new("does-not-exist.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_parse_error() {
        let result = parse_config("[chain\nrpc_url = 1");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_validation_error_message() {
        let err = parse_config("[chain]\npoll_interval_ms = 0\n").unwrap_err();
        assert!(err.to_string().contains("chain.poll_interval_ms must be greater than zero"));
    }

    #[test]
    fn test_empty_file_is_default() {
        let config = parse_config("").unwrap();
        assert_eq!(config.chain.chain_id, 31337);
    }
}
