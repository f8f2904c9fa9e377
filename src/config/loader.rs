//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::AccessConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AccessConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AccessConfig, ConfigError> {
    let config: AccessConfig = toml::from_str(content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [chain]
        rpc_url = "http://localhost:8545"
        chain_id = 31337

        [index]
        villager_schema = "0x00000000000000000000000000000000000000000000000000000000000000aa"

        [roles]
        root = "0x0000000000000000000000000000000000000000000000000000000000000001"
        manager = "0x0000000000000000000000000000000000000000000000000000000000000002"
        villager = "0x0000000000000000000000000000000000000000000000000000000000000003"

        [[deployments]]
        chain_id = 31337
        address = "0x5FbDB2315678afecb367f032d93F642f64180aa3"
    "#;

    #[test]
    fn test_parse_valid_config() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(config.chain.chain_id, 31337);
        assert_eq!(config.deployments.len(), 1);
    }

    #[test]
    fn test_validation_errors_are_joined() {
        let err = parse_config("[chain]\nchain_id = 5\n").unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Validation failed: "));
        assert!(message.contains("no resolver deployment configured for chain 5"));
        assert!(message.contains("role id 'root' is not set"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/access.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
