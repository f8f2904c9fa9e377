//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (configured chain has a resolver deployment)
//! - Validate value ranges (timeouts > 0, threshold >= 1)
//! - Reject role ids that cannot be told apart
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AccessConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use alloy::primitives::B256;
use thiserror::Error;

use crate::config::schema::AccessConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid URL '{value}'")]
    InvalidUrl { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    #[error("no resolver deployment configured for chain {0}")]
    MissingDeployment(u64),

    #[error("chain {0} has more than one resolver deployment")]
    DuplicateDeployment(u64),

    #[error("role id '{0}' is not set")]
    MissingRole(&'static str),

    #[error("role ids '{0}' and '{1}' are identical")]
    DuplicateRole(&'static str, &'static str),

    #[error("index.villager_schema is not set")]
    MissingSchema,
}

/// Validate a parsed configuration, collecting every error found.
pub fn validate_config(config: &AccessConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_url(&mut errors, "chain.rpc_url", &config.chain.rpc_url);
    for url in &config.chain.failover_urls {
        check_url(&mut errors, "chain.failover_urls", url);
    }
    check_url(&mut errors, "index.endpoint", &config.index.endpoint);
    if config.identity.enabled {
        check_url(&mut errors, "identity.rpc_url", &config.identity.rpc_url);
        if config.identity.rpc_timeout_secs == 0 {
            errors.push(ValidationError::ZeroValue("identity.rpc_timeout_secs"));
        }
    }

    for (field, value) in [
        ("chain.rpc_timeout_secs", config.chain.rpc_timeout_secs),
        ("chain.receipt_timeout_secs", config.chain.receipt_timeout_secs),
        ("chain.receipt_poll_interval_ms", config.chain.receipt_poll_interval_ms),
        ("index.timeout_secs", config.index.timeout_secs),
        ("policy.check_in_threshold", config.policy.check_in_threshold),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroValue(field));
        }
    }

    let chain_id = config.chain.chain_id;
    match config.deployments.iter().filter(|d| d.chain_id == chain_id).count() {
        0 => errors.push(ValidationError::MissingDeployment(chain_id)),
        1 => {}
        _ => errors.push(ValidationError::DuplicateDeployment(chain_id)),
    }

    let roles = [
        ("root", config.roles.root),
        ("manager", config.roles.manager),
        ("villager", config.roles.villager),
    ];
    for (name, id) in roles {
        if id == B256::ZERO {
            errors.push(ValidationError::MissingRole(name));
        }
    }
    for (i, (a, a_id)) in roles.iter().enumerate() {
        for (b, b_id) in &roles[i + 1..] {
            if *a_id != B256::ZERO && a_id == b_id {
                errors.push(ValidationError::DuplicateRole(*a, *b));
            }
        }
    }

    if config.index.villager_schema == B256::ZERO {
        errors.push(ValidationError::MissingSchema);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if url::Url::parse(value).is_err() {
        errors.push(ValidationError::InvalidUrl {
            field,
            value: value.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::ResolverDeployment;
    use alloy::primitives::{address, b256};

    fn valid_config() -> AccessConfig {
        let mut config = AccessConfig::default();
        config.chain.chain_id = 31337;
        config.deployments.push(ResolverDeployment {
            chain_id: 31337,
            address: address!("5FbDB2315678afecb367f032d93F642f64180aa3"),
        });
        config.roles.root = b256!("0000000000000000000000000000000000000000000000000000000000000001");
        config.roles.manager = b256!("0000000000000000000000000000000000000000000000000000000000000002");
        config.roles.villager = b256!("0000000000000000000000000000000000000000000000000000000000000003");
        config.index.villager_schema =
            b256!("00000000000000000000000000000000000000000000000000000000000000aa");
        config
    }

    #[test]
    fn test_valid_config_passes() {
        assert_eq!(validate_config(&valid_config()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = valid_config();
        config.chain.rpc_url = "not a url".into();
        config.index.timeout_secs = 0;
        config.deployments.clear();
        config.index.villager_schema = B256::ZERO;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::MissingDeployment(31337)));
        assert!(errors.contains(&ValidationError::ZeroValue("index.timeout_secs")));
        assert!(errors.contains(&ValidationError::MissingSchema));
    }

    #[test]
    fn test_duplicate_roles_rejected() {
        let mut config = valid_config();
        config.roles.manager = config.roles.root;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::DuplicateRole("root", "manager")]);
    }

    #[test]
    fn test_identity_url_checked_only_when_enabled() {
        let mut config = valid_config();
        config.identity.rpc_url = "::".into();
        assert!(validate_config(&config).is_ok());

        config.identity.enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
