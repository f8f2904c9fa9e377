//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the access
//! service. All types derive Serde traits for deserialization from config files.

use alloy::primitives::{Address, B256};
use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AccessConfig {
    /// Chain hosting the resolver contract.
    pub chain: ChainConfig,

    /// Reverse name lookups for display names.
    pub identity: IdentityConfig,

    /// Attestation index endpoint and schema.
    pub index: IndexConfig,

    /// Role identifiers recognised by the resolver contract.
    pub roles: RoleIds,

    /// Resolver contract deployments, one per chain.
    pub deployments: Vec<ResolverDeployment>,

    /// Check-in rules.
    pub policy: PolicyConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Chain RPC configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    pub failover_urls: Vec<String>,

    /// Chain ID (e.g., 10 for Optimism, 31337 for local Anvil).
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Number of block confirmations required before a receipt counts.
    pub confirmation_blocks: u32,

    /// Upper bound on waiting for a transaction receipt, in seconds.
    pub receipt_timeout_secs: u64,

    /// Receipt polling interval in milliseconds.
    pub receipt_poll_interval_ms: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            failover_urls: Vec::new(),
            chain_id: 10,
            rpc_timeout_secs: 10,
            confirmation_blocks: 1,
            receipt_timeout_secs: 30,
            receipt_poll_interval_ms: 2000,
        }
    }
}

/// ENS reverse-resolution configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Enable display-name lookups.
    pub enabled: bool,

    /// JSON-RPC endpoint of the chain carrying the ENS registry.
    pub rpc_url: String,

    /// Chain ID of the ENS chain.
    pub chain_id: u64,

    /// Lookup timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// ENS registry contract address.
    pub ens_registry: Address,
}

/// Canonical ENS registry, identical on mainnet and testnets.
pub const ENS_REGISTRY: Address = alloy::primitives::address!("00000000000C2E074eC69A0dFb2997BA6C7d2e1e");

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            rpc_url: "https://eth.llamarpc.com".to_string(),
            chain_id: 1,
            rpc_timeout_secs: 10,
            ens_registry: ENS_REGISTRY,
        }
    }
}

/// Attestation index configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IndexConfig {
    /// GraphQL endpoint of the attestation indexer.
    pub endpoint: String,

    /// Query timeout in seconds.
    pub timeout_secs: u64,

    /// Schema UID of the villager check-in attestation.
    pub villager_schema: B256,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://optimism.easscan.org/graphql".to_string(),
            timeout_secs: 30,
            villager_schema: B256::ZERO,
        }
    }
}

/// Role identifiers as stored by the resolver contract.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct RoleIds {
    pub root: B256,
    pub manager: B256,
    pub villager: B256,
}

/// A resolver contract deployed on one chain.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ResolverDeployment {
    pub chain_id: u64,
    pub address: Address,
}

/// Check-in policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Attestations required before a villager counts as fully checked in.
    /// Privileged roles are credited with exactly this many.
    pub check_in_threshold: u64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self { check_in_threshold: 2 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
