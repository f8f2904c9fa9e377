//! Chain-specific types and error definitions.

use alloy::primitives::{Address, TxHash};
use alloy::rpc::types::TransactionReceipt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export ChainConfig from config module to avoid duplication
pub use crate::config::schema::ChainConfig;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Errors that can occur while talking to the chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OnChainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Return data could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Transaction was not confirmed within the receipt timeout.
    #[error("Transaction {0} not confirmed in time")]
    ConfirmationTimeout(TxHash),

    /// Transaction was reverted on-chain.
    #[error("Transaction reverted: {0}")]
    Reverted(TxHash),

    /// Invalid private key or signer mismatch.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    /// No resolver contract is deployed on the requested chain.
    #[error("No resolver deployment for chain {0}")]
    UnknownDeployment(u64),

    /// Capability not configured (e.g. writes without a signer).
    #[error("Blockchain not available: {0}")]
    NotAvailable(String),
}

/// Result type for chain operations.
pub type OnChainResult<T> = Result<T, OnChainError>;

/// Confirmation record of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub transaction_hash: TxHash,
    pub block_number: Option<u64>,
    pub from: Address,
    pub to: Option<Address>,
    pub gas_used: u64,
    /// `true` when execution succeeded.
    pub status: bool,
}

impl From<&TransactionReceipt> for Receipt {
    fn from(receipt: &TransactionReceipt) -> Self {
        Self {
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            from: receipt.from,
            to: receipt.to,
            gas_used: receipt.gas_used,
            status: receipt.status(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_id_conversion() {
        let chain_id = ChainId::from(10u64);
        assert_eq!(chain_id.0, 10);
        assert_eq!(u64::from(chain_id), 10);
    }

    #[test]
    fn test_default_config() {
        let config = ChainConfig::default();
        assert_eq!(config.rpc_timeout_secs, 10);
        assert_eq!(config.receipt_timeout_secs, 30);
        assert_eq!(config.confirmation_blocks, 1);
    }

    #[test]
    fn test_error_display() {
        let err = OnChainError::Timeout(10);
        assert_eq!(err.to_string(), "RPC timeout after 10 seconds");

        let err = OnChainError::ChainMismatch {
            expected: 10,
            actual: 1,
        };
        assert!(err.to_string().contains("expected 10"));
    }
}
