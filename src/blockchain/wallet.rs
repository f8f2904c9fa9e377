//! The operator account that signs `setSchema` writes.
//!
//! The key comes from the environment only and never appears in logs,
//! `Debug` output or serialized config.

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use std::fmt;

use crate::blockchain::types::{OnChainError, OnChainResult};

/// Environment variable holding the hex-encoded signer key.
pub const PRIVATE_KEY_ENV_VAR: &str = "ACCESS_SIGNER_PRIVATE_KEY";

/// Signer bound to the chain its writes are meant for.
#[derive(Clone)]
pub struct Wallet {
    signer: PrivateKeySigner,
    chain_id: u64,
}

impl Wallet {
    /// Parse a hex key, with or without `0x`.
    pub fn from_private_key(key: &str, chain_id: u64) -> OnChainResult<Self> {
        let signer = key
            .trim()
            .trim_start_matches("0x")
            .parse::<PrivateKeySigner>()
            .map_err(|e| OnChainError::Wallet(format!("Invalid private key format: {}", e)))?;

        let wallet = Self { signer, chain_id };
        tracing::info!(address = %wallet.address(), chain_id, "Signer loaded");
        Ok(wallet)
    }

    /// Load the signer from `ACCESS_SIGNER_PRIVATE_KEY`.
    pub fn from_env(chain_id: u64) -> OnChainResult<Self> {
        match std::env::var(PRIVATE_KEY_ENV_VAR) {
            Ok(key) => Self::from_private_key(&key, chain_id),
            Err(_) => Err(OnChainError::Wallet(format!(
                "{} is not set; it is required for resolver writes",
                PRIVATE_KEY_ENV_VAR
            ))),
        }
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Fail unless this signer was loaded for `chain_id`.
    pub fn ensure_chain(&self, chain_id: u64) -> OnChainResult<()> {
        if self.chain_id == chain_id {
            Ok(())
        } else {
            Err(OnChainError::ChainMismatch {
                expected: chain_id,
                actual: self.chain_id,
            })
        }
    }

    /// Wallet filler input for a signing provider.
    pub fn ethereum_wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.clone())
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address())
            .field("chain_id", &self.chain_id)
            .finish_non_exhaustive()
    }
}
