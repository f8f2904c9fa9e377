//! Role-mutation transactions against the resolver contract.
//!
//! # Responsibilities
//! - Encode `setSchema` calldata
//! - Estimate gas before anything is signed
//! - Submit through the connected signer
//! - Wait for the receipt and fold every step into one outcome

use alloy::primitives::{Address, B256, U256};
use thiserror::Error;

use crate::blockchain::resolver::{Action, ResolverContract};
use crate::blockchain::types::{OnChainError, Receipt};
use crate::observability::metrics;

/// Why a role mutation did not land.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WriteFailure {
    #[error("gas estimation failed: {0}")]
    Estimation(OnChainError),

    #[error("transaction submission failed: {0}")]
    Submission(OnChainError),

    #[error("transaction confirmation failed: {0}")]
    Confirmation(OnChainError),
}

/// Final state of a submitted role mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionOutcome {
    Confirmed(Receipt),
    Failed(WriteFailure),
}

impl TransactionOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, TransactionOutcome::Confirmed(_))
    }

    pub fn receipt(&self) -> Option<&Receipt> {
        match self {
            TransactionOutcome::Confirmed(receipt) => Some(receipt),
            TransactionOutcome::Failed(_) => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            TransactionOutcome::Confirmed(_) => "confirmed",
            TransactionOutcome::Failed(WriteFailure::Estimation(_)) => "estimation_failed",
            TransactionOutcome::Failed(WriteFailure::Submission(_)) => "submission_failed",
            TransactionOutcome::Failed(WriteFailure::Confirmation(_)) => "confirmation_failed",
        }
    }
}

/// Builds, submits and confirms resolver writes.
///
/// Holds no mutable state, so concurrent calls from different signers do not
/// interfere.
#[derive(Debug, Clone)]
pub struct ContractWriteOrchestrator {
    resolver: ResolverContract,
}

impl ContractWriteOrchestrator {
    pub fn new(resolver: ResolverContract) -> Self {
        Self { resolver }
    }

    /// Resolver contract every write targets.
    pub fn resolver_address(&self) -> Address {
        self.resolver.address()
    }

    /// Set the action granted to `role_id` holders on schema `uid`.
    ///
    /// Never retries: a failed estimate or submission is reported and the
    /// caller decides what to change before trying again.
    pub async fn submit_role_mutation(
        &self,
        from: Address,
        uid: B256,
        role_id: B256,
        action: Action,
        value: U256,
    ) -> TransactionOutcome {
        let outcome = self.run(from, uid, role_id, action, value).await;
        metrics::record_write(outcome.label());
        outcome
    }

    async fn run(
        &self,
        from: Address,
        uid: B256,
        role_id: B256,
        action: Action,
        value: U256,
    ) -> TransactionOutcome {
        let chain = self.resolver.chain();
        let to = self.resolver.address();
        let data = ResolverContract::encode_set_schema(uid, role_id, action);

        let gas_limit = match chain.estimate_gas(from, to, data.clone(), value).await {
            Ok(gas) => gas,
            Err(e) => {
                tracing::warn!(from = %from, action = %action, error = %e, "Gas estimation failed");
                return TransactionOutcome::Failed(WriteFailure::Estimation(e));
            }
        };

        let hash = match chain.send_transaction(from, to, data, value, gas_limit).await {
            Ok(hash) => hash,
            Err(e) => {
                tracing::warn!(from = %from, action = %action, error = %e, "Transaction submission failed");
                return TransactionOutcome::Failed(WriteFailure::Submission(e));
            }
        };

        match chain.wait_for_receipt(hash).await {
            Ok(receipt) => {
                tracing::info!(
                    tx_hash = %hash,
                    block = ?receipt.block_number,
                    action = %action,
                    "Role mutation confirmed"
                );
                TransactionOutcome::Confirmed(receipt)
            }
            Err(e) => {
                tracing::warn!(tx_hash = %hash, error = %e, "Role mutation not confirmed");
                TransactionOutcome::Failed(WriteFailure::Confirmation(e))
            }
        }
    }
}
