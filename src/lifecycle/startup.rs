//! Startup wiring.
//!
//! Builds the chain, index and identity clients from a validated
//! configuration and assembles the resolver, orchestrator and coordinator on
//! top of them. Subsystems initialize in dependency order; any error is fatal.

use alloy::primitives::B256;
use std::sync::Arc;
use thiserror::Error;

use crate::access::{AttestationRoleResolver, CheckInPolicy};
use crate::attestation::{AttestationIndex, HttpAttestationIndex};
use crate::blockchain::{
    Action, ChainClient, ContractWriteOrchestrator, OnChainError, OnChainResult, ResolverContract,
    RpcChainClient, Wallet,
};
use crate::config::{AccessConfig, ChainConfig};
use crate::identity::{EnsIdentityResolver, IdentityResolver, NoIdentity};
use crate::session::{NotificationSink, WalletSessionCoordinator};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("chain client: {0}")]
    Chain(#[from] OnChainError),

    #[error("attestation index client: {0}")]
    Index(#[from] reqwest::Error),
}

/// Initialized clients shared by every entry point.
#[derive(Clone)]
pub struct Services {
    pub config: AccessConfig,
    pub resolver_contract: ResolverContract,
    pub index: Arc<dyn AttestationIndex>,
    pub identity: Arc<dyn IdentityResolver>,
}

impl Services {
    /// Connect to the configured chain and build every client.
    ///
    /// The main RPC endpoint must report `chain.chain_id`; a mismatch is
    /// fatal, so neither reads nor writes can reach the wrong chain.
    /// `wallet` enables resolver writes.
    pub async fn connect(config: AccessConfig, wallet: Option<&Wallet>) -> Result<Self, StartupError> {
        let rpc = match wallet {
            Some(wallet) => RpcChainClient::with_wallet(config.chain.clone(), wallet)?,
            None => RpcChainClient::new(config.chain.clone())?,
        };
        rpc.verify_chain_id().await?;
        let chain: Arc<dyn ChainClient> = Arc::new(rpc);
        let resolver_contract =
            ResolverContract::for_chain(chain, &config.deployments, config.chain.chain_id)?;

        let index: Arc<dyn AttestationIndex> = Arc::new(HttpAttestationIndex::new(&config.index)?);

        let identity: Arc<dyn IdentityResolver> = if config.identity.enabled {
            let ens_chain = RpcChainClient::new(ChainConfig {
                rpc_url: config.identity.rpc_url.clone(),
                chain_id: config.identity.chain_id,
                rpc_timeout_secs: config.identity.rpc_timeout_secs,
                ..ChainConfig::default()
            })?;
            Arc::new(EnsIdentityResolver::new(Arc::new(ens_chain), config.identity.ens_registry))
        } else {
            Arc::new(NoIdentity)
        };

        tracing::info!(
            chain_id = config.chain.chain_id,
            resolver = %resolver_contract.address(),
            index = %config.index.endpoint,
            identity = config.identity.enabled,
            "Services initialized"
        );

        Ok(Self {
            config,
            resolver_contract,
            index,
            identity,
        })
    }

    /// Action granted on schema `uid` to `role_id`, or to the villager role
    /// when no role is given.
    pub async fn schema_action(&self, uid: B256, role_id: Option<B256>) -> OnChainResult<Action> {
        let role_id = role_id.unwrap_or(self.config.roles.villager);
        self.resolver_contract.schema_action(uid, role_id).await
    }

    pub fn role_resolver(&self) -> AttestationRoleResolver {
        AttestationRoleResolver::new(
            self.resolver_contract.clone(),
            self.index.clone(),
            self.config.roles,
            self.config.index.villager_schema,
            CheckInPolicy::new(self.config.policy.check_in_threshold),
        )
    }

    pub fn write_orchestrator(&self) -> ContractWriteOrchestrator {
        ContractWriteOrchestrator::new(self.resolver_contract.clone())
    }

    pub fn session_coordinator(&self, notifier: Arc<dyn NotificationSink>) -> WalletSessionCoordinator {
        WalletSessionCoordinator::new(self.role_resolver(), self.identity.clone(), notifier)
    }
}
