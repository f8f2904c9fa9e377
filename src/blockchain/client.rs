//! Blockchain RPC client with timeout and failover handling.
//!
//! # Responsibilities
//! - Define the `ChainClient` seam used by resolution and write paths
//! - Read contract state, estimate gas, submit signed transactions
//! - Poll for receipts until the configured confirmation depth
//! - Bound every call by the configured timeout

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::transports::TransportResult;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, timeout};

use crate::blockchain::types::{ChainConfig, ChainId, OnChainError, OnChainResult, Receipt};
use crate::blockchain::wallet::Wallet;
use crate::observability::metrics;

/// Read/write access to a chain and the connected signer.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Execute a read-only call and return the raw return data.
    async fn read_contract(&self, to: Address, data: Bytes) -> OnChainResult<Bytes>;

    /// Estimate the gas needed for `from` to execute the call.
    async fn estimate_gas(
        &self,
        from: Address,
        to: Address,
        data: Bytes,
        value: U256,
    ) -> OnChainResult<u64>;

    /// Sign and broadcast a transaction, returning its hash.
    async fn send_transaction(
        &self,
        from: Address,
        to: Address,
        data: Bytes,
        value: U256,
        gas_limit: u64,
    ) -> OnChainResult<TxHash>;

    /// Block until the transaction is mined and confirmed.
    ///
    /// A reverted transaction is an error.
    async fn wait_for_receipt(&self, hash: TxHash) -> OnChainResult<Receipt>;
}

type DynProvider = Arc<dyn Provider + Send + Sync>;

/// JSON-RPC implementation of [`ChainClient`] with failover support.
#[derive(Clone)]
pub struct RpcChainClient {
    /// List of read providers (primary + failovers).
    providers: Vec<DynProvider>,
    /// Provider with a wallet filler, present when a signer is configured.
    signer: Option<(Address, DynProvider)>,
    config: ChainConfig,
    timeout_duration: Duration,
}

impl RpcChainClient {
    /// Create a read-only client.
    pub fn new(config: ChainConfig) -> OnChainResult<Self> {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);
        let mut providers = Vec::new();

        let primary_url = parse_url(&config.rpc_url)?;
        providers.push(Arc::new(ProviderBuilder::new().connect_http(primary_url)) as DynProvider);

        for url_str in &config.failover_urls {
            if let Ok(url) = url_str.parse() {
                providers.push(Arc::new(ProviderBuilder::new().connect_http(url)) as DynProvider);
            } else {
                tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL");
            }
        }

        tracing::info!(
            rpc_url = %config.rpc_url,
            chain_id = config.chain_id,
            failovers = providers.len() - 1,
            "Chain client initialized"
        );

        Ok(Self {
            providers,
            signer: None,
            config,
            timeout_duration,
        })
    }

    /// Create a client that can also submit transactions signed by `wallet`.
    pub fn with_wallet(config: ChainConfig, wallet: &Wallet) -> OnChainResult<Self> {
        wallet.ensure_chain(config.chain_id)?;
        let url = parse_url(&config.rpc_url)?;
        let signing = ProviderBuilder::new()
            .wallet(wallet.ethereum_wallet())
            .connect_http(url);

        let mut client = Self::new(config)?;
        client.signer = Some((wallet.address(), Arc::new(signing) as DynProvider));
        Ok(client)
    }

    #[cfg(test)]
    fn with_provider(config: ChainConfig, provider: DynProvider) -> Self {
        Self {
            providers: vec![provider],
            signer: None,
            timeout_duration: Duration::from_secs(config.rpc_timeout_secs),
            config,
        }
    }

    /// Fail unless the RPC endpoint serves the configured chain.
    ///
    /// Run once at startup, before any read or write is routed through this
    /// client.
    pub async fn verify_chain_id(&self) -> OnChainResult<()> {
        let ChainId(actual) = self.get_chain_id().await?;
        if actual != self.config.chain_id {
            return Err(OnChainError::ChainMismatch {
                expected: self.config.chain_id,
                actual,
            });
        }
        tracing::debug!(chain_id = actual, "RPC chain verified");
        Ok(())
    }

    /// Get the chain ID from the RPC.
    pub async fn get_chain_id(&self) -> OnChainResult<ChainId> {
        self.with_failover("get_chain_id", |p| async move { p.get_chain_id().await })
            .await
            .map(ChainId)
    }

    /// Get the latest block number.
    pub async fn get_block_number(&self) -> OnChainResult<u64> {
        self.with_failover("get_block_number", |p| async move { p.get_block_number().await })
            .await
    }

    /// Run `call` against each provider in turn until one answers in time.
    async fn with_failover<T, F, Fut>(&self, op: &'static str, call: F) -> OnChainResult<T>
    where
        F: Fn(DynProvider) -> Fut + Send + Sync,
        Fut: Future<Output = TransportResult<T>> + Send,
        T: Send,
    {
        let mut last_error = OnChainError::Rpc(format!("All providers failed: {}", op));
        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, call(provider.clone())).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => {
                    tracing::warn!(provider_idx = i, op, error = %e, "RPC error, trying next provider");
                    last_error = OnChainError::Rpc(e.to_string());
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, op, "RPC timeout, trying next provider");
                    last_error = OnChainError::Timeout(self.timeout_duration.as_secs());
                }
            }
        }
        metrics::record_rpc_failure(op);
        Err(last_error)
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn read_contract(&self, to: Address, data: Bytes) -> OnChainResult<Bytes> {
        let tx = TransactionRequest::default().with_to(to).with_input(data);
        self.with_failover("eth_call", |p| {
            let tx = tx.clone();
            async move { p.call(tx).await }
        })
        .await
    }

    async fn estimate_gas(
        &self,
        from: Address,
        to: Address,
        data: Bytes,
        value: U256,
    ) -> OnChainResult<u64> {
        let tx = TransactionRequest::default()
            .with_from(from)
            .with_to(to)
            .with_input(data)
            .with_value(value);
        self.with_failover("eth_estimateGas", |p| {
            let tx = tx.clone();
            async move { p.estimate_gas(tx).await }
        })
        .await
    }

    async fn send_transaction(
        &self,
        from: Address,
        to: Address,
        data: Bytes,
        value: U256,
        gas_limit: u64,
    ) -> OnChainResult<TxHash> {
        let (signer_address, provider) = self
            .signer
            .as_ref()
            .ok_or_else(|| OnChainError::NotAvailable("no signer configured".to_string()))?;
        if *signer_address != from {
            return Err(OnChainError::Wallet(format!(
                "connected signer is {}, not {}",
                signer_address, from
            )));
        }

        let tx = TransactionRequest::default()
            .with_from(from)
            .with_to(to)
            .with_input(data)
            .with_value(value)
            .with_gas_limit(gas_limit);

        match timeout(self.timeout_duration, provider.send_transaction(tx)).await {
            Ok(Ok(pending)) => {
                let hash = *pending.tx_hash();
                tracing::info!(tx_hash = %hash, from = %from, to = %to, "Transaction submitted");
                Ok(hash)
            }
            Ok(Err(e)) => {
                metrics::record_rpc_failure("eth_sendTransaction");
                Err(OnChainError::Rpc(e.to_string()))
            }
            Err(_) => {
                metrics::record_rpc_failure("eth_sendTransaction");
                Err(OnChainError::Timeout(self.timeout_duration.as_secs()))
            }
        }
    }

    async fn wait_for_receipt(&self, hash: TxHash) -> OnChainResult<Receipt> {
        let required_confirmations = self.config.confirmation_blocks as u64;
        let timeout_duration = Duration::from_secs(self.config.receipt_timeout_secs);
        let poll_interval = Duration::from_millis(self.config.receipt_poll_interval_ms);

        let result = timeout(timeout_duration, async {
            let mut ticker = interval(poll_interval);

            loop {
                ticker.tick().await;

                let receipt = self
                    .with_failover("eth_getTransactionReceipt", |p| async move {
                        p.get_transaction_receipt(hash).await
                    })
                    .await?;
                let Some(receipt) = receipt else {
                    tracing::debug!(tx_hash = %hash, "Transaction pending");
                    continue;
                };

                if !receipt.status() {
                    return Err(OnChainError::Reverted(hash));
                }

                let current_block = self.get_block_number().await?;
                let tx_block = receipt.block_number.unwrap_or(current_block);
                let confirmations = current_block.saturating_sub(tx_block) + 1;

                if confirmations >= required_confirmations {
                    return Ok(Receipt::from(&receipt));
                }

                tracing::debug!(
                    tx_hash = %hash,
                    confirmations = confirmations,
                    required = required_confirmations,
                    "Waiting for confirmations"
                );
            }
        })
        .await;

        match result {
            Ok(receipt) => receipt,
            Err(_) => Err(OnChainError::ConfirmationTimeout(hash)),
        }
    }
}

fn parse_url(raw: &str) -> OnChainResult<url::Url> {
    raw.parse()
        .map_err(|e| OnChainError::Rpc(format!("Invalid RPC URL '{}': {}", raw, e)))
}

impl std::fmt::Debug for RpcChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcChainClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("chain_id", &self.config.chain_id)
            .field("signer", &self.signer.as_ref().map(|(a, _)| *a))
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}
