//! Best-effort display names via ENS reverse resolution.

use alloy::primitives::{keccak256, Address, B256};
use alloy::sol;
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use std::sync::Arc;

use crate::blockchain::{ChainClient, OnChainError, OnChainResult};

sol! {
    interface IEnsRegistry {
        function resolver(bytes32 node) external view returns (address);
    }

    interface IEnsResolver {
        function name(bytes32 node) external view returns (string);
        function addr(bytes32 node) external view returns (address);
    }
}

/// Reverse name lookup. Non-authoritative; `None` on any failure.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn lookup(&self, address: Address) -> Option<String>;
}

/// Resolver used when identity lookups are disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIdentity;

#[async_trait]
impl IdentityResolver for NoIdentity {
    async fn lookup(&self, _address: Address) -> Option<String> {
        None
    }
}

/// ENS namehash of a dotted name.
pub fn namehash(name: &str) -> B256 {
    let mut node = B256::ZERO;
    if name.is_empty() {
        return node;
    }
    for label in name.rsplit('.') {
        let label_hash = keccak256(label.as_bytes());
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(node.as_slice());
        buf[32..].copy_from_slice(label_hash.as_slice());
        node = keccak256(buf);
    }
    node
}

/// Node of `<address>.addr.reverse`.
pub fn reverse_node(address: Address) -> B256 {
    namehash(&format!("{}.addr.reverse", alloy::hex::encode(address.as_slice())))
}

/// ENS primary-name lookup through a [`ChainClient`] on the ENS chain.
#[derive(Clone)]
pub struct EnsIdentityResolver {
    chain: Arc<dyn ChainClient>,
    registry: Address,
}

impl EnsIdentityResolver {
    pub fn new(chain: Arc<dyn ChainClient>, registry: Address) -> Self {
        Self { chain, registry }
    }

    async fn resolver_of(&self, node: B256) -> OnChainResult<Option<Address>> {
        let data = IEnsRegistry::resolverCall { node }.abi_encode();
        let ret = self.chain.read_contract(self.registry, data.into()).await?;
        let resolver = IEnsRegistry::resolverCall::abi_decode_returns(&ret)
            .map_err(|e| OnChainError::Decode(format!("resolver: {}", e)))?;
        Ok((resolver != Address::ZERO).then_some(resolver))
    }

    /// Primary name of `address`, verified by forward resolution.
    pub async fn primary_name(&self, address: Address) -> OnChainResult<Option<String>> {
        let node = reverse_node(address);
        let Some(reverse_resolver) = self.resolver_of(node).await? else {
            return Ok(None);
        };

        let data = IEnsResolver::nameCall { node }.abi_encode();
        let ret = self.chain.read_contract(reverse_resolver, data.into()).await?;
        let name = IEnsResolver::nameCall::abi_decode_returns(&ret)
            .map_err(|e| OnChainError::Decode(format!("name: {}", e)))?;
        if name.is_empty() {
            return Ok(None);
        }

        // A reverse record is self-asserted; only trust names that point back.
        let forward_node = namehash(&name);
        let Some(forward_resolver) = self.resolver_of(forward_node).await? else {
            return Ok(None);
        };
        let data = IEnsResolver::addrCall { node: forward_node }.abi_encode();
        let ret = self.chain.read_contract(forward_resolver, data.into()).await?;
        let resolved = IEnsResolver::addrCall::abi_decode_returns(&ret)
            .map_err(|e| OnChainError::Decode(format!("addr: {}", e)))?;

        Ok((resolved == address).then_some(name))
    }
}

#[async_trait]
impl IdentityResolver for EnsIdentityResolver {
    async fn lookup(&self, address: Address) -> Option<String> {
        match self.primary_name(address).await {
            Ok(name) => name,
            Err(e) => {
                tracing::debug!(address = %address, error = %e, "ENS lookup failed");
                None
            }
        }
    }
}

impl std::fmt::Debug for EnsIdentityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnsIdentityResolver")
            .field("registry", &self.registry)
            .finish()
    }
}
