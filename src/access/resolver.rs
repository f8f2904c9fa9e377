//! Role and attestation-count resolution.
//!
//! Role checks on the resolver contract are authoritative and cheap, so they
//! short-circuit the slower, eventually-consistent index query.

use alloy::primitives::{Address, B256};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

use crate::access::role::{CheckInPolicy, Resolution, Role};
use crate::attestation::{AttestationFilter, AttestationIndex, IndexError, VILLAGER_QUERY};
use crate::blockchain::{OnChainError, ResolverContract};
use crate::config::RoleIds;
use crate::observability::metrics;

/// Why an address could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("role lookup failed: {0}")]
    OnChain(#[from] OnChainError),

    #[error("attestation lookup failed: {0}")]
    Index(#[from] IndexError),
}

impl ResolutionError {
    /// Short user-facing title.
    pub fn title(&self) -> &'static str {
        match self {
            ResolutionError::OnChain(_) => "Cannot verify role",
            ResolutionError::Index(_) => "Cannot fetch attestations",
        }
    }
}

/// Derives an address's effective [`Role`] and attestation count.
#[derive(Clone)]
pub struct AttestationRoleResolver {
    contract: ResolverContract,
    index: Arc<dyn AttestationIndex>,
    roles: RoleIds,
    villager_schema: B256,
    policy: CheckInPolicy,
}

impl AttestationRoleResolver {
    pub fn new(
        contract: ResolverContract,
        index: Arc<dyn AttestationIndex>,
        roles: RoleIds,
        villager_schema: B256,
        policy: CheckInPolicy,
    ) -> Self {
        Self {
            contract,
            index,
            roles,
            villager_schema,
            policy,
        }
    }

    /// Resolve `address`.
    ///
    /// Never guesses: an index that fails or answers with no payload yields an
    /// error rather than a count.
    pub async fn resolve(&self, address: Address) -> Result<Resolution, ResolutionError> {
        let started = Instant::now();
        let result = self.resolve_uncounted(address).await;

        let (role, outcome) = match &result {
            Ok(resolution) => (resolution.role.as_str(), "ok"),
            Err(ResolutionError::OnChain(_)) => ("unknown", "on_chain_error"),
            Err(ResolutionError::Index(_)) => ("unknown", "index_error"),
        };
        metrics::record_resolution(role, outcome, started.elapsed());

        match &result {
            Ok(resolution) => tracing::debug!(
                address = %address,
                role = %resolution.role,
                count = resolution.attestation_count,
                "Address resolved"
            ),
            Err(e) => tracing::warn!(address = %address, error = %e, "Address resolution failed"),
        }
        result
    }

    async fn resolve_uncounted(&self, address: Address) -> Result<Resolution, ResolutionError> {
        if self.contract.has_role(self.roles.root, address).await? {
            return Ok(self.policy.privileged(Role::Root));
        }
        if self.contract.has_role(self.roles.manager, address).await? {
            return Ok(self.policy.privileged(Role::Manager));
        }

        let filter = AttestationFilter::new(self.villager_schema, address);
        let payload = self.index.query(VILLAGER_QUERY, &filter).await.into_result()?;

        // ROOT can be granted while the index query is in flight. MANAGER is
        // not re-checked.
        if self.contract.has_role(self.roles.root, address).await? {
            return Ok(self.policy.privileged(Role::Root));
        }

        Ok(Resolution {
            role: Role::Villager,
            attestation_count: payload.attestations.len() as u64,
        })
    }
}

impl std::fmt::Debug for AttestationRoleResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttestationRoleResolver")
            .field("contract", &self.contract)
            .field("villager_schema", &self.villager_schema)
            .field("policy", &self.policy)
            .finish()
    }
}
