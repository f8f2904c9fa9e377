//! Typed access to the resolver contract.
//!
//! The resolver maps `(schema, role)` pairs to the action a role holder may
//! perform, answers role membership checks, and is the target of
//! role-mutation transactions.

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::sol;
use alloy::sol_types::SolCall;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::blockchain::client::ChainClient;
use crate::blockchain::types::{OnChainError, OnChainResult};
use crate::config::schema::ResolverDeployment;

sol! {
    /// Resolver surface consumed by this crate.
    interface IResolver {
        function hasRole(bytes32 role, address account) external view returns (bool);
        function schemas(bytes32 uid, bytes32 roleId) external view returns (uint8);
        function setSchema(bytes32 uid, bytes32 roleId, uint256 action) external;
    }
}

/// A resolver action. The value domain belongs to the contract; known
/// values are exposed as constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Action(pub u64);

impl Action {
    pub const NONE: Action = Action(0);
    pub const ASSIGN_MANAGER: Action = Action(1);
    pub const ASSIGN_VILLAGER: Action = Action(2);
    pub const ATTEST: Action = Action(3);
    pub const REPLY: Action = Action(4);

    /// Name of a known action, if any.
    pub fn name(&self) -> Option<&'static str> {
        match self.0 {
            0 => Some("NONE"),
            1 => Some("ASSIGN_MANAGER"),
            2 => Some("ASSIGN_VILLAGER"),
            3 => Some("ATTEST"),
            4 => Some("REPLY"),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "action({})", self.0),
        }
    }
}

impl From<u64> for Action {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Resolver contract bound to the chain it is deployed on.
#[derive(Clone)]
pub struct ResolverContract {
    chain: Arc<dyn ChainClient>,
    address: Address,
}

impl ResolverContract {
    pub fn new(chain: Arc<dyn ChainClient>, address: Address) -> Self {
        Self { chain, address }
    }

    /// Bind to the deployment registered for `chain_id`.
    pub fn for_chain(
        chain: Arc<dyn ChainClient>,
        deployments: &[ResolverDeployment],
        chain_id: u64,
    ) -> OnChainResult<Self> {
        deployments
            .iter()
            .find(|d| d.chain_id == chain_id)
            .map(|d| Self::new(chain, d.address))
            .ok_or(OnChainError::UnknownDeployment(chain_id))
    }

    /// Contract address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Whether `account` holds `role`.
    pub async fn has_role(&self, role: B256, account: Address) -> OnChainResult<bool> {
        let data = IResolver::hasRoleCall { role, account }.abi_encode();
        let ret = self.chain.read_contract(self.address, data.into()).await?;
        IResolver::hasRoleCall::abi_decode_returns(&ret)
            .map_err(|e| OnChainError::Decode(format!("hasRole: {}", e)))
    }

    /// Action currently granted to holders of `role_id` on schema `uid`.
    pub async fn schema_action(&self, uid: B256, role_id: B256) -> OnChainResult<Action> {
        let data = IResolver::schemasCall { uid, roleId: role_id }.abi_encode();
        let ret = self.chain.read_contract(self.address, data.into()).await?;
        IResolver::schemasCall::abi_decode_returns(&ret)
            .map(|action| Action(u64::from(action)))
            .map_err(|e| OnChainError::Decode(format!("schemas: {}", e)))
    }

    /// Calldata for `setSchema(uid, roleId, action)`.
    pub fn encode_set_schema(uid: B256, role_id: B256, action: Action) -> Bytes {
        IResolver::setSchemaCall {
            uid,
            roleId: role_id,
            action: U256::from(action.0),
        }
        .abi_encode()
        .into()
    }

    pub(crate) fn chain(&self) -> &Arc<dyn ChainClient> {
        &self.chain
    }
}

impl fmt::Debug for ResolverContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverContract")
            .field("address", &self.address)
            .finish()
    }
}
