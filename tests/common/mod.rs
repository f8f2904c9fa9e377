//! Shared in-memory fakes for integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{address, b256, Address, Bytes, TxHash, B256, U256};
use alloy::sol_types::SolCall;
use async_trait::async_trait;

use village_access::access::{AttestationRoleResolver, CheckInPolicy};
use village_access::attestation::{
    AttestationFilter, AttestationIndex, AttestationPayload, AttestationRecord, IndexQueryOutcome,
};
use village_access::blockchain::resolver::IResolver;
use village_access::blockchain::{ChainClient, OnChainError, OnChainResult, Receipt, ResolverContract};
use village_access::config::RoleIds;
use village_access::identity::IdentityResolver;
use village_access::session::{Notification, NotificationSink};

pub const ROOT_ROLE: B256 = b256!("79e553c6f53701daa99614646285e66adb98ff0fcc1ef165dd2718e5c873bee6");
pub const MANAGER_ROLE: B256 = b256!("241ecf16d79d0f8dbfb92cbc07fe17840425976cf0667f022fe9877caa831b08");
pub const VILLAGER_ROLE: B256 = b256!("7e8ac59880745312f8754f56b69cccc1c6b2112d567ccf50e4e6dc2e39a7c67a");
pub const VILLAGER_SCHEMA: B256 = b256!("9ee9a1bfbf4f8f9b977c6b30600d6131d2a56d0be8100e2238a057ea8b18be7e");
pub const OTHER_SCHEMA: B256 = b256!("00000000000000000000000000000000000000000000000000000000000000ff");

pub const RESOLVER: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");
pub const ADDR_A: Address = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
pub const ADDR_B: Address = address!("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb");
pub const ADDR_C: Address = address!("cccccccccccccccccccccccccccccccccccccccc");
pub const ADDR_D: Address = address!("dddddddddddddddddddddddddddddddddddddddd");

/// Hash of the first transaction sent to a fresh [`FakeChain`].
pub const TX_HASH: TxHash = TxHash::with_last_byte(1);

pub fn roles() -> RoleIds {
    RoleIds {
        root: ROOT_ROLE,
        manager: MANAGER_ROLE,
        villager: VILLAGER_ROLE,
    }
}

pub fn resolver(chain: &Arc<FakeChain>, index: &Arc<FakeIndex>) -> AttestationRoleResolver {
    resolver_with_policy(chain, index, CheckInPolicy::default())
}

pub fn resolver_with_policy(
    chain: &Arc<FakeChain>,
    index: &Arc<FakeIndex>,
    policy: CheckInPolicy,
) -> AttestationRoleResolver {
    AttestationRoleResolver::new(
        ResolverContract::new(chain.clone(), RESOLVER),
        index.clone(),
        roles(),
        VILLAGER_SCHEMA,
        policy,
    )
}

fn word(value: U256) -> Bytes {
    Bytes::copy_from_slice(&value.to_be_bytes::<32>())
}

/// In-memory chain: role grants, a schema action table and a scripted write path.
#[derive(Default)]
pub struct FakeChain {
    grants: Mutex<HashSet<(B256, Address)>>,
    schema_actions: Mutex<HashMap<(B256, B256), u8>>,
    delays: Mutex<HashMap<Address, Duration>>,
    fail_reads: Mutex<bool>,
    estimate_error: Mutex<Option<OnChainError>>,
    send_error: Mutex<Option<OnChainError>>,
    receipt_error: Mutex<Option<OnChainError>>,
    /// Operation names in call order.
    pub calls: Mutex<Vec<&'static str>>,
    /// Arguments of every submitted transaction.
    pub sent: Mutex<Vec<(Address, Address, Bytes, U256, u64)>>,
    /// Sender and target of each submitted transaction, by hash.
    mined: Mutex<HashMap<TxHash, (Address, Address)>>,
    role_checks: AtomicUsize,
}

impl FakeChain {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn grant(&self, role: B256, account: Address) {
        self.grants.lock().unwrap().insert((role, account));
    }

    pub fn set_schema_action(&self, uid: B256, role_id: B256, action: u8) {
        self.schema_actions.lock().unwrap().insert((uid, role_id), action);
    }

    /// Delay every role check for `account`.
    pub fn delay(&self, account: Address, delay: Duration) {
        self.delays.lock().unwrap().insert(account, delay);
    }

    pub fn fail_reads(&self) {
        *self.fail_reads.lock().unwrap() = true;
    }

    pub fn fail_estimate(&self, error: OnChainError) {
        *self.estimate_error.lock().unwrap() = Some(error);
    }

    pub fn fail_send(&self, error: OnChainError) {
        *self.send_error.lock().unwrap() = Some(error);
    }

    pub fn fail_receipt(&self, error: OnChainError) {
        *self.receipt_error.lock().unwrap() = Some(error);
    }

    pub fn role_checks(&self) -> usize {
        self.role_checks.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, op: &'static str) {
        self.calls.lock().unwrap().push(op);
    }
}

#[async_trait]
impl ChainClient for FakeChain {
    async fn read_contract(&self, to: Address, data: Bytes) -> OnChainResult<Bytes> {
        self.record("read");
        if *self.fail_reads.lock().unwrap() {
            return Err(OnChainError::Rpc("connection refused".into()));
        }
        assert_eq!(to, RESOLVER, "reads must target the resolver");

        let selector = &data[..4];
        if selector == IResolver::hasRoleCall::SELECTOR.as_slice() {
            self.role_checks.fetch_add(1, Ordering::SeqCst);
            let role = B256::from_slice(&data[4..36]);
            let account = Address::from_slice(&data[48..68]);
            let delay = self.delays.lock().unwrap().get(&account).copied();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            let held = self.grants.lock().unwrap().contains(&(role, account));
            return Ok(word(U256::from(held as u8)));
        }
        if selector == IResolver::schemasCall::SELECTOR.as_slice() {
            let uid = B256::from_slice(&data[4..36]);
            let role_id = B256::from_slice(&data[36..68]);
            let action = self
                .schema_actions
                .lock()
                .unwrap()
                .get(&(uid, role_id))
                .copied()
                .unwrap_or(0);
            return Ok(word(U256::from(action)));
        }
        Err(OnChainError::Rpc("execution reverted: unknown selector".into()))
    }

    async fn estimate_gas(
        &self,
        _from: Address,
        _to: Address,
        _data: Bytes,
        _value: U256,
    ) -> OnChainResult<u64> {
        self.record("estimate");
        match self.estimate_error.lock().unwrap().clone() {
            Some(e) => Err(e),
            None => Ok(54_321),
        }
    }

    async fn send_transaction(
        &self,
        from: Address,
        to: Address,
        data: Bytes,
        value: U256,
        gas_limit: u64,
    ) -> OnChainResult<TxHash> {
        self.record("send");
        if let Some(e) = self.send_error.lock().unwrap().clone() {
            return Err(e);
        }
        let hash = {
            let mut sent = self.sent.lock().unwrap();
            sent.push((from, to, data, value, gas_limit));
            TxHash::with_last_byte(sent.len() as u8)
        };
        self.mined.lock().unwrap().insert(hash, (from, to));
        // Let other writers submit before this one asks for its receipt.
        tokio::task::yield_now().await;
        Ok(hash)
    }

    async fn wait_for_receipt(&self, hash: TxHash) -> OnChainResult<Receipt> {
        self.record("receipt");
        if let Some(e) = self.receipt_error.lock().unwrap().clone() {
            return Err(e);
        }
        let (from, to) = self
            .mined
            .lock()
            .unwrap()
            .get(&hash)
            .copied()
            .ok_or(OnChainError::ConfirmationTimeout(hash))?;
        Ok(Receipt {
            transaction_hash: hash,
            block_number: Some(1),
            from,
            to: Some(to),
            gas_used: 50_000,
            status: true,
        })
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum IndexMode {
    Answer,
    Unsuccessful,
    NullPayload,
}

type QueryHook = Box<dyn Fn(Address) + Send + Sync>;

/// In-memory attestation index.
pub struct FakeIndex {
    records: Mutex<HashMap<(B256, Address), usize>>,
    mode: Mutex<IndexMode>,
    delays: Mutex<HashMap<Address, Duration>>,
    hook: Mutex<Option<QueryHook>>,
    queries: AtomicUsize,
}

impl FakeIndex {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            records: Mutex::new(HashMap::new()),
            mode: Mutex::new(IndexMode::Answer),
            delays: Mutex::new(HashMap::new()),
            hook: Mutex::new(None),
            queries: AtomicUsize::new(0),
        })
    }

    pub fn attest(&self, schema: B256, recipient: Address, count: usize) {
        *self.records.lock().unwrap().entry((schema, recipient)).or_default() += count;
    }

    pub fn set_mode(&self, mode: IndexMode) {
        *self.mode.lock().unwrap() = mode;
    }

    pub fn delay(&self, recipient: Address, delay: Duration) {
        self.delays.lock().unwrap().insert(recipient, delay);
    }

    /// Run `hook` with the recipient every time a query is answered.
    pub fn on_query(&self, hook: impl Fn(Address) + Send + Sync + 'static) {
        *self.hook.lock().unwrap() = Some(Box::new(hook));
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AttestationIndex for FakeIndex {
    async fn query(&self, _query: &str, filter: &AttestationFilter) -> IndexQueryOutcome {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let delay = self.delays.lock().unwrap().get(&filter.recipient).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(hook) = self.hook.lock().unwrap().as_ref() {
            hook(filter.recipient);
        }

        match *self.mode.lock().unwrap() {
            IndexMode::Unsuccessful => return IndexQueryOutcome::failed(),
            IndexMode::NullPayload => return IndexQueryOutcome::null_payload(),
            IndexMode::Answer => {}
        }

        let count = self
            .records
            .lock()
            .unwrap()
            .get(&(filter.schema_id, filter.recipient))
            .copied()
            .unwrap_or(0);
        let attestations = (0..count)
            .map(|i| AttestationRecord {
                id: format!("0x{:064x}", i + 1),
                attester: ADDR_D.to_string(),
                recipient: filter.recipient.to_string(),
                decoded_data_json: "[]".into(),
                time_created: 1_717_000_000 + i as u64,
                revoked: false,
            })
            .collect();
        IndexQueryOutcome::ok(AttestationPayload { attestations })
    }
}

/// Identity resolver backed by a fixed table.
#[derive(Default)]
pub struct FakeIdentity {
    names: Mutex<HashMap<Address, String>>,
    lookups: AtomicUsize,
}

impl FakeIdentity {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn name(&self, address: Address, name: &str) {
        self.names.lock().unwrap().insert(address, name.to_string());
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityResolver for FakeIdentity {
    async fn lookup(&self, address: Address) -> Option<String> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.names.lock().unwrap().get(&address).cloned()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Error(Notification),
    Success(Notification),
}

/// Notification sink that records everything it receives.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<Sent>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn all(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn successes(&self) -> Vec<Notification> {
        self.all()
            .into_iter()
            .filter_map(|n| match n {
                Sent::Success(n) => Some(n),
                Sent::Error(_) => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<Notification> {
        self.all()
            .into_iter()
            .filter_map(|n| match n {
                Sent::Error(n) => Some(n),
                Sent::Success(_) => None,
            })
            .collect()
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify_error(&self, notification: Notification) {
        self.sent.lock().unwrap().push(Sent::Error(notification));
    }

    fn notify_success(&self, notification: Notification) {
        self.sent.lock().unwrap().push(Sent::Success(notification));
    }
}
