//! Attestation-based role resolution and resolver-contract writes for event
//! access control.

pub mod access;
pub mod attestation;
pub mod blockchain;
pub mod config;
pub mod identity;
pub mod lifecycle;
pub mod observability;
pub mod session;

pub use access::{AttestationRoleResolver, CheckInPolicy, Resolution, ResolutionError, Role};
pub use blockchain::{Action, ContractWriteOrchestrator, TransactionOutcome};
pub use config::AccessConfig;
pub use session::{CoordinatorHandle, Session, SessionHandle, WalletEvent, WalletSessionCoordinator};
