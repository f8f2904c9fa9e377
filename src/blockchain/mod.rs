//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment Variables (private key)
//!     → wallet.rs (key loading)
//!     → client.rs (RPC connection with timeouts, ChainClient seam)
//!     → resolver.rs (typed resolver reads, calldata)
//!     → transaction.rs (estimate, send, confirm)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod resolver;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::{ChainClient, RpcChainClient};
pub use resolver::{Action, ResolverContract};
pub use transaction::{ContractWriteOrchestrator, TransactionOutcome, WriteFailure};
pub use types::{ChainId, OnChainError, OnChainResult, Receipt};
pub use wallet::Wallet;
