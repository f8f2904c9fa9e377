//! Wallet session subsystem.
//!
//! # Data Flow
//! ```text
//! wallet event
//!     → coordinator.rs (one live resolution per transition)
//!     → access::AttestationRoleResolver + identity lookup (in parallel)
//!     → state.rs (generation-guarded commit)
//!     → SessionHandle readers, NotificationSink
//! ```

pub mod coordinator;
pub mod notify;
pub mod state;

pub use coordinator::{CoordinatorHandle, WalletEvent, WalletSessionCoordinator};
pub use notify::{Notification, NotificationSink, TracingNotifier};
pub use state::{Session, SessionClosed, SessionHandle, SessionStatus};
