//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validated config → chain client → resolver contract → index → identity
//!
//! Shutdown (shutdown.rs):
//!     trigger → every subscribed loop exits at its next select point
//!
//! Signals (signals.rs):
//!     SIGINT (Ctrl-C) → trigger shutdown
//! ```

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{Services, StartupError};
