//! Access resolution.
//!
//! # Data Flow
//! ```text
//! address
//!     → resolver contract: ROOT? MANAGER?     (authoritative, short-circuits)
//!     → attestation index: villager records  (eventually consistent)
//!     → resolver contract: ROOT again        (granted mid-query?)
//!     → Resolution { role, attestation_count }
//! ```

pub mod resolver;
pub mod role;

pub use resolver::{AttestationRoleResolver, ResolutionError};
pub use role::{CheckInPolicy, Resolution, Role};
