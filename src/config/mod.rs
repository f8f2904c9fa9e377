//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AccessConfig (validated, immutable)
//!     → handed to client constructors at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Secrets (the signer key) never live in the file

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::AccessConfig;
pub use schema::ChainConfig;
pub use schema::IdentityConfig;
pub use schema::IndexConfig;
pub use schema::ObservabilityConfig;
pub use schema::PolicyConfig;
pub use schema::ResolverDeployment;
pub use schema::RoleIds;
