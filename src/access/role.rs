//! Roles, resolution results and the check-in rule.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Access level. Declaration order is precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    None,
    Villager,
    Manager,
    Root,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::None => "NONE",
            Role::Villager => "VILLAGER",
            Role::Manager => "MANAGER",
            Role::Root => "ROOT",
        }
    }

    /// Roles that are exempt from the check-in requirement.
    pub fn is_privileged(&self) -> bool {
        matches!(self, Role::Manager | Role::Root)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Effective role and attestation count of one address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub role: Role,
    pub attestation_count: u64,
}

/// Privileged roles bypass check-in.
///
/// They are credited with exactly `threshold` attestations so that every
/// consumer comparing a count against the threshold treats them as checked
/// in, without knowing about roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckInPolicy {
    threshold: u64,
}

impl CheckInPolicy {
    pub const DEFAULT_THRESHOLD: u64 = 2;

    pub fn new(threshold: u64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    /// Resolution for a privileged role, ignoring attestation history.
    pub fn privileged(&self, role: Role) -> Resolution {
        debug_assert!(role.is_privileged());
        Resolution {
            role,
            attestation_count: self.threshold,
        }
    }

    pub fn is_checked_in(&self, attestation_count: u64) -> bool {
        attestation_count >= self.threshold
    }
}

impl Default for CheckInPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_THRESHOLD)
    }
}
