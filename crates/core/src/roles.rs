//! Admin role hierarchy and the minimum-role gate used by every admin mutation.
//!
//! Roles are strictly ordered: `moderator` < `admin` < `superadmin`. A check for
//! a minimum role passes for that role and every role above it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

pub const ROLE_MODERATOR: &str = "moderator";
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_SUPERADMIN: &str = "superadmin";

/// An admin role. Variant order is the privilege order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Moderator,
    Admin,
    Superadmin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Moderator => ROLE_MODERATOR,
            Role::Admin => ROLE_ADMIN,
            Role::Superadmin => ROLE_SUPERADMIN,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_MODERATOR => Ok(Role::Moderator),
            ROLE_ADMIN => Ok(Role::Admin),
            ROLE_SUPERADMIN => Ok(Role::Superadmin),
            other => Err(CoreError::Validation(format!("Unknown role '{other}'"))),
        }
    }
}

/// The identity performing an admin operation.
///
/// `user_id` is `None` for the scheduled trigger, which acts as superadmin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Option<DbId>,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: DbId, role: Role) -> Self {
        Self {
            user_id: Some(user_id),
            role,
        }
    }

    /// The scheduler identity.
    pub fn system() -> Self {
        Self {
            user_id: None,
            role: Role::Superadmin,
        }
    }

    pub fn is_system(&self) -> bool {
        self.user_id.is_none()
    }
}

/// Fail with [`CoreError::InsufficientPermissions`] unless `actor` holds at
/// least `min`.
pub fn require_role(actor: &Actor, min: Role) -> Result<(), CoreError> {
    if actor.role >= min {
        Ok(())
    } else {
        Err(CoreError::InsufficientPermissions(format!(
            "{min} role required, caller is {}",
            actor.role
        )))
    }
}
