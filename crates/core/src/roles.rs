//! Access tiers and the permission checks built on them.
//!
//! Role names must match the `ck_users_role` check constraint in the
//! initial migration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

pub const ROLE_USER: &str = "user";
pub const ROLE_MODERATOR: &str = "moderator";
pub const ROLE_ADMIN: &str = "admin";

/// All valid role strings.
pub const VALID_ROLES: &[&str] = &[ROLE_USER, ROLE_MODERATOR, ROLE_ADMIN];

/// A user's access tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Moderator,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => ROLE_USER,
            Self::Moderator => ROLE_MODERATOR,
            Self::Admin => ROLE_ADMIN,
        }
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_USER => Ok(Self::User),
            ROLE_MODERATOR => Ok(Self::Moderator),
            ROLE_ADMIN => Ok(Self::Admin),
            _ => Err(CoreError::Validation(format!(
                "Invalid role '{s}'. Must be one of: {}",
                VALID_ROLES.join(", ")
            ))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The identity a request acts as, resolved from the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: DbId,
    pub role: Role,
    /// Superusers are administrators regardless of `role`.
    pub is_superuser: bool,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin || self.is_superuser
    }

    pub fn is_moderator(&self) -> bool {
        self.role == Role::Moderator
    }

    /// Whether this actor may edit or delete content written by `author_id`.
    ///
    /// Authors own their reviews and comments; moderators and admins may
    /// touch anyone's.
    pub fn can_modify(&self, author_id: DbId) -> bool {
        self.user_id == author_id || self.is_moderator() || self.is_admin()
    }

    /// Fail with 403 unless [`Actor::can_modify`] holds.
    pub fn ensure_can_modify(&self, author_id: DbId) -> Result<(), CoreError> {
        if self.can_modify(author_id) {
            Ok(())
        } else {
            Err(CoreError::Forbidden(
                "Only the author, a moderator or an admin may change this".into(),
            ))
        }
    }
}
