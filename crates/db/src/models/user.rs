//! User entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use yamdb_core::roles::{Actor, Role};
use yamdb_core::types::{DbId, Timestamp};

/// Full user row from the `users` table.
///
/// Contains the confirmation-code digest -- NEVER serialize this directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: String,
    pub is_superuser: bool,
    pub confirmation_code_hash: Option<String>,
    pub created_at: Timestamp,
}

impl User {
    /// The parsed role. The `ck_users_role` constraint keeps the column valid.
    pub fn role(&self) -> Role {
        self.role.parse().unwrap_or_default()
    }

    /// The permission identity of this user.
    pub fn actor(&self) -> Actor {
        Actor {
            user_id: self.id,
            role: self.role(),
            is_superuser: self.is_superuser,
        }
    }
}

/// Public user representation.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: Role,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            bio: user.bio.clone(),
            role: user.role(),
        }
    }
}

/// DTO for creating a new user.
#[derive(Debug, Clone, Default)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: Role,
    pub is_superuser: bool,
}

/// DTO for updating an existing user. All fields are optional.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<Role>,
}

/// Listing parameters for users.
#[derive(Debug, Clone, Default)]
pub struct UserListParams {
    /// Case-insensitive username substring.
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
