//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Resolves the user behind a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires an administrator.
//! - [`rbac::RequireAuth`] -- Requires any authenticated user.

pub mod auth;
pub mod rbac;
