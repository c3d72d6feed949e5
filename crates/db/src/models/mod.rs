//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A `Serialize` shape for API output where it differs from the row
//! - `Create*` / `Update*` DTOs (update fields are all `Option`)

pub mod catalog;
pub mod comment;
pub mod page;
pub mod review;
pub mod title;
pub mod user;
