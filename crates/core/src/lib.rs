//! Domain rules for the YaMDb review catalog.
//!
//! Everything in this crate is pure: no database, no HTTP. The `db` and
//! `api` crates call into it for validation, permission checks, and
//! confirmation-code handling.

pub mod catalog;
pub mod confirmation;
pub mod error;
pub mod review;
pub mod roles;
pub mod search;
pub mod text;
pub mod types;
pub mod users;
