//! One-time confirmation codes exchanged for bearer tokens.
//!
//! Codes are random alphanumeric strings mailed to the user. Only their
//! SHA-256 hex digest is persisted, so a database leak does not expose
//! codes that are still redeemable.

use rand::distr::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Length of a generated confirmation code.
pub const CODE_LENGTH: usize = 32;

/// Generate a fresh random confirmation code.
pub fn generate_code() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(CODE_LENGTH)
        .map(char::from)
        .collect()
}

/// Compute the SHA-256 hex digest of a confirmation code.
pub fn hash_code(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Check a submitted code against the stored digest.
///
/// No stored digest means there is no outstanding code, so nothing matches.
pub fn verify_code(candidate: &str, stored_hash: Option<&str>) -> bool {
    match stored_hash {
        Some(stored) if !stored.is_empty() => hash_code(candidate) == stored,
        _ => false,
    }
}
