//! User account field rules.

use std::sync::LazyLock;

use regex::Regex;
use validator::ValidateEmail;

use crate::error::CoreError;
use crate::text::reject_nul;

/// Maximum length of a username.
pub const USERNAME_MAX_LENGTH: usize = 150;

/// Maximum length of an email address.
pub const EMAIL_MAX_LENGTH: usize = 254;

/// Maximum length of first and last names.
pub const NAME_MAX_LENGTH: usize = 150;

/// Username reserved for the self-service profile endpoint (`/users/me/`).
pub const RESERVED_USERNAME: &str = "me";

/// Characters that are NOT allowed in a username.
static USERNAME_INVALID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w.@+-]").expect("valid regex"));

/// Validate a username: non-empty, bounded, `[\w.@+-]` only, not reserved.
///
/// When invalid characters are present the message lists each distinct
/// offender once, in order of appearance.
pub fn validate_username(username: &str) -> Result<(), CoreError> {
    if username.is_empty() {
        return Err(CoreError::Validation("Username must not be empty".into()));
    }
    if username.chars().count() > USERNAME_MAX_LENGTH {
        return Err(CoreError::Validation(format!(
            "Username must be at most {USERNAME_MAX_LENGTH} characters"
        )));
    }
    if username == RESERVED_USERNAME {
        return Err(CoreError::Validation(format!(
            "Username '{RESERVED_USERNAME}' is not allowed"
        )));
    }

    let mut invalid: Vec<&str> = Vec::new();
    for m in USERNAME_INVALID_RE.find_iter(username) {
        if !invalid.contains(&m.as_str()) {
            invalid.push(m.as_str());
        }
    }
    if !invalid.is_empty() {
        return Err(CoreError::Validation(format!(
            "Username contains invalid characters: {}",
            invalid.join(" ")
        )));
    }
    Ok(())
}

/// Validate an email address for syntax and length.
pub fn validate_email(email: &str) -> Result<(), CoreError> {
    if email.chars().count() > EMAIL_MAX_LENGTH {
        return Err(CoreError::Validation(format!(
            "Email must be at most {EMAIL_MAX_LENGTH} characters"
        )));
    }
    if !email.validate_email() {
        return Err(CoreError::Validation(format!(
            "'{email}' is not a valid email address"
        )));
    }
    Ok(())
}

/// Validate an optional first or last name.
pub fn validate_person_name(name: &str) -> Result<(), CoreError> {
    if name.chars().count() > NAME_MAX_LENGTH {
        return Err(CoreError::Validation(format!(
            "Must be at most {NAME_MAX_LENGTH} characters"
        )));
    }
    reject_nul(name)
}
