//! Categories, genres and titles.

use std::sync::LazyLock;

use chrono::Datelike;
use regex::Regex;

use crate::error::CoreError;
use crate::text::reject_nul;

/// Maximum length of a category, genre or title name.
pub const NAME_MAX_LENGTH: usize = 256;

/// Maximum length of a category or genre slug.
pub const SLUG_MAX_LENGTH: usize = 50;

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("valid regex"));

/// The current calendar year in UTC.
pub fn current_year() -> i32 {
    chrono::Utc::now().year()
}

/// Validate a display name: non-blank and at most [`NAME_MAX_LENGTH`] chars.
pub fn validate_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation("Name must not be empty".into()));
    }
    if name.chars().count() > NAME_MAX_LENGTH {
        return Err(CoreError::Validation(format!(
            "Name must be at most {NAME_MAX_LENGTH} characters"
        )));
    }
    reject_nul(name)
}

/// Validate a slug: ASCII letters, digits, `-` and `_`, bounded length.
pub fn validate_slug(slug: &str) -> Result<(), CoreError> {
    if slug.len() > SLUG_MAX_LENGTH {
        return Err(CoreError::Validation(format!(
            "Slug must be at most {SLUG_MAX_LENGTH} characters"
        )));
    }
    if !SLUG_RE.is_match(slug) {
        return Err(CoreError::Validation(format!(
            "Invalid slug '{slug}'. Use letters, digits, hyphens or underscores"
        )));
    }
    Ok(())
}

/// Validate a release year against `current_year`. Future years are rejected.
pub fn validate_year(year: i32, current_year: i32) -> Result<(), CoreError> {
    if year > current_year {
        return Err(CoreError::Validation(format!(
            "Year {year} is in the future (current year is {current_year})"
        )));
    }
    Ok(())
}
