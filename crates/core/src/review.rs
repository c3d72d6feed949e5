//! Review and comment content rules.

use crate::error::CoreError;
use crate::text::reject_nul;

/// Lowest score a review may give.
pub const MIN_SCORE: i32 = 1;

/// Highest score a review may give.
pub const MAX_SCORE: i32 = 10;

/// Validate that a review score lies in `[MIN_SCORE, MAX_SCORE]`.
pub fn validate_score(score: i32) -> Result<(), CoreError> {
    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(CoreError::Validation(format!(
            "Score must be between {MIN_SCORE} and {MAX_SCORE}, got {score}"
        )));
    }
    Ok(())
}

/// Validate review or comment text: must contain something besides whitespace.
pub fn validate_text(text: &str) -> Result<(), CoreError> {
    if text.trim().is_empty() {
        return Err(CoreError::Validation("Text must not be empty".into()));
    }
    reject_nul(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_bounds_are_inclusive() {
        assert!(validate_score(MIN_SCORE).is_ok());
        assert!(validate_score(MAX_SCORE).is_ok());
    }

    #[test]
    fn score_outside_bounds_is_rejected() {
        assert!(validate_score(0).is_err());
        assert!(validate_score(11).is_err());
        assert!(validate_score(-5).is_err());
    }

    #[test]
    fn blank_text_is_rejected() {
        assert!(validate_text("").is_err());
        assert!(validate_text(" \n\t").is_err());
        assert!(validate_text("Worth a watch").is_ok());
    }

    #[test]
    fn text_with_nul_is_rejected() {
        assert!(validate_text("bad\0text").is_err());
    }
}
