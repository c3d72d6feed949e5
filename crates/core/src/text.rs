//! Free-text field rules shared by every writable string.

use crate::error::CoreError;

/// Reject strings containing NUL. PostgreSQL cannot store them in text columns.
pub fn reject_nul(value: &str) -> Result<(), CoreError> {
    if value.contains('\0') {
        return Err(CoreError::Validation(
            "Null characters are not allowed".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nul_anywhere_is_rejected() {
        assert!(reject_nul("plain text").is_ok());
        assert!(reject_nul("").is_ok());
        assert!(reject_nul("\0").is_err());
        assert!(reject_nul("bad\0text").is_err());
    }
}
