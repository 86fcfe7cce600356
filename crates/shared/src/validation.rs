//! Common validation utilities.

use validator::ValidationError;

/// Validates that a string contains at least one non-whitespace character.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Validates that a string contains no NUL (U+0000) character.
///
/// PostgreSQL text columns cannot store NUL.
pub fn validate_no_nul(value: &str) -> Result<(), ValidationError> {
    if value.contains('\0') {
        let mut err = ValidationError::new("nul_character");
        err.message = Some("Value must not contain NUL characters".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Validates a required text field: not blank and storable (no NUL).
pub fn validate_required_text(value: &str) -> Result<(), ValidationError> {
    validate_not_blank(value)?;
    validate_no_nul(value)
}

/// Validates that a string is at most `max` characters long.
///
/// Counts Unicode scalar values, not bytes, so limits match `VARCHAR(n)` columns.
pub fn validate_max_chars(value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() <= max {
        Ok(())
    } else {
        let mut err = ValidationError::new("too_long");
        err.message = Some(format!("Value must be at most {} characters", max).into());
        err.add_param("max".into(), &max);
        Err(err)
    }
}

/// Truncates a string to at most `max` characters, respecting char boundaries.
pub fn truncate_chars(value: &str, max: usize) -> String {
    match value.char_indices().nth(max) {
        Some((byte_idx, _)) => value[..byte_idx].to_string(),
        None => value.to_string(),
    }
}
