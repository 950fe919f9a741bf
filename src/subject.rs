//! Subject identifier validation.
//!
//! Subjects arrive as free-form user text and become normalized lowercase
//! keys for history rows and watchlist pairs, so the policy here is strict:
//! 1–50 chars, letters/digits/spaces only, inner whitespace collapsed.

use crate::error::EngineError;

pub const MIN_SUBJECT_LEN: usize = 1;
pub const MAX_SUBJECT_LEN: usize = 50;

/// Validate and normalize a raw subject. Returns the canonical lowercase
/// form or `InvalidInput` with an actionable message.
pub fn validate_subject(raw: &str) -> Result<String, EngineError> {
    let subject = raw.trim().to_lowercase();

    if subject.len() < MIN_SUBJECT_LEN {
        return Err(EngineError::InvalidInput(
            "subject name cannot be empty".to_string(),
        ));
    }
    if subject.chars().count() > MAX_SUBJECT_LEN {
        return Err(EngineError::InvalidInput(format!(
            "subject name is too long (max {MAX_SUBJECT_LEN} characters)"
        )));
    }
    if !subject.chars().all(|c| c.is_alphanumeric() || c.is_whitespace()) {
        return Err(EngineError::InvalidInput(
            "subject name can only contain letters, numbers, and spaces".to_string(),
        ));
    }

    // Collapse inner whitespace to single spaces.
    Ok(subject.split_whitespace().collect::<Vec<_>>().join(" "))
}
