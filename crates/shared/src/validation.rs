//! Common validation logic shared by request DTOs.

use validator::ValidationError;

/// Validates an event share code: exactly 6 uppercase alphanumeric
/// characters. Lowercase input is the caller's problem — route handlers
/// uppercase codes before validating, matching the join-by-code convention.
pub fn validate_event_code(code: &str) -> Result<(), ValidationError> {
    if code.len() != crate::codes::EVENT_CODE_LEN {
        return Err(ValidationError::new("event_code_length"));
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    {
        return Err(ValidationError::new("event_code_charset"));
    }
    Ok(())
}

/// Validates a storage path: non-empty, no traversal segments. Paths are
/// opaque references into the external object store, but we refuse obvious
/// nonsense before handing them to the moderation pipeline.
pub fn validate_storage_path(path: &str) -> Result<(), ValidationError> {
    if path.is_empty() || path.len() > 1024 {
        return Err(ValidationError::new("storage_path_length"));
    }
    if path.split('/').any(|seg| seg == "..") {
        return Err(ValidationError::new("storage_path_traversal"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_event_code() {
        assert!(validate_event_code("ABC123").is_ok());
        assert!(validate_event_code("ZZZZZZ").is_ok());
        assert!(validate_event_code("000000").is_ok());
    }

    #[test]
    fn test_event_code_wrong_length() {
        assert!(validate_event_code("").is_err());
        assert!(validate_event_code("ABC12").is_err());
        assert!(validate_event_code("ABC1234").is_err());
    }

    #[test]
    fn test_event_code_bad_charset() {
        assert!(validate_event_code("abc123").is_err());
        assert!(validate_event_code("ABC-12").is_err());
        assert!(validate_event_code("ÁBC123").is_err());
    }

    #[test]
    fn test_valid_storage_path() {
        assert!(validate_storage_path("events/abc/1700000000-photo.jpg").is_ok());
    }

    #[test]
    fn test_storage_path_rejects_empty_and_traversal() {
        assert!(validate_storage_path("").is_err());
        assert!(validate_storage_path("events/../secrets").is_err());
        assert!(validate_storage_path(&"x".repeat(2000)).is_err());
    }
}
