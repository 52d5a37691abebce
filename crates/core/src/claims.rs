//! Claim lifetime constants and request validation.
//!
//! Lives in `core` so the stores, the protocol services and the HTTP layer
//! all agree on the draw window, the advertised renewal cadence and what a
//! well-formed requester token or image payload looks like.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Claim lifetime
// ---------------------------------------------------------------------------

/// How long a claim stays live after it is granted or renewed (5 minutes).
pub const DEFAULT_DRAW_DURATION_SECS: i64 = 5 * 60;

/// How often clients are told to renew a held claim.
pub const DEFAULT_RENEW_INTERVAL_SECS: i64 = 20;

/// The draw window must cover at least this many missed renewals.
pub const MIN_RENEWALS_PER_WINDOW: i64 = 2;

// ---------------------------------------------------------------------------
// Payload limits
// ---------------------------------------------------------------------------

/// Longest accepted requester token.
pub const MAX_USER_TOKEN_LEN: usize = 128;

/// Largest accepted image payload (a data URL), in bytes.
pub const MAX_IMAGE_DATA_BYTES: usize = 8 * 1024 * 1024;

/// Longest accepted board name.
pub const MAX_BOARD_NAME_LEN: usize = 120;

/// Name given to boards created without one.
pub const UNTITLED_BOARD_NAME: &str = "Untitled";

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

/// A requester token must be present, short and printable.
pub fn validate_user_token(user_id: &str) -> Result<(), CoreError> {
    if user_id.trim().is_empty() {
        return Err(CoreError::Validation("user_id is required".into()));
    }
    if user_id.len() > MAX_USER_TOKEN_LEN {
        return Err(CoreError::Validation(format!(
            "user_id must be at most {MAX_USER_TOKEN_LEN} bytes"
        )));
    }
    if user_id.chars().any(char::is_control) {
        return Err(CoreError::Validation(
            "user_id must not contain control characters".into(),
        ));
    }
    Ok(())
}

/// The image is opaque, but it has to be non-empty and bounded.
pub fn validate_image_data(image_data: &str) -> Result<(), CoreError> {
    if image_data.is_empty() {
        return Err(CoreError::Validation("image_data is required".into()));
    }
    if image_data.len() > MAX_IMAGE_DATA_BYTES {
        return Err(CoreError::Validation(format!(
            "image_data must be at most {MAX_IMAGE_DATA_BYTES} bytes, got {}",
            image_data.len()
        )));
    }
    Ok(())
}

/// Trim a requested board name, falling back to [`UNTITLED_BOARD_NAME`].
pub fn normalize_board_name(name: Option<&str>) -> Result<String, CoreError> {
    let name = name.map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Ok(UNTITLED_BOARD_NAME.to_string());
    }
    if name.chars().count() > MAX_BOARD_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Board name must be at most {MAX_BOARD_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_user_tokens() {
        assert!(validate_user_token("a").is_ok());
        assert!(validate_user_token("5b0e6a8e-3f4c-4d0b-9a7e-0d5c1f3e2b11").is_ok());
    }

    #[test]
    fn test_empty_user_token() {
        assert!(validate_user_token("").is_err());
        assert!(validate_user_token("   ").is_err());
    }

    #[test]
    fn test_user_token_too_long() {
        let long = "x".repeat(MAX_USER_TOKEN_LEN + 1);
        let err = validate_user_token(&long).unwrap_err();
        assert!(err.to_string().contains("at most"));
    }

    #[test]
    fn test_user_token_control_chars() {
        assert!(validate_user_token("abc\ndef").is_err());
    }

    #[test]
    fn test_image_data_bounds() {
        assert!(validate_image_data("data:image/png;base64,AAAA").is_ok());
        assert!(validate_image_data("").is_err());
    }

    #[test]
    fn test_board_name_defaults() {
        assert_eq!(normalize_board_name(None).unwrap(), "Untitled");
        assert_eq!(normalize_board_name(Some("  ")).unwrap(), "Untitled");
        assert_eq!(normalize_board_name(Some(" Summer ")).unwrap(), "Summer");
    }

    #[test]
    fn test_board_name_too_long() {
        let long = "n".repeat(MAX_BOARD_NAME_LEN + 1);
        assert!(normalize_board_name(Some(&long)).is_err());
    }

    #[test]
    fn test_draw_window_covers_missed_renewals() {
        assert!(DEFAULT_DRAW_DURATION_SECS >= DEFAULT_RENEW_INTERVAL_SECS * MIN_RENEWALS_PER_WINDOW);
    }
}
