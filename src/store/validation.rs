/// String validators shared by field descriptors and the admin bootstrap
use crate::error::{CamError, CamResult};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref UUID_PATTERN: Regex =
        Regex::new("^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
            .expect("uuid pattern is valid");
    static ref ALPHANUMERIC_DASHES: Regex =
        Regex::new("^[a-z0-9_-]+$").expect("username pattern is valid");
}

pub const MIN_LENGTH_ERROR: &str = "error:min_length_error";
pub const MAX_LENGTH_ERROR: &str = "error:max_length_error";
pub const ALPHANUMERIC_DASHES_ERROR: &str = "error:alphanumdash_error";
pub const INVALID_UUID: &str = "invalid_uuid";

/// Lowercase hyphenated UUID, the only accepted record key format
pub fn is_uuid(value: &str) -> bool {
    UUID_PATTERN.is_match(value)
}

pub fn check_uuid(value: &str) -> CamResult<()> {
    if is_uuid(value) {
        Ok(())
    } else {
        Err(CamError::validation(INVALID_UUID))
    }
}

/// Length is measured in bytes
pub fn min_length(value: &str, min: usize) -> CamResult<()> {
    if value.len() < min {
        return Err(CamError::validation(format!("{}|{}", MIN_LENGTH_ERROR, min)));
    }
    Ok(())
}

pub fn max_length(value: &str, max: usize) -> CamResult<()> {
    if value.len() > max {
        return Err(CamError::validation(format!("{}|{}", MAX_LENGTH_ERROR, max)));
    }
    Ok(())
}

pub fn alphanumeric_and_dashes(value: &str) -> CamResult<()> {
    if ALPHANUMERIC_DASHES.is_match(value) {
        Ok(())
    } else {
        Err(CamError::validation(ALPHANUMERIC_DASHES_ERROR))
    }
}

/// Username length bounds and allowed characters
pub fn username(value: &str, min: usize, max: usize) -> CamResult<()> {
    min_length(value, min)?;
    max_length(value, max)?;
    alphanumeric_and_dashes(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_format() {
        assert!(is_uuid("0b5e4c1e-8b1a-4a53-9f55-2f0c3e8d9a10"));
        assert!(!is_uuid("0B5E4C1E-8B1A-4A53-9F55-2F0C3E8D9A10"));
        assert!(!is_uuid("0b5e4c1e8b1a4a539f552f0c3e8d9a10"));
        assert!(!is_uuid(""));
        assert!(!is_uuid(" 0b5e4c1e-8b1a-4a53-9f55-2f0c3e8d9a10"));
    }

    #[test]
    fn test_generated_uuid_is_accepted() {
        let id = uuid::Uuid::new_v4().to_string();
        assert!(check_uuid(&id).is_ok());
    }

    #[test]
    fn test_length_bounds() {
        assert!(max_length("abc", 3).is_ok());
        let err = max_length("abcd", 3).unwrap_err();
        assert_eq!(err.to_string(), "Validation error: error:max_length_error|3");
        assert!(min_length("ab", 3).is_err());
        assert!(min_length("abc", 3).is_ok());
    }

    #[test]
    fn test_username() {
        let cases = [
            ("", false),
            ("short", false),
            ("verylongusernameverylongus", false),
            ("username with spaces", false),
            ("username|", false),
            ("username", true),
            ("cam-admin_01", true),
        ];

        for (input, valid) in cases {
            assert_eq!(username(input, 6, 25).is_ok(), valid, "username {:?}", input);
        }
    }
}
