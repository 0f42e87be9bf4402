//! Site setting entity

use chrono::{DateTime, Utc};
use cms_shared::constants::MAX_SETTING_KEY_LENGTH;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, FieldErrors};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Setting {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

impl Setting {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            updated_at: Utc::now(),
        }
    }
}

/// Keys are lowercase ASCII, digits, `_` and `.`, 1..=64 characters.
pub fn validate_setting_key(key: &str) -> Result<(), DomainError> {
    let valid = !key.is_empty()
        && key.len() <= MAX_SETTING_KEY_LENGTH
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '.');
    if valid {
        Ok(())
    } else {
        Err(DomainError::ValidationError(FieldErrors::single(
            "key",
            "Setting key must be 1-64 characters of a-z, 0-9, '_' or '.'",
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setting_keys() {
        assert!(validate_setting_key("site.title").is_ok());
        assert!(validate_setting_key("gallery_per_page").is_ok());
        assert!(validate_setting_key("").is_err());
        assert!(validate_setting_key("Site Title").is_err());
        assert!(validate_setting_key(&"k".repeat(65)).is_err());
    }
}
