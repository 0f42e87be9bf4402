// ============================================================================
// CMS Core - Menu Entity
// File: crates/cms-core/src/domain/menu.rs
// Description: Named menu owning a forest of menu items
// ============================================================================

use chrono::{DateTime, Utc};
use cms_shared::{utils::non_blank, EntityId};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Menu entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Menu {
    pub id: EntityId,
    pub menu_name: String,
    pub description: Option<String>,

    // Audit fields
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

/// Listing row: a menu with the number of items it owns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MenuSummary {
    pub id: EntityId,
    pub menu_name: String,
    pub description: Option<String>,
    pub item_count: i64,
}

/// Fields an admin submits when creating or renaming a menu.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct MenuInput {
    #[validate(length(min = 2, max = 100, message = "Menu name must be between 2 and 100 characters"))]
    pub menu_name: String,

    #[validate(length(max = 500, message = "Menu description too long"))]
    #[serde(default)]
    pub description: Option<String>,
}

impl MenuInput {
    pub fn new(menu_name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            menu_name: menu_name.into(),
            description,
        }
        .normalized()
    }

    /// Trims the name and drops a blank description.
    pub fn normalized(self) -> Self {
        Self {
            menu_name: self.menu_name.trim().to_string(),
            description: non_blank(self.description),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_input_normalizes() {
        let input = MenuInput::new("  main ", Some("   ".to_string()));
        assert_eq!(input.menu_name, "main");
        assert!(input.description.is_none());
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_menu_name_too_short() {
        let input = MenuInput::new("m", None);
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("menu_name"));
    }
}
