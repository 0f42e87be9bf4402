// ============================================================================
// CMS Core - Menu Item Entity
// File: crates/cms-core/src/domain/menu_item.rs
// Description: One navigational entry, optionally nested under another
// ============================================================================

use chrono::{DateTime, Utc};
use cms_shared::constants::{DEFAULT_LINK_TARGET, LINK_TARGETS};
use cms_shared::{utils::non_blank, EntityId};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Menu Item entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MenuItem {
    pub id: EntityId,
    pub menu_id: EntityId,
    pub parent_id: Option<EntityId>,
    pub sort_order: i32,
    pub label: String,
    pub link: String,
    pub target: String,
    pub css_class: Option<String>,

    // Audit fields
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl MenuItem {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Copies submitted display fields and parent onto the entity.
    pub fn apply(&mut self, input: &MenuItemInput) {
        self.parent_id = input.parent_id;
        self.label = input.label.clone();
        self.link = input.link.clone();
        self.target = input.target.clone();
        self.css_class = input.css_class.clone();
        self.modified_at = Some(Utc::now());
    }
}

fn default_target() -> String {
    DEFAULT_LINK_TARGET.to_string()
}

fn validate_link_target(target: &str) -> Result<(), ValidationError> {
    if LINK_TARGETS.contains(&target) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_target")
            .with_message(format!("Target must be one of {}", LINK_TARGETS.join(", ")).into()))
    }
}

fn validate_css_class(css_class: &str) -> Result<(), ValidationError> {
    let ok = css_class
        .split_whitespace()
        .all(|class| class.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    if ok {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_css_class")
            .with_message("CSS class may only contain letters, digits, '-' and '_'".into()))
    }
}

/// Fields an admin submits when adding or editing a menu item.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct MenuItemInput {
    #[validate(length(min = 1, max = 100, message = "Label must be between 1 and 100 characters"))]
    pub label: String,

    #[validate(length(min = 1, max = 255, message = "Link must be between 1 and 255 characters"))]
    pub link: String,

    #[validate(custom(function = "validate_link_target"))]
    #[serde(default = "default_target")]
    pub target: String,

    #[validate(length(max = 100, message = "CSS class too long"), custom(function = "validate_css_class"))]
    #[serde(default)]
    pub css_class: Option<String>,

    #[serde(default)]
    pub parent_id: Option<EntityId>,
}

impl MenuItemInput {
    pub fn new(label: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            link: link.into(),
            target: default_target(),
            css_class: None,
            parent_id: None,
        }
        .normalized()
    }

    pub fn with_parent(mut self, parent_id: EntityId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self.normalized()
    }

    pub fn with_css_class(mut self, css_class: impl Into<String>) -> Self {
        self.css_class = Some(css_class.into());
        self.normalized()
    }

    pub fn normalized(self) -> Self {
        let target = self.target.trim().to_string();
        Self {
            label: self.label.trim().to_string(),
            link: self.link.trim().to_string(),
            target: if target.is_empty() { default_target() } else { target },
            css_class: non_blank(self.css_class),
            parent_id: self.parent_id,
        }
    }
}

/// Row the store inserts; the id is assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMenuItem {
    pub menu_id: EntityId,
    pub parent_id: Option<EntityId>,
    pub sort_order: i32,
    pub label: String,
    pub link: String,
    pub target: String,
    pub css_class: Option<String>,
}

impl NewMenuItem {
    pub fn from_input(menu_id: EntityId, sort_order: i32, input: &MenuItemInput) -> Self {
        Self {
            menu_id,
            parent_id: input.parent_id,
            sort_order,
            label: input.label.clone(),
            link: input.link.clone(),
            target: input.target.clone(),
            css_class: input.css_class.clone(),
        }
    }

    /// Copy of an existing item for another menu, detached from its parent.
    pub fn detached_copy(item: &MenuItem, menu_id: EntityId) -> Self {
        Self {
            menu_id,
            parent_id: None,
            sort_order: item.sort_order,
            label: item.label.clone(),
            link: item.link.clone(),
            target: item.target.clone(),
            css_class: item.css_class.clone(),
        }
    }
}
