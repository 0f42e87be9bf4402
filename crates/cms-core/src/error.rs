//! Domain errors

use std::collections::BTreeMap;
use std::fmt;

use cms_shared::EntityId;
use thiserror::Error;

/// Per-field validation messages, reported back to the admin form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> &BTreeMap<String, Vec<String>> {
        &self.0
    }

    /// `Ok(())` when nothing was collected.
    pub fn into_result(self) -> Result<(), DomainError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DomainError::ValidationError(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            first = false;
            write!(f, "{}: {}", field, messages.join(", "))?;
        }
        Ok(())
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        for (field, list) in errors.field_errors() {
            for err in list.iter() {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                out.add(&field.to_string(), message);
            }
        }
        out
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DomainError::ValidationError(errors.into())
    }
}

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Menu not found: {0}")]
    MenuNotFound(EntityId),

    #[error("Menu item not found: {0}")]
    MenuItemNotFound(EntityId),

    #[error("Menu name already exists: {0}")]
    MenuNameAlreadyExists(String),

    #[error("Menu item {item_id} does not belong to menu {menu_id}")]
    ItemNotInMenu { menu_id: EntityId, item_id: EntityId },

    #[error("Parent {parent_id} is not an item of menu {menu_id}")]
    InvalidParent { menu_id: EntityId, parent_id: EntityId },

    #[error("Moving item {item_id} under {parent_id} would create a cycle")]
    CircularReference { item_id: EntityId, parent_id: EntityId },

    #[error("Menu depth would exceed the maximum of {max}")]
    MaxDepthExceeded { max: usize },

    #[error("Invalid reorder payload: {0}")]
    InvalidReorder(String),

    #[error("Setting not found: {0}")]
    SettingNotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(FieldErrors),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DomainError::MenuNotFound(_)
                | DomainError::MenuItemNotFound(_)
                | DomainError::SettingNotFound(_)
                | DomainError::ItemNotInMenu { .. }
        )
    }
}
