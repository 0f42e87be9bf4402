//! Menu repository trait (port)
//!
//! Every method that writes more than one row runs in a single transaction:
//! on error nothing it did is visible afterwards.

use async_trait::async_trait;
use cms_shared::EntityId;

use crate::domain::{Menu, MenuInput, MenuItem, MenuSummary, NewMenuItem};
use crate::error::DomainError;
use crate::tree::{ReorderUpdate, SeedItem};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MenuRepository: Send + Sync {
    async fn list_menus(&self) -> Result<Vec<MenuSummary>, DomainError>;
    async fn find_menu(&self, id: EntityId) -> Result<Option<Menu>, DomainError>;
    async fn find_menu_by_name(&self, menu_name: &str) -> Result<Option<Menu>, DomainError>;
    async fn create_menu(&self, input: &MenuInput) -> Result<Menu, DomainError>;
    async fn update_menu(&self, id: EntityId, input: &MenuInput) -> Result<Menu, DomainError>;

    /// Removes every item of the menu, then the menu. Returns the number of
    /// items removed; `MenuNotFound` when the menu does not exist.
    async fn delete_menu(&self, id: EntityId) -> Result<u64, DomainError>;

    /// Items of one menu ordered by `sort_order`, then `label`.
    async fn list_items(&self, menu_id: EntityId) -> Result<Vec<MenuItem>, DomainError>;
    async fn count_items(&self, menu_id: EntityId) -> Result<i64, DomainError>;
    async fn find_item(&self, id: EntityId) -> Result<Option<MenuItem>, DomainError>;

    /// One past the highest `sort_order` among the given parent's children
    /// (1 for an empty level).
    async fn next_sort_order(
        &self,
        menu_id: EntityId,
        parent_id: Option<EntityId>,
    ) -> Result<i32, DomainError>;

    async fn insert_item(&self, item: &NewMenuItem) -> Result<MenuItem, DomainError>;
    async fn update_item(&self, item: &MenuItem) -> Result<MenuItem, DomainError>;

    /// Deletes the item and all of its descendants. Returns the removed ids,
    /// descendants first and the item itself last.
    async fn delete_item_cascade(&self, id: EntityId) -> Result<Vec<EntityId>, DomainError>;

    /// Applies the updates to items of `menu_id` atomically. Returns the
    /// number of rows changed.
    async fn apply_reorder(
        &self,
        menu_id: EntityId,
        updates: &[ReorderUpdate],
    ) -> Result<u64, DomainError>;

    /// Two-pass deep copy of a menu under a new name.
    async fn duplicate_menu(
        &self,
        source_id: EntityId,
        new_name: &str,
    ) -> Result<Menu, DomainError>;

    /// Creates a menu and inserts a pre-ordered seed plan.
    async fn create_menu_with_items(
        &self,
        input: &MenuInput,
        seed: &[SeedItem],
    ) -> Result<Menu, DomainError>;
}
