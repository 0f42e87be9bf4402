// ============================================================================
// CMS Core - Menu Service
// File: crates/cms-core/src/services/menu_service.rs
// ============================================================================
//! Menu management: CRUD, tree reads, reorder, duplicate, export/import

use std::collections::HashSet;
use std::sync::Arc;

use cms_shared::config::MenuSettings;
use cms_shared::utils::truncate_for_log;
use cms_shared::EntityId;
use serde::Serialize;
use tracing::{debug, info, warn};
use validator::Validate;

use crate::domain::{Menu, MenuInput, MenuItem, MenuItemInput, MenuSummary, NewMenuItem};
use crate::error::{DomainError, FieldErrors};
use crate::repositories::MenuRepository;
use crate::tree::hierarchy::{build_hierarchy, depth_of, descendant_ids, sort_items};
use crate::tree::reorder::{apply_updates, validate_payload};
use crate::tree::{flatten_reorder, plan_seed, ExportedItem, Hierarchy, MenuExport, MenuNode, ReorderNode};

/// A menu with its item tree, as the admin editor renders it.
#[derive(Debug, Clone, Serialize)]
pub struct MenuDetail {
    pub menu: Menu,
    pub items: Vec<MenuNode>,
    /// Items unreachable from the roots (dangling parent or cycle).
    pub orphans: Vec<MenuItem>,
}

/// Menu service driving a `MenuRepository`
pub struct MenuService<R: MenuRepository + ?Sized> {
    repo: Arc<R>,
    settings: MenuSettings,
}

impl<R: MenuRepository + ?Sized> MenuService<R> {
    pub fn new(repo: Arc<R>, settings: MenuSettings) -> Self {
        Self { repo, settings }
    }

    pub fn settings(&self) -> &MenuSettings {
        &self.settings
    }

    /// All menus with their item counts
    pub async fn list_menus(&self) -> Result<Vec<MenuSummary>, DomainError> {
        let menus = self.repo.list_menus().await?;
        debug!("Listed {} menus", menus.len());
        Ok(menus)
    }

    /// One menu with its nested item tree
    pub async fn get_menu(&self, id: EntityId) -> Result<MenuDetail, DomainError> {
        let menu = self.require_menu(id).await?;
        let hierarchy = self.load_hierarchy(id).await?;
        Ok(MenuDetail {
            menu,
            items: hierarchy.roots,
            orphans: hierarchy.orphans,
        })
    }

    pub async fn create_menu(&self, input: MenuInput) -> Result<Menu, DomainError> {
        let input = input.normalized();
        input.validate()?;
        self.ensure_name_free(&input.menu_name, None).await?;

        let menu = self.repo.create_menu(&input).await?;
        info!("Menu created: {} ({})", menu.menu_name, menu.id);
        Ok(menu)
    }

    pub async fn update_menu(&self, id: EntityId, input: MenuInput) -> Result<Menu, DomainError> {
        let input = input.normalized();
        input.validate()?;
        self.require_menu(id).await?;
        self.ensure_name_free(&input.menu_name, Some(id)).await?;

        let menu = self.repo.update_menu(id, &input).await?;
        info!("Menu updated: {} ({})", menu.menu_name, menu.id);
        Ok(menu)
    }

    /// Cascading delete of the menu and all of its items
    pub async fn delete_menu(&self, id: EntityId) -> Result<u64, DomainError> {
        let removed = self.repo.delete_menu(id).await?;
        info!("Menu {} deleted together with {} items", id, removed);
        Ok(removed)
    }

    /// Adds an item at the end of its sibling list
    pub async fn add_item(
        &self,
        menu_id: EntityId,
        input: MenuItemInput,
    ) -> Result<MenuItem, DomainError> {
        let input = input.normalized();
        input.validate()?;
        self.require_menu(menu_id).await?;

        if let Some(parent_id) = input.parent_id {
            let items = self.repo.list_items(menu_id).await?;
            if !items.iter().any(|i| i.id == parent_id) {
                warn!("Rejected item for menu {}: parent {} is foreign", menu_id, parent_id);
                return Err(DomainError::InvalidParent { menu_id, parent_id });
            }
            let parent_depth = depth_of(&items, parent_id).ok_or_else(|| {
                DomainError::InvalidParent { menu_id, parent_id }
            })?;
            self.ensure_depth(parent_depth + 1)?;
        }

        let sort_order = self.repo.next_sort_order(menu_id, input.parent_id).await?;
        let item = self
            .repo
            .insert_item(&NewMenuItem::from_input(menu_id, sort_order, &input))
            .await?;

        info!(
            "Menu item created: '{}' ({}) in menu {}",
            truncate_for_log(&item.label, 40),
            item.id,
            menu_id
        );
        Ok(item)
    }

    /// Edits display fields and, optionally, moves the item to a new parent
    pub async fn update_item(
        &self,
        menu_id: EntityId,
        item_id: EntityId,
        input: MenuItemInput,
    ) -> Result<MenuItem, DomainError> {
        let input = input.normalized();
        input.validate()?;
        let mut item = self.require_item(menu_id, item_id).await?;

        let parent_changed = item.parent_id != input.parent_id;
        if parent_changed {
            if let Some(parent_id) = input.parent_id {
                let items = self.repo.list_items(menu_id).await?;
                self.check_move(&items, menu_id, item_id, parent_id)?;
            }
        }

        item.apply(&input);
        if parent_changed {
            item.sort_order = self.repo.next_sort_order(menu_id, item.parent_id).await?;
        }

        let updated = self.repo.update_item(&item).await?;
        info!("Menu item updated: {} in menu {}", updated.id, menu_id);
        Ok(updated)
    }

    /// Deletes the item and its whole subtree
    pub async fn delete_item(
        &self,
        menu_id: EntityId,
        item_id: EntityId,
    ) -> Result<Vec<EntityId>, DomainError> {
        self.require_item(menu_id, item_id).await?;
        let removed = self.repo.delete_item_cascade(item_id).await?;
        info!(
            "Menu item {} deleted from menu {} ({} rows)",
            item_id,
            menu_id,
            removed.len()
        );
        Ok(removed)
    }

    /// Applies a drag-and-drop hierarchy in one transaction
    pub async fn reorder_items(
        &self,
        menu_id: EntityId,
        payload: &[ReorderNode],
    ) -> Result<u64, DomainError> {
        self.require_menu(menu_id).await?;
        let items = self.repo.list_items(menu_id).await?;
        let known: HashSet<EntityId> = items.iter().map(|i| i.id).collect();

        if let Err(e) = validate_payload(payload, &known) {
            warn!("Rejected reorder for menu {}: {}", menu_id, e);
            return Err(e);
        }

        let updates = flatten_reorder(payload, self.settings.sort_scheme);
        let mut prospective = apply_updates(&items, &updates);
        sort_items(&mut prospective);
        self.ensure_depth(build_hierarchy(prospective).max_depth())?;

        let changed = self.repo.apply_reorder(menu_id, &updates).await?;
        info!(
            "Reordered menu {}: {} items ({} scheme)",
            menu_id,
            changed,
            self.settings.sort_scheme.as_str()
        );
        Ok(changed)
    }

    /// Deep copy of a menu under a new unique name
    pub async fn duplicate_menu(
        &self,
        source_id: EntityId,
        new_name: &str,
    ) -> Result<Menu, DomainError> {
        let source = self.require_menu(source_id).await?;
        let input = MenuInput::new(new_name, source.description.clone());
        input.validate()?;
        self.ensure_name_free(&input.menu_name, None).await?;

        let copy = self.repo.duplicate_menu(source_id, &input.menu_name).await?;
        info!(
            "Menu {} duplicated as '{}' ({})",
            source_id, copy.menu_name, copy.id
        );
        Ok(copy)
    }

    /// JSON document describing the menu's tree
    pub async fn export_menu(&self, id: EntityId) -> Result<MenuExport, DomainError> {
        let menu = self.require_menu(id).await?;
        let hierarchy = self.load_hierarchy(id).await?;
        Ok(MenuExport::from_tree(&menu, &hierarchy.roots))
    }

    /// Creates a new menu from an export document. `menu_name` overrides the
    /// document's name when given.
    pub async fn import_menu(
        &self,
        document: MenuExport,
        menu_name: Option<String>,
    ) -> Result<Menu, DomainError> {
        let input = MenuInput::new(
            menu_name.unwrap_or_else(|| document.menu_name.clone()),
            document.description.clone(),
        );
        input.validate()?;
        validate_exported_items(&document.items)?;
        self.ensure_depth(document.max_depth())?;
        self.ensure_name_free(&input.menu_name, None).await?;

        let seed = plan_seed(&document.items, self.settings.sort_scheme);
        let menu = self.repo.create_menu_with_items(&input, &seed).await?;
        info!(
            "Menu imported: {} ({}) with {} items",
            menu.menu_name,
            menu.id,
            seed.len()
        );
        Ok(menu)
    }

    async fn load_hierarchy(&self, menu_id: EntityId) -> Result<Hierarchy, DomainError> {
        let mut items = self.repo.list_items(menu_id).await?;
        sort_items(&mut items);
        let hierarchy = build_hierarchy(items);
        if !hierarchy.orphans.is_empty() {
            let ids: Vec<EntityId> = hierarchy.orphans.iter().map(|i| i.id).collect();
            warn!("Menu {} has unreachable items: {:?}", menu_id, ids);
        }
        Ok(hierarchy)
    }

    async fn require_menu(&self, id: EntityId) -> Result<Menu, DomainError> {
        self.repo
            .find_menu(id)
            .await?
            .ok_or(DomainError::MenuNotFound(id))
    }

    async fn require_item(
        &self,
        menu_id: EntityId,
        item_id: EntityId,
    ) -> Result<MenuItem, DomainError> {
        let item = self
            .repo
            .find_item(item_id)
            .await?
            .ok_or(DomainError::MenuItemNotFound(item_id))?;
        if item.menu_id != menu_id {
            return Err(DomainError::ItemNotInMenu { menu_id, item_id });
        }
        Ok(item)
    }

    async fn ensure_name_free(
        &self,
        menu_name: &str,
        except: Option<EntityId>,
    ) -> Result<(), DomainError> {
        match self.repo.find_menu_by_name(menu_name).await? {
            Some(existing) if Some(existing.id) != except => {
                warn!("Menu name already taken: {}", menu_name);
                Err(DomainError::MenuNameAlreadyExists(menu_name.to_string()))
            }
            _ => Ok(()),
        }
    }

    fn ensure_depth(&self, depth: usize) -> Result<(), DomainError> {
        if depth > self.settings.max_depth {
            return Err(DomainError::MaxDepthExceeded {
                max: self.settings.max_depth,
            });
        }
        Ok(())
    }

    fn check_move(
        &self,
        items: &[MenuItem],
        menu_id: EntityId,
        item_id: EntityId,
        parent_id: EntityId,
    ) -> Result<(), DomainError> {
        if !items.iter().any(|i| i.id == parent_id) {
            return Err(DomainError::InvalidParent { menu_id, parent_id });
        }
        if parent_id == item_id || descendant_ids(items, item_id).contains(&parent_id) {
            warn!("Rejected move of {} under {}: cycle", item_id, parent_id);
            return Err(DomainError::CircularReference { item_id, parent_id });
        }

        let mut prospective: Vec<MenuItem> = items
            .iter()
            .cloned()
            .map(|mut i| {
                if i.id == item_id {
                    i.parent_id = Some(parent_id);
                }
                i
            })
            .collect();
        sort_items(&mut prospective);
        let parent_depth = depth_of(&prospective, parent_id)
            .ok_or(DomainError::InvalidParent { menu_id, parent_id })?;
        let hierarchy = build_hierarchy(prospective);
        let moved_height = find_node(&hierarchy.roots, item_id)
            .map(MenuNode::height)
            .ok_or(DomainError::InvalidParent { menu_id, parent_id })?;
        self.ensure_depth(parent_depth + moved_height)
    }
}

fn find_node(nodes: &[MenuNode], id: EntityId) -> Option<&MenuNode> {
    nodes.iter().find_map(|node| {
        if node.item.id == id {
            Some(node)
        } else {
            find_node(&node.children, id)
        }
    })
}

fn validate_exported_items(items: &[ExportedItem]) -> Result<(), DomainError> {
    fn visit(items: &[ExportedItem], path: &str, errors: &mut FieldErrors) {
        for (index, item) in items.iter().enumerate() {
            let here = format!("{}[{}]", path, index);
            if let Err(e) = item.to_input().validate() {
                for (field, messages) in FieldErrors::from(e).fields() {
                    for message in messages {
                        errors.add(&format!("{}.{}", here, field), message.clone());
                    }
                }
            }
            visit(&item.children, &format!("{}.children", here), errors);
        }
    }

    let mut errors = FieldErrors::new();
    visit(items, "items", &mut errors);
    errors.into_result()
}
