// ============================================================================
// CMS Infrastructure - In-Memory Menu Repository
// File: crates/cms-infrastructure/src/database/memory/menu_repo_impl.rs
// ============================================================================

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use cms_core::domain::{Menu, MenuInput, MenuItem, MenuSummary, NewMenuItem};
use cms_core::error::DomainError;
use cms_core::repositories::MenuRepository;
use cms_core::tree::{descendant_ids, parent_remaps, sort_items, ReorderUpdate, SeedItem};
use cms_shared::EntityId;

#[derive(Debug, Clone, Default)]
struct MenuState {
    menus: BTreeMap<EntityId, Menu>,
    items: BTreeMap<EntityId, MenuItem>,
    last_menu_id: EntityId,
    last_item_id: EntityId,
}

impl MenuState {
    fn name_taken(&self, menu_name: &str, except: Option<EntityId>) -> bool {
        let wanted = menu_name.to_lowercase();
        self.menus
            .values()
            .any(|m| Some(m.id) != except && m.menu_name.to_lowercase() == wanted)
    }

    fn items_of(&self, menu_id: EntityId) -> Vec<MenuItem> {
        let mut items: Vec<MenuItem> = self
            .items
            .values()
            .filter(|i| i.menu_id == menu_id)
            .cloned()
            .collect();
        sort_items(&mut items);
        items
    }
}

/// Write handle over a working copy of the state. Every write is charged
/// against the failure budget before it touches the copy.
struct Tx<'a> {
    state: &'a mut MenuState,
    fail_after: &'a Mutex<Option<usize>>,
}

impl Tx<'_> {
    fn charge(&self) -> Result<(), DomainError> {
        let mut budget = self.fail_after.lock();
        match *budget {
            Some(0) => {
                *budget = None;
                warn!("Injected write failure");
                Err(DomainError::DatabaseError("injected write failure".to_string()))
            }
            Some(remaining) => {
                *budget = Some(remaining - 1);
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn insert_menu(&mut self, input: &MenuInput) -> Result<Menu, DomainError> {
        self.charge()?;
        if self.state.name_taken(&input.menu_name, None) {
            return Err(DomainError::MenuNameAlreadyExists(input.menu_name.clone()));
        }
        self.state.last_menu_id += 1;
        let menu = Menu {
            id: self.state.last_menu_id,
            menu_name: input.menu_name.clone(),
            description: input.description.clone(),
            created_at: Utc::now(),
            modified_at: None,
        };
        self.state.menus.insert(menu.id, menu.clone());
        Ok(menu)
    }

    fn insert_item(&mut self, new: &NewMenuItem) -> Result<MenuItem, DomainError> {
        self.charge()?;
        if !self.state.menus.contains_key(&new.menu_id) {
            return Err(DomainError::DatabaseError(format!(
                "foreign key violation: menu {} does not exist",
                new.menu_id
            )));
        }
        if let Some(parent) = new.parent_id {
            if !self.state.items.contains_key(&parent) {
                return Err(DomainError::DatabaseError(format!(
                    "foreign key violation: menu item {} does not exist",
                    parent
                )));
            }
        }
        self.state.last_item_id += 1;
        let item = MenuItem {
            id: self.state.last_item_id,
            menu_id: new.menu_id,
            parent_id: new.parent_id,
            sort_order: new.sort_order,
            label: new.label.clone(),
            link: new.link.clone(),
            target: new.target.clone(),
            css_class: new.css_class.clone(),
            created_at: Utc::now(),
            modified_at: None,
        };
        self.state.items.insert(item.id, item.clone());
        Ok(item)
    }

    fn set_parent(&mut self, id: EntityId, parent_id: Option<EntityId>) -> Result<(), DomainError> {
        self.charge()?;
        let item = self
            .state
            .items
            .get_mut(&id)
            .ok_or(DomainError::MenuItemNotFound(id))?;
        item.parent_id = parent_id;
        Ok(())
    }

    fn remove_item(&mut self, id: EntityId) -> Result<(), DomainError> {
        self.charge()?;
        self.state.items.remove(&id);
        Ok(())
    }
}

/// Menu store kept in process memory.
#[derive(Default)]
pub struct InMemoryMenuRepository {
    state: Mutex<MenuState>,
    fail_after: Mutex<Option<usize>>,
}

impl InMemoryMenuRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the write after the next `writes` successful ones fail with a
    /// database error. Fires once.
    pub fn inject_failure_after(&self, writes: usize) {
        *self.fail_after.lock() = Some(writes);
    }

    /// Runs `op` on a working copy and commits it only on success.
    fn transaction<T>(
        &self,
        op: impl FnOnce(&mut Tx<'_>) -> Result<T, DomainError>,
    ) -> Result<T, DomainError> {
        let mut committed = self.state.lock();
        let mut working = committed.clone();
        let result = op(&mut Tx {
            state: &mut working,
            fail_after: &self.fail_after,
        });
        if result.is_ok() {
            *committed = working;
        } else {
            debug!("In-memory transaction rolled back");
        }
        result
    }
}

#[async_trait]
impl MenuRepository for InMemoryMenuRepository {
    async fn list_menus(&self) -> Result<Vec<MenuSummary>, DomainError> {
        let state = self.state.lock();
        let mut counts: HashMap<EntityId, i64> = HashMap::new();
        for item in state.items.values() {
            *counts.entry(item.menu_id).or_default() += 1;
        }
        let mut menus: Vec<MenuSummary> = state
            .menus
            .values()
            .map(|m| MenuSummary {
                id: m.id,
                menu_name: m.menu_name.clone(),
                description: m.description.clone(),
                item_count: counts.get(&m.id).copied().unwrap_or(0),
            })
            .collect();
        menus.sort_by(|a, b| a.menu_name.cmp(&b.menu_name));
        Ok(menus)
    }

    async fn find_menu(&self, id: EntityId) -> Result<Option<Menu>, DomainError> {
        Ok(self.state.lock().menus.get(&id).cloned())
    }

    async fn find_menu_by_name(&self, menu_name: &str) -> Result<Option<Menu>, DomainError> {
        let wanted = menu_name.to_lowercase();
        Ok(self
            .state
            .lock()
            .menus
            .values()
            .find(|m| m.menu_name.to_lowercase() == wanted)
            .cloned())
    }

    async fn create_menu(&self, input: &MenuInput) -> Result<Menu, DomainError> {
        let menu = self.transaction(|tx| tx.insert_menu(input))?;
        info!("Menu created: {} ({})", menu.menu_name, menu.id);
        Ok(menu)
    }

    async fn update_menu(&self, id: EntityId, input: &MenuInput) -> Result<Menu, DomainError> {
        self.transaction(|tx| {
            tx.charge()?;
            if tx.state.name_taken(&input.menu_name, Some(id)) {
                return Err(DomainError::MenuNameAlreadyExists(input.menu_name.clone()));
            }
            let menu = tx
                .state
                .menus
                .get_mut(&id)
                .ok_or(DomainError::MenuNotFound(id))?;
            menu.menu_name = input.menu_name.clone();
            menu.description = input.description.clone();
            menu.modified_at = Some(Utc::now());
            Ok(menu.clone())
        })
    }

    async fn delete_menu(&self, id: EntityId) -> Result<u64, DomainError> {
        let removed = self.transaction(|tx| {
            let doomed: Vec<EntityId> = tx.state.items_of(id).iter().map(|i| i.id).collect();
            for item_id in &doomed {
                tx.remove_item(*item_id)?;
            }
            tx.charge()?;
            tx.state
                .menus
                .remove(&id)
                .ok_or(DomainError::MenuNotFound(id))?;
            Ok(doomed.len() as u64)
        })?;
        info!("Menu {} deleted with {} items", id, removed);
        Ok(removed)
    }

    async fn list_items(&self, menu_id: EntityId) -> Result<Vec<MenuItem>, DomainError> {
        Ok(self.state.lock().items_of(menu_id))
    }

    async fn count_items(&self, menu_id: EntityId) -> Result<i64, DomainError> {
        let state = self.state.lock();
        Ok(state.items.values().filter(|i| i.menu_id == menu_id).count() as i64)
    }

    async fn find_item(&self, id: EntityId) -> Result<Option<MenuItem>, DomainError> {
        Ok(self.state.lock().items.get(&id).cloned())
    }

    async fn next_sort_order(
        &self,
        menu_id: EntityId,
        parent_id: Option<EntityId>,
    ) -> Result<i32, DomainError> {
        let state = self.state.lock();
        let highest = state
            .items
            .values()
            .filter(|i| i.menu_id == menu_id && i.parent_id == parent_id)
            .map(|i| i.sort_order)
            .max()
            .unwrap_or(0);
        Ok(highest + 1)
    }

    async fn insert_item(&self, item: &NewMenuItem) -> Result<MenuItem, DomainError> {
        let created = self.transaction(|tx| tx.insert_item(item))?;
        debug!("Menu item {} added to menu {}", created.id, created.menu_id);
        Ok(created)
    }

    async fn update_item(&self, item: &MenuItem) -> Result<MenuItem, DomainError> {
        self.transaction(|tx| {
            tx.charge()?;
            let stored = tx
                .state
                .items
                .get_mut(&item.id)
                .ok_or(DomainError::MenuItemNotFound(item.id))?;
            *stored = MenuItem {
                created_at: stored.created_at,
                modified_at: Some(Utc::now()),
                ..item.clone()
            };
            Ok(stored.clone())
        })
    }

    async fn delete_item_cascade(&self, id: EntityId) -> Result<Vec<EntityId>, DomainError> {
        self.transaction(|tx| {
            let item = tx
                .state
                .items
                .get(&id)
                .cloned()
                .ok_or(DomainError::MenuItemNotFound(id))?;
            let siblings = tx.state.items_of(item.menu_id);
            let mut removed = descendant_ids(&siblings, id);
            for child in &removed {
                tx.remove_item(*child)?;
            }
            tx.remove_item(id)?;
            removed.push(id);
            Ok(removed)
        })
    }

    async fn apply_reorder(
        &self,
        menu_id: EntityId,
        updates: &[ReorderUpdate],
    ) -> Result<u64, DomainError> {
        self.transaction(|tx| {
            let now = Utc::now();
            for update in updates {
                tx.charge()?;
                let item = tx
                    .state
                    .items
                    .get_mut(&update.item_id)
                    .filter(|i| i.menu_id == menu_id)
                    .ok_or(DomainError::ItemNotInMenu {
                        menu_id,
                        item_id: update.item_id,
                    })?;
                item.parent_id = update.parent_id;
                item.sort_order = update.sort_order;
                item.modified_at = Some(now);
            }
            Ok(updates.len() as u64)
        })
    }

    async fn duplicate_menu(
        &self,
        source_id: EntityId,
        new_name: &str,
    ) -> Result<Menu, DomainError> {
        let (copy, copied) = self.transaction(|tx| {
            let source = tx
                .state
                .menus
                .get(&source_id)
                .cloned()
                .ok_or(DomainError::MenuNotFound(source_id))?;
            let copy = tx.insert_menu(&MenuInput::new(new_name, source.description))?;
            let originals = tx.state.items_of(source_id);

            let mut id_map: HashMap<EntityId, EntityId> = HashMap::with_capacity(originals.len());
            for item in &originals {
                let inserted = tx.insert_item(&NewMenuItem::detached_copy(item, copy.id))?;
                id_map.insert(item.id, inserted.id);
            }
            for (new_id, new_parent) in parent_remaps(&originals, &id_map) {
                tx.set_parent(new_id, Some(new_parent))?;
            }
            Ok((copy, originals.len()))
        })?;
        info!(
            "Menu {} duplicated as {} ({}) with {} items",
            source_id, copy.menu_name, copy.id, copied
        );
        Ok(copy)
    }

    async fn create_menu_with_items(
        &self,
        input: &MenuInput,
        seed: &[SeedItem],
    ) -> Result<Menu, DomainError> {
        let menu = self.transaction(|tx| {
            let menu = tx.insert_menu(input)?;
            let mut inserted: HashMap<usize, EntityId> = HashMap::with_capacity(seed.len());
            for entry in seed {
                let parent_id = match entry.parent_key {
                    Some(key) => Some(*inserted.get(&key).ok_or_else(|| {
                        DomainError::InternalError(format!("seed parent {} not inserted yet", key))
                    })?),
                    None => None,
                };
                let item = tx.insert_item(&entry.to_new_item(menu.id, parent_id))?;
                inserted.insert(entry.key, item.id);
            }
            Ok(menu)
        })?;
        info!("Menu {} imported with {} items", menu.menu_name, seed.len());
        Ok(menu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cms_core::domain::MenuItemInput;

    async fn seeded() -> (InMemoryMenuRepository, Menu, Vec<MenuItem>) {
        let repo = InMemoryMenuRepository::new();
        let menu = repo.create_menu(&MenuInput::new("main", None)).await.unwrap();
        let galleries = repo
            .insert_item(&NewMenuItem::from_input(menu.id, 1, &MenuItemInput::new("Galleries", "/galleries")))
            .await
            .unwrap();
        let portraits = repo
            .insert_item(&NewMenuItem::from_input(
                menu.id,
                101,
                &MenuItemInput::new("Portraits", "/galleries/portraits").with_parent(galleries.id),
            ))
            .await
            .unwrap();
        (repo, menu, vec![galleries, portraits])
    }

    #[tokio::test]
    async fn test_names_unique_case_insensitive() {
        let (repo, _, _) = seeded().await;
        let err = repo.create_menu(&MenuInput::new("MAIN", None)).await.unwrap_err();
        assert!(matches!(err, DomainError::MenuNameAlreadyExists(_)));
        assert!(repo.find_menu_by_name("Main").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_insert_rejects_missing_parent() {
        let (repo, menu, _) = seeded().await;
        let orphan = NewMenuItem::from_input(menu.id, 1, &MenuItemInput::new("Lost", "/lost").with_parent(999));
        assert!(matches!(
            repo.insert_item(&orphan).await,
            Err(DomainError::DatabaseError(_))
        ));
        assert_eq!(repo.count_items(menu.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_next_sort_order_per_level() {
        let (repo, menu, items) = seeded().await;
        assert_eq!(repo.next_sort_order(menu.id, None).await.unwrap(), 2);
        assert_eq!(repo.next_sort_order(menu.id, Some(items[0].id)).await.unwrap(), 102);
        assert_eq!(repo.next_sort_order(menu.id, Some(items[1].id)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_cascade_returns_descendants_first() {
        let (repo, menu, items) = seeded().await;
        let removed = repo.delete_item_cascade(items[0].id).await.unwrap();
        assert_eq!(removed, vec![items[1].id, items[0].id]);
        assert_eq!(repo.count_items(menu.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_injected_failure_rolls_back_duplicate() {
        let (repo, menu, _) = seeded().await;
        // menu row + first item succeed, second item fails
        repo.inject_failure_after(2);
        let err = repo.duplicate_menu(menu.id, "main copy").await.unwrap_err();
        assert!(matches!(err, DomainError::DatabaseError(_)));
        assert!(repo.find_menu_by_name("main copy").await.unwrap().is_none());
        assert_eq!(repo.list_menus().await.unwrap().len(), 1);

        // budget is spent; the retry goes through
        let copy = repo.duplicate_menu(menu.id, "main copy").await.unwrap();
        assert_eq!(repo.count_items(copy.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_reorder_rejects_foreign_item() {
        let (repo, menu, items) = seeded().await;
        let other = repo.create_menu(&MenuInput::new("footer", None)).await.unwrap();
        let updates = [
            ReorderUpdate { item_id: items[1].id, parent_id: None, sort_order: 1 },
            ReorderUpdate { item_id: items[0].id, parent_id: None, sort_order: 2 },
        ];
        assert!(matches!(
            repo.apply_reorder(other.id, &updates).await,
            Err(DomainError::ItemNotInMenu { .. })
        ));
        let unchanged = repo.find_item(items[1].id).await.unwrap().unwrap();
        assert_eq!(unchanged.parent_id, Some(items[0].id));

        assert_eq!(repo.apply_reorder(menu.id, &updates).await.unwrap(), 2);
        let moved = repo.find_item(items[1].id).await.unwrap().unwrap();
        assert!(moved.is_root());
    }
}
