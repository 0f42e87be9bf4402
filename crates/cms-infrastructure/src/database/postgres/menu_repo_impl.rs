// ============================================================================
// CMS Infrastructure - PostgreSQL Menu Repository
// File: crates/cms-infrastructure/src/database/postgres/menu_repo_impl.rs
// ============================================================================

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Executor, FromRow, PgPool, Postgres};
use tracing::{debug, info};

use cms_core::domain::{Menu, MenuInput, MenuItem, MenuSummary, NewMenuItem};
use cms_core::error::DomainError;
use cms_core::repositories::MenuRepository;
use cms_core::tree::{parent_remaps, ReorderUpdate, SeedItem};
use cms_shared::EntityId;

use super::{db_error, is_unique_violation};

pub struct PgMenuRepository {
    pool: PgPool,
}

impl PgMenuRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row types for SQLx mapping
#[derive(Debug, FromRow)]
struct MenuRow {
    pub id: i64,
    pub menu_name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl From<MenuRow> for Menu {
    fn from(row: MenuRow) -> Self {
        Menu {
            id: row.id,
            menu_name: row.menu_name,
            description: row.description,
            created_at: row.created_at,
            modified_at: row.modified_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct MenuSummaryRow {
    pub id: i64,
    pub menu_name: String,
    pub description: Option<String>,
    pub item_count: i64,
}

impl From<MenuSummaryRow> for MenuSummary {
    fn from(row: MenuSummaryRow) -> Self {
        MenuSummary {
            id: row.id,
            menu_name: row.menu_name,
            description: row.description,
            item_count: row.item_count,
        }
    }
}

#[derive(Debug, FromRow)]
struct MenuItemRow {
    pub id: i64,
    pub menu_id: i64,
    pub parent_id: Option<i64>,
    pub sort_order: i32,
    pub label: String,
    pub link: String,
    pub target: String,
    pub css_class: Option<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl From<MenuItemRow> for MenuItem {
    fn from(row: MenuItemRow) -> Self {
        MenuItem {
            id: row.id,
            menu_id: row.menu_id,
            parent_id: row.parent_id,
            sort_order: row.sort_order,
            label: row.label,
            link: row.link,
            target: row.target,
            css_class: row.css_class,
            created_at: row.created_at,
            modified_at: row.modified_at,
        }
    }
}

fn name_conflict(menu_name: &str) -> impl FnOnce(sqlx::Error) -> DomainError + '_ {
    move |e| {
        if is_unique_violation(&e) {
            DomainError::MenuNameAlreadyExists(menu_name.to_string())
        } else {
            db_error("inserting menu")(e)
        }
    }
}

async fn insert_menu_row<'e, E>(executor: E, input: &MenuInput) -> Result<MenuRow, DomainError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        INSERT INTO menus (menu_name, description)
        VALUES ($1, $2)
        RETURNING id, menu_name, description, created_at, modified_at
        "#,
    )
    .bind(&input.menu_name)
    .bind(&input.description)
    .fetch_one(executor)
    .await
    .map_err(name_conflict(&input.menu_name))
}

async fn insert_item_row<'e, E>(executor: E, item: &NewMenuItem) -> Result<MenuItemRow, DomainError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        INSERT INTO menu_items (menu_id, parent_id, sort_order, label, link, target, css_class)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, menu_id, parent_id, sort_order, label, link, target, css_class,
                  created_at, modified_at
        "#,
    )
    .bind(item.menu_id)
    .bind(item.parent_id)
    .bind(item.sort_order)
    .bind(&item.label)
    .bind(&item.link)
    .bind(&item.target)
    .bind(&item.css_class)
    .fetch_one(executor)
    .await
    .map_err(db_error("inserting menu item"))
}

async fn select_items<'e, E>(executor: E, menu_id: EntityId) -> Result<Vec<MenuItemRow>, DomainError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        SELECT id, menu_id, parent_id, sort_order, label, link, target, css_class,
               created_at, modified_at
        FROM menu_items
        WHERE menu_id = $1
        ORDER BY sort_order, label, id
        "#,
    )
    .bind(menu_id)
    .fetch_all(executor)
    .await
    .map_err(db_error("listing menu items"))
}

#[async_trait]
impl MenuRepository for PgMenuRepository {
    async fn list_menus(&self) -> Result<Vec<MenuSummary>, DomainError> {
        let rows: Vec<MenuSummaryRow> = sqlx::query_as(
            r#"
            SELECT m.id, m.menu_name, m.description, COUNT(i.id) AS item_count
            FROM menus m
            LEFT JOIN menu_items i ON i.menu_id = m.id
            GROUP BY m.id, m.menu_name, m.description
            ORDER BY m.menu_name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("listing menus"))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_menu(&self, id: EntityId) -> Result<Option<Menu>, DomainError> {
        let row: Option<MenuRow> = sqlx::query_as(
            r#"
            SELECT id, menu_name, description, created_at, modified_at
            FROM menus
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("finding menu by id"))?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_menu_by_name(&self, menu_name: &str) -> Result<Option<Menu>, DomainError> {
        let row: Option<MenuRow> = sqlx::query_as(
            r#"
            SELECT id, menu_name, description, created_at, modified_at
            FROM menus
            WHERE LOWER(menu_name) = LOWER($1)
            "#,
        )
        .bind(menu_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("finding menu by name"))?;

        Ok(row.map(|r| r.into()))
    }

    async fn create_menu(&self, input: &MenuInput) -> Result<Menu, DomainError> {
        let row = insert_menu_row(&self.pool, input).await?;
        info!("Menu created: {} ({})", row.menu_name, row.id);
        Ok(row.into())
    }

    async fn update_menu(&self, id: EntityId, input: &MenuInput) -> Result<Menu, DomainError> {
        let row: Option<MenuRow> = sqlx::query_as(
            r#"
            UPDATE menus
            SET menu_name = $2, description = $3, modified_at = NOW()
            WHERE id = $1
            RETURNING id, menu_name, description, created_at, modified_at
            "#,
        )
        .bind(id)
        .bind(&input.menu_name)
        .bind(&input.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(name_conflict(&input.menu_name))?;

        row.map(Into::into).ok_or(DomainError::MenuNotFound(id))
    }

    async fn delete_menu(&self, id: EntityId) -> Result<u64, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error("starting transaction"))?;

        let items = sqlx::query("DELETE FROM menu_items WHERE menu_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("deleting menu items"))?
            .rows_affected();

        let menus = sqlx::query("DELETE FROM menus WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("deleting menu"))?
            .rows_affected();

        if menus == 0 {
            // dropping the transaction rolls it back
            return Err(DomainError::MenuNotFound(id));
        }

        tx.commit().await.map_err(db_error("committing menu delete"))?;
        info!("Menu {} deleted with {} items", id, items);
        Ok(items)
    }

    async fn list_items(&self, menu_id: EntityId) -> Result<Vec<MenuItem>, DomainError> {
        let rows = select_items(&self.pool, menu_id).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count_items(&self, menu_id: EntityId) -> Result<i64, DomainError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM menu_items WHERE menu_id = $1")
            .bind(menu_id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("counting menu items"))
    }

    async fn find_item(&self, id: EntityId) -> Result<Option<MenuItem>, DomainError> {
        let row: Option<MenuItemRow> = sqlx::query_as(
            r#"
            SELECT id, menu_id, parent_id, sort_order, label, link, target, css_class,
                   created_at, modified_at
            FROM menu_items
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("finding menu item"))?;

        Ok(row.map(|r| r.into()))
    }

    async fn next_sort_order(
        &self,
        menu_id: EntityId,
        parent_id: Option<EntityId>,
    ) -> Result<i32, DomainError> {
        sqlx::query_scalar(
            r#"
            SELECT COALESCE(MAX(sort_order), 0) + 1
            FROM menu_items
            WHERE menu_id = $1 AND parent_id IS NOT DISTINCT FROM $2
            "#,
        )
        .bind(menu_id)
        .bind(parent_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("computing next sort order"))
    }

    async fn insert_item(&self, item: &NewMenuItem) -> Result<MenuItem, DomainError> {
        let row = insert_item_row(&self.pool, item).await?;
        debug!("Menu item {} added to menu {}", row.id, row.menu_id);
        Ok(row.into())
    }

    async fn update_item(&self, item: &MenuItem) -> Result<MenuItem, DomainError> {
        let row: Option<MenuItemRow> = sqlx::query_as(
            r#"
            UPDATE menu_items
            SET parent_id = $2, sort_order = $3, label = $4, link = $5,
                target = $6, css_class = $7, modified_at = NOW()
            WHERE id = $1
            RETURNING id, menu_id, parent_id, sort_order, label, link, target, css_class,
                      created_at, modified_at
            "#,
        )
        .bind(item.id)
        .bind(item.parent_id)
        .bind(item.sort_order)
        .bind(&item.label)
        .bind(&item.link)
        .bind(&item.target)
        .bind(&item.css_class)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("updating menu item"))?;

        row.map(Into::into).ok_or(DomainError::MenuItemNotFound(item.id))
    }

    async fn delete_item_cascade(&self, id: EntityId) -> Result<Vec<EntityId>, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error("starting transaction"))?;

        let exists: Option<i64> =
            sqlx::query_scalar("SELECT id FROM menu_items WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_error("locking menu item"))?;
        if exists.is_none() {
            return Err(DomainError::MenuItemNotFound(id));
        }

        let mut seen: HashSet<i64> = HashSet::from([id]);
        let mut descendants: Vec<i64> = Vec::new();
        let mut frontier = vec![id];
        while !frontier.is_empty() {
            let children: Vec<i64> =
                sqlx::query_scalar("SELECT id FROM menu_items WHERE parent_id = ANY($1)")
                    .bind(&frontier)
                    .fetch_all(&mut *tx)
                    .await
                    .map_err(db_error("collecting descendants"))?;
            frontier = children.into_iter().filter(|c| seen.insert(*c)).collect();
            descendants.extend_from_slice(&frontier);
        }

        if !descendants.is_empty() {
            sqlx::query("DELETE FROM menu_items WHERE id = ANY($1)")
                .bind(&descendants)
                .execute(&mut *tx)
                .await
                .map_err(db_error("deleting descendants"))?;
        }

        sqlx::query("DELETE FROM menu_items WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("deleting menu item"))?;

        tx.commit().await.map_err(db_error("committing item delete"))?;

        descendants.push(id);
        Ok(descendants)
    }

    async fn apply_reorder(
        &self,
        menu_id: EntityId,
        updates: &[ReorderUpdate],
    ) -> Result<u64, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error("starting transaction"))?;
        let mut changed = 0;

        for update in updates {
            let result = sqlx::query(
                r#"
                UPDATE menu_items
                SET parent_id = $2, sort_order = $3, modified_at = NOW()
                WHERE id = $1 AND menu_id = $4
                "#,
            )
            .bind(update.item_id)
            .bind(update.parent_id)
            .bind(update.sort_order)
            .bind(menu_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("applying reorder"))?;

            if result.rows_affected() == 0 {
                return Err(DomainError::ItemNotInMenu {
                    menu_id,
                    item_id: update.item_id,
                });
            }
            changed += result.rows_affected();
        }

        tx.commit().await.map_err(db_error("committing reorder"))?;
        Ok(changed)
    }

    async fn duplicate_menu(
        &self,
        source_id: EntityId,
        new_name: &str,
    ) -> Result<Menu, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error("starting transaction"))?;

        let source: Option<MenuRow> = sqlx::query_as(
            r#"
            SELECT id, menu_name, description, created_at, modified_at
            FROM menus
            WHERE id = $1
            "#,
        )
        .bind(source_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("loading source menu"))?;
        let source = source.ok_or(DomainError::MenuNotFound(source_id))?;

        let input = MenuInput::new(new_name, source.description.clone());
        let copy = insert_menu_row(&mut *tx, &input).await?;

        let originals: Vec<MenuItem> = select_items(&mut *tx, source_id)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        // Pass 1: copy every item detached, recording old -> new ids.
        let mut id_map: HashMap<EntityId, EntityId> = HashMap::with_capacity(originals.len());
        for item in &originals {
            let row = insert_item_row(&mut *tx, &NewMenuItem::detached_copy(item, copy.id)).await?;
            id_map.insert(item.id, row.id);
        }

        // Pass 2: point copies at their copied parents.
        for (new_id, new_parent) in parent_remaps(&originals, &id_map) {
            sqlx::query("UPDATE menu_items SET parent_id = $2 WHERE id = $1")
                .bind(new_id)
                .bind(new_parent)
                .execute(&mut *tx)
                .await
                .map_err(db_error("remapping copied parents"))?;
        }

        tx.commit().await.map_err(db_error("committing duplicate"))?;
        info!(
            "Menu {} duplicated as {} ({}) with {} items",
            source_id,
            copy.menu_name,
            copy.id,
            originals.len()
        );
        Ok(copy.into())
    }

    async fn create_menu_with_items(
        &self,
        input: &MenuInput,
        seed: &[SeedItem],
    ) -> Result<Menu, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error("starting transaction"))?;

        let menu = insert_menu_row(&mut *tx, input).await?;

        let mut inserted: HashMap<usize, EntityId> = HashMap::with_capacity(seed.len());
        for entry in seed {
            let parent_id = match entry.parent_key {
                Some(key) => Some(*inserted.get(&key).ok_or_else(|| {
                    DomainError::InternalError(format!("seed parent {} not inserted yet", key))
                })?),
                None => None,
            };
            let row = insert_item_row(&mut *tx, &entry.to_new_item(menu.id, parent_id)).await?;
            inserted.insert(entry.key, row.id);
        }

        tx.commit().await.map_err(db_error("committing import"))?;
        info!("Menu {} imported with {} items", menu.menu_name, seed.len());
        Ok(menu.into())
    }
}
