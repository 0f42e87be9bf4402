// ============================================================================
// CMS API - Menu Handlers
// File: crates/cms-api/src/handlers/menus.rs
// ============================================================================
//! Menu-level HTTP handlers (list, fetch, create, update, delete, duplicate,
//! export, import)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use cms_core::domain::{Menu, MenuInput, MenuSummary};
use cms_core::services::MenuDetail;
use cms_core::tree::{ExportedItem, MenuExport, EXPORT_FORMAT_VERSION};
use cms_shared::EntityId;
use serde::{Deserialize, Serialize};

use super::{ok, ApiResult};
use crate::extract::ApiJson;
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Create menu payload. A non-empty `items` tree seeds the menu in the same
/// transaction.
#[derive(Debug, Deserialize)]
pub struct CreateMenuRequest {
    pub menu_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub items: Vec<ExportedItem>,
}

#[derive(Debug, Deserialize)]
pub struct DuplicateMenuRequest {
    pub menu_name: String,
}

#[derive(Debug, Deserialize)]
pub struct ImportParams {
    /// Overrides the document's menu name
    pub menu_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MenuDeleted {
    pub id: EntityId,
    pub deleted_items: u64,
}

type Created<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

fn created<T: Serialize>(data: T) -> Created<T> {
    Ok((StatusCode::CREATED, Json(ApiResponse::success(data))))
}

/// List menus - GET /api/v1/admin/menus
pub async fn list_menus(State(state): State<AppState>) -> ApiResult<Vec<MenuSummary>> {
    ok(state.menus.list_menus().await?)
}

/// Fetch menu with tree - GET /api/v1/admin/menus/{id}
pub async fn get_menu(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> ApiResult<MenuDetail> {
    ok(state.menus.get_menu(id).await?)
}

/// Create menu - POST /api/v1/admin/menus
pub async fn create_menu(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateMenuRequest>,
) -> Created<Menu> {
    let menu = if payload.items.is_empty() {
        state
            .menus
            .create_menu(MenuInput {
                menu_name: payload.menu_name,
                description: payload.description,
            })
            .await?
    } else {
        let document = MenuExport {
            format_version: EXPORT_FORMAT_VERSION,
            menu_name: payload.menu_name,
            description: payload.description,
            exported_at: chrono::Utc::now(),
            items: payload.items,
        };
        state.menus.import_menu(document, None).await?
    };
    created(menu)
}

/// Update menu - PUT /api/v1/admin/menus/{id}
pub async fn update_menu(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    ApiJson(payload): ApiJson<MenuInput>,
) -> ApiResult<Menu> {
    ok(state.menus.update_menu(id, payload).await?)
}

/// Delete menu and its items - DELETE /api/v1/admin/menus/{id}
pub async fn delete_menu(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> ApiResult<MenuDeleted> {
    let deleted_items = state.menus.delete_menu(id).await?;
    ok(MenuDeleted { id, deleted_items })
}

/// Duplicate menu - POST /api/v1/admin/menus/{id}/duplicate
pub async fn duplicate_menu(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    ApiJson(payload): ApiJson<DuplicateMenuRequest>,
) -> Created<Menu> {
    created(state.menus.duplicate_menu(id, &payload.menu_name).await?)
}

/// Export menu document - GET /api/v1/admin/menus/{id}/export
pub async fn export_menu(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> ApiResult<MenuExport> {
    ok(state.menus.export_menu(id).await?)
}

/// Import menu document - POST /api/v1/admin/menus/import
pub async fn import_menu(
    State(state): State<AppState>,
    Query(params): Query<ImportParams>,
    ApiJson(document): ApiJson<MenuExport>,
) -> Created<Menu> {
    created(state.menus.import_menu(document, params.menu_name).await?)
}
