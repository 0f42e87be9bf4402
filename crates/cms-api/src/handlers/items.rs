// ============================================================================
// CMS API - Menu Item Handlers
// File: crates/cms-api/src/handlers/items.rs
// ============================================================================

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use cms_core::domain::{MenuItem, MenuItemInput};
use cms_core::tree::ReorderNode;
use cms_shared::EntityId;
use serde::Serialize;

use super::{ok, ApiResult};
use crate::extract::ApiJson;
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ItemsDeleted {
    pub deleted_ids: Vec<EntityId>,
}

#[derive(Debug, Serialize)]
pub struct Reordered {
    pub updated: u64,
}

/// Add item - POST /api/v1/admin/menus/{id}/items
pub async fn add_item(
    State(state): State<AppState>,
    Path(menu_id): Path<EntityId>,
    ApiJson(payload): ApiJson<MenuItemInput>,
) -> Result<(StatusCode, Json<ApiResponse<MenuItem>>), ApiError> {
    let item = state.menus.add_item(menu_id, payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(item))))
}

/// Update item - PUT /api/v1/admin/menus/{id}/items/{item_id}
pub async fn update_item(
    State(state): State<AppState>,
    Path((menu_id, item_id)): Path<(EntityId, EntityId)>,
    ApiJson(payload): ApiJson<MenuItemInput>,
) -> ApiResult<MenuItem> {
    ok(state.menus.update_item(menu_id, item_id, payload).await?)
}

/// Delete item subtree - DELETE /api/v1/admin/menus/{id}/items/{item_id}
pub async fn delete_item(
    State(state): State<AppState>,
    Path((menu_id, item_id)): Path<(EntityId, EntityId)>,
) -> ApiResult<ItemsDeleted> {
    let deleted_ids = state.menus.delete_item(menu_id, item_id).await?;
    ok(ItemsDeleted { deleted_ids })
}

/// Bulk reorder - POST /api/v1/admin/menus/{id}/reorder
///
/// Body is the nested `[{id, children: [...]}]` structure from the editor.
pub async fn reorder_items(
    State(state): State<AppState>,
    Path(menu_id): Path<EntityId>,
    ApiJson(payload): ApiJson<Vec<ReorderNode>>,
) -> ApiResult<Reordered> {
    let updated = state.menus.reorder_items(menu_id, &payload).await?;
    ok(Reordered { updated })
}
