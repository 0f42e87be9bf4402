//! HTTP handlers

pub mod csrf;
pub mod health;
pub mod items;
pub mod menus;
pub mod settings;

use axum::Json;
use serde::Serialize;

use crate::error::ApiError;
use crate::response::ApiResponse;

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

pub(crate) fn ok<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}
