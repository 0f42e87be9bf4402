use std::collections::HashMap;

use axum::extract::{Path, State};
use cms_core::domain::Setting;
use serde::Deserialize;

use super::{ok, ApiResult};
use crate::extract::ApiJson;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SettingValue {
    pub value: String,
}

/// All settings - GET /api/v1/admin/settings
pub async fn list_settings(State(state): State<AppState>) -> ApiResult<HashMap<String, String>> {
    ok(state.settings.all().await?)
}

/// Write one setting - PUT /api/v1/admin/settings/{key}
pub async fn put_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
    ApiJson(payload): ApiJson<SettingValue>,
) -> ApiResult<Setting> {
    ok(state.settings.set(&key, &payload.value).await?)
}

/// Remove one setting - DELETE /api/v1/admin/settings/{key}
pub async fn delete_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<()> {
    state.settings.remove(&key).await?;
    ok(())
}
