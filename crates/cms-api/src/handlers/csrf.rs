use axum::{extract::State, Extension};
use serde::Serialize;

use super::{ok, ApiResult};
use crate::middleware::AdminClaims;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CsrfTokenResponse {
    pub token: String,
    pub header: &'static str,
}

/// Issue CSRF token - GET /api/v1/admin/csrf-token
pub async fn issue_token(
    State(state): State<AppState>,
    Extension(AdminClaims(claims)): Extension<AdminClaims>,
) -> ApiResult<CsrfTokenResponse> {
    ok(CsrfTokenResponse {
        token: state.csrf.issue(&claims.sub),
        header: cms_shared::constants::CSRF_HEADER,
    })
}
