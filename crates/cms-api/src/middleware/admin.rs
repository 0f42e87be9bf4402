//! Admin gate: bearer JWT with the admin role, plus a CSRF token on every
//! mutating request.

use axum::{
    extract::{Request, State},
    http::{header, Method},
    middleware::Next,
    response::Response,
};
use cms_security::{Claims, JwtError};
use cms_shared::constants::CSRF_HEADER;
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

/// Validated claims, available to handlers as an `Extension`.
#[derive(Debug, Clone)]
pub struct AdminClaims(pub Claims);

fn is_mutating(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

    let claims = state.jwt.validate(token).map_err(|e| match e {
        JwtError::TokenExpired => ApiError::Unauthorized("Token expired".to_string()),
        other => ApiError::Unauthorized(other.to_string()),
    })?;

    if !claims.is_admin() {
        return Err(ApiError::Forbidden(format!("{} is not an admin", claims.sub)));
    }

    if is_mutating(request.method()) {
        let csrf = request
            .headers()
            .get(CSRF_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if !state.csrf.validate(&claims.sub, csrf) {
            return Err(ApiError::Forbidden("Invalid or missing CSRF token".to_string()));
        }
    }

    debug!("Admin {} {} {}", claims.sub, request.method(), request.uri().path());
    request.extensions_mut().insert(AdminClaims(claims));
    Ok(next.run(request).await)
}
