//! HTTP error mapping

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cms_core::error::DomainError;
use thiserror::Error;

use crate::response::ApiResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, fields) = match self {
            ApiError::Unauthorized(msg) => {
                tracing::warn!("Unauthorized: {}", msg);
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg, None)
            }
            ApiError::Forbidden(msg) => {
                tracing::warn!("Forbidden: {}", msg);
                (StatusCode::FORBIDDEN, "FORBIDDEN", msg, None)
            }
            ApiError::BadRequest(msg) => {
                tracing::warn!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg, None)
            }
            ApiError::Domain(err) => domain_parts(err),
        };

        let body = Json(ApiResponse::error_with_fields(code, &message, fields));
        (status, body).into_response()
    }
}

type Parts = (
    StatusCode,
    &'static str,
    String,
    Option<std::collections::BTreeMap<String, Vec<String>>>,
);

fn domain_parts(err: DomainError) -> Parts {
    let message = err.to_string();
    match err {
        DomainError::ValidationError(fields) => {
            tracing::warn!("Validation failed: {}", fields);
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
                "Validation failed".to_string(),
                Some(fields.fields().clone()),
            )
        }
        DomainError::MenuNotFound(_)
        | DomainError::MenuItemNotFound(_)
        | DomainError::SettingNotFound(_)
        | DomainError::ItemNotInMenu { .. } => {
            tracing::warn!("Not found: {}", message);
            (StatusCode::NOT_FOUND, "NOT_FOUND", message, None)
        }
        DomainError::MenuNameAlreadyExists(_) => {
            tracing::warn!("Conflict: {}", message);
            (StatusCode::CONFLICT, "MENU_NAME_TAKEN", message, None)
        }
        DomainError::InvalidParent { .. }
        | DomainError::CircularReference { .. }
        | DomainError::MaxDepthExceeded { .. } => {
            tracing::warn!("Invalid hierarchy: {}", message);
            (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_HIERARCHY", message, None)
        }
        DomainError::InvalidReorder(_) => {
            tracing::warn!("Invalid reorder: {}", message);
            (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_REORDER", message, None)
        }
        DomainError::DatabaseError(_) | DomainError::InternalError(_) => {
            tracing::error!("Request failed: {}", message);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "The operation failed and was rolled back".to_string(),
                None,
            )
        }
    }
}
