//! Request extractors that answer in the API envelope

use axum::extract::FromRequest;

use crate::error::ApiError;

/// `Json<T>` whose rejection is an [`ApiError::BadRequest`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
