//! Request middleware

pub mod admin;

pub use admin::{require_admin, AdminClaims};
