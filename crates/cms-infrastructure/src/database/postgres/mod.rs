//! PostgreSQL repository implementations

pub mod menu_repo_impl;
pub mod settings_repo_impl;

pub use menu_repo_impl::PgMenuRepository;
pub use settings_repo_impl::PgSettingsRepository;

use cms_core::error::DomainError;
use tracing::error;

/// Logs the failure and maps it to the generic persistence error.
pub(crate) fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> DomainError {
    move |e| {
        error!("Database error {}: {}", context, e);
        DomainError::DatabaseError(e.to_string())
    }
}

pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}
