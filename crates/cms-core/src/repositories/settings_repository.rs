//! Settings repository trait (port)

use async_trait::async_trait;

use crate::domain::Setting;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn all(&self) -> Result<Vec<Setting>, DomainError>;
    async fn upsert(&self, key: &str, value: &str) -> Result<Setting, DomainError>;
    /// `true` when a row was removed.
    async fn delete(&self, key: &str) -> Result<bool, DomainError>;
}
