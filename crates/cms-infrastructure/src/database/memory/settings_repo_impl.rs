// ============================================================================
// CMS Infrastructure - In-Memory Settings Repository
// File: crates/cms-infrastructure/src/database/memory/settings_repo_impl.rs
// ============================================================================

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use cms_core::domain::Setting;
use cms_core::error::DomainError;
use cms_core::repositories::SettingsRepository;

#[derive(Default)]
pub struct InMemorySettingsRepository {
    entries: RwLock<BTreeMap<String, Setting>>,
}

impl InMemorySettingsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with the given pairs.
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| {
                let setting = Setting::new(k, v);
                (setting.key.clone(), setting)
            })
            .collect();
        Self {
            entries: RwLock::new(entries),
        }
    }
}

#[async_trait]
impl SettingsRepository for InMemorySettingsRepository {
    async fn all(&self) -> Result<Vec<Setting>, DomainError> {
        Ok(self.entries.read().values().cloned().collect())
    }

    async fn upsert(&self, key: &str, value: &str) -> Result<Setting, DomainError> {
        let setting = Setting::new(key, value);
        self.entries.write().insert(key.to_string(), setting.clone());
        Ok(setting)
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.entries.write().remove(key).is_some())
    }
}
