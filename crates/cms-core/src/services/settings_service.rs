// ============================================================================
// CMS Core - Settings Service
// File: crates/cms-core/src/services/settings_service.rs
// ============================================================================
//! Site settings with an explicit read-through cache

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::domain::setting::validate_setting_key;
use crate::domain::Setting;
use crate::error::DomainError;
use crate::repositories::SettingsRepository;

/// Key → value snapshot of every setting.
///
/// Empty until the first read, dropped by `clear` after every write. Each
/// `clear` starts a new generation; a fill computed in an older generation is
/// discarded.
#[derive(Default)]
pub struct SettingsCache {
    state: RwLock<CacheState>,
}

#[derive(Default)]
struct CacheState {
    entries: Option<HashMap<String, String>>,
    generation: u64,
}

impl SettingsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Option<HashMap<String, String>> {
        self.state.read().entries.clone()
    }

    pub fn generation(&self) -> u64 {
        self.state.read().generation
    }

    /// Stores `entries` only if no `clear` happened since `seen` was read.
    pub fn fill_if_current(&self, seen: u64, entries: HashMap<String, String>) -> bool {
        let mut state = self.state.write();
        if state.generation != seen {
            return false;
        }
        state.entries = Some(entries);
        true
    }

    pub fn clear(&self) {
        let mut state = self.state.write();
        state.entries = None;
        state.generation = state.generation.wrapping_add(1);
    }

    pub fn is_populated(&self) -> bool {
        self.state.read().entries.is_some()
    }
}

pub struct SettingsService<R: SettingsRepository + ?Sized> {
    repo: Arc<R>,
    cache: Arc<SettingsCache>,
}

impl<R: SettingsRepository + ?Sized> SettingsService<R> {
    pub fn new(repo: Arc<R>, cache: Arc<SettingsCache>) -> Self {
        Self { repo, cache }
    }

    /// Every setting, served from the cache after the first call
    pub async fn all(&self) -> Result<HashMap<String, String>, DomainError> {
        if let Some(entries) = self.cache.snapshot() {
            return Ok(entries);
        }
        let seen = self.cache.generation();

        let entries: HashMap<String, String> = self
            .repo
            .all()
            .await?
            .into_iter()
            .map(|s| (s.key, s.value))
            .collect();
        if self.cache.fill_if_current(seen, entries.clone()) {
            debug!("Settings cache populated with {} entries", entries.len());
        } else {
            debug!("Settings changed during read, cache left empty");
        }
        Ok(entries)
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        Ok(self.all().await?.get(key).cloned())
    }

    pub async fn get_or(&self, key: &str, default: &str) -> Result<String, DomainError> {
        Ok(self.get(key).await?.unwrap_or_else(|| default.to_string()))
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<Setting, DomainError> {
        validate_setting_key(key)?;
        let setting = self.repo.upsert(key, value).await?;
        self.clear_cache();
        info!("Setting updated: {}", key);
        Ok(setting)
    }

    pub async fn remove(&self, key: &str) -> Result<(), DomainError> {
        validate_setting_key(key)?;
        let removed = self.repo.delete(key).await?;
        self.clear_cache();
        if !removed {
            return Err(DomainError::SettingNotFound(key.to_string()));
        }
        info!("Setting removed: {}", key);
        Ok(())
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MockSettingsRepository;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::Notify;

    /// Store whose first `all()` parks after reading until `release` fires.
    #[derive(Default)]
    struct GatedSettingsRepository {
        values: RwLock<HashMap<String, String>>,
        armed: AtomicBool,
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl SettingsRepository for GatedSettingsRepository {
        async fn all(&self) -> Result<Vec<Setting>, DomainError> {
            let rows: Vec<Setting> = self
                .values
                .read()
                .iter()
                .map(|(k, v)| Setting::new(k, v))
                .collect();
            if self.armed.swap(false, Ordering::SeqCst) {
                self.entered.notify_one();
                self.release.notified().await;
            }
            Ok(rows)
        }

        async fn upsert(&self, key: &str, value: &str) -> Result<Setting, DomainError> {
            self.values.write().insert(key.to_string(), value.to_string());
            Ok(Setting::new(key, value))
        }

        async fn delete(&self, key: &str) -> Result<bool, DomainError> {
            Ok(self.values.write().remove(key).is_some())
        }
    }

    fn service(repo: MockSettingsRepository) -> SettingsService<MockSettingsRepository> {
        SettingsService::new(Arc::new(repo), Arc::new(SettingsCache::new()))
    }

    #[tokio::test]
    async fn test_reads_hit_store_once() {
        let mut repo = MockSettingsRepository::new();
        repo.expect_all()
            .times(1)
            .returning(|| Ok(vec![Setting::new("site.title", "Lightbox")]));

        let service = service(repo);
        assert_eq!(service.get("site.title").await.unwrap().as_deref(), Some("Lightbox"));
        assert_eq!(service.get_or("site.tagline", "Photography").await.unwrap(), "Photography");
        assert!(service.cache.is_populated());
    }

    #[tokio::test]
    async fn test_write_clears_cache() {
        let mut repo = MockSettingsRepository::new();
        repo.expect_all()
            .times(2)
            .returning(|| Ok(vec![Setting::new("site.title", "Lightbox")]));
        repo.expect_upsert()
            .times(1)
            .returning(|key, value| Ok(Setting::new(key, value)));

        let service = service(repo);
        service.all().await.unwrap();
        service.set("site.title", "Lightbox Studio").await.unwrap();
        assert!(!service.cache.is_populated());
        service.all().await.unwrap();
    }

    #[tokio::test]
    async fn test_write_during_read_is_not_masked_by_stale_fill() {
        let repo = Arc::new(GatedSettingsRepository::default());
        repo.values.write().insert("site.title".to_string(), "old".to_string());
        repo.armed.store(true, Ordering::SeqCst);
        let service = SettingsService::new(repo.clone(), Arc::new(SettingsCache::new()));

        let reader = service.all();
        let writer = async {
            repo.entered.notified().await;
            service.set("site.title", "new").await.unwrap();
            repo.release.notify_one();
        };
        let (in_flight, ()) = tokio::join!(reader, writer);

        // The parked read saw the old row but must not have cached it.
        assert_eq!(in_flight.unwrap()["site.title"], "old");
        assert!(!service.cache.is_populated());
        assert_eq!(service.get("site.title").await.unwrap().as_deref(), Some("new"));
        assert!(service.cache.is_populated());
    }

    #[test]
    fn test_fill_rejected_after_clear() {
        let cache = SettingsCache::new();
        let seen = cache.generation();
        cache.clear();
        assert!(!cache.fill_if_current(seen, HashMap::new()));
        assert!(!cache.is_populated());
        assert!(cache.fill_if_current(cache.generation(), HashMap::new()));
        assert!(cache.is_populated());
    }

    #[tokio::test]
    async fn test_invalid_key_never_reaches_store() {
        let mut repo = MockSettingsRepository::new();
        repo.expect_upsert().never();

        let err = service(repo).set("Site Title", "x").await.unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_remove_missing_key() {
        let mut repo = MockSettingsRepository::new();
        repo.expect_delete().returning(|_| Ok(false));

        let err = service(repo).remove("site.title").await.unwrap_err();
        assert!(matches!(err, DomainError::SettingNotFound(_)));
    }
}
