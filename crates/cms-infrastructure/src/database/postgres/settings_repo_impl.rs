// ============================================================================
// CMS Infrastructure - PostgreSQL Settings Repository
// File: crates/cms-infrastructure/src/database/postgres/settings_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::debug;

use cms_core::domain::Setting;
use cms_core::error::DomainError;
use cms_core::repositories::SettingsRepository;

use super::db_error;

pub struct PgSettingsRepository {
    pool: PgPool,
}

impl PgSettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct SettingRow {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

impl From<SettingRow> for Setting {
    fn from(row: SettingRow) -> Self {
        Setting {
            key: row.key,
            value: row.value,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl SettingsRepository for PgSettingsRepository {
    async fn all(&self) -> Result<Vec<Setting>, DomainError> {
        let rows: Vec<SettingRow> =
            sqlx::query_as("SELECT key, value, updated_at FROM settings ORDER BY key")
                .fetch_all(&self.pool)
                .await
                .map_err(db_error("loading settings"))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn upsert(&self, key: &str, value: &str) -> Result<Setting, DomainError> {
        let row: SettingRow = sqlx::query_as(
            r#"
            INSERT INTO settings (key, value, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (key) DO UPDATE
            SET value = EXCLUDED.value, updated_at = EXCLUDED.updated_at
            RETURNING key, value, updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("saving setting"))?;

        debug!("Setting {} saved", row.key);
        Ok(row.into())
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM settings WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(db_error("deleting setting"))?;

        Ok(result.rows_affected() > 0)
    }
}
