//! Configuration management

use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

use crate::constants::{DEFAULT_MAX_MENU_DEPTH, DEFAULT_TOKEN_TTL_SECS};
use crate::types::{SortScheme, StorageBackend};

const INSECURE_DEFAULT_SECRET: &str = "dev-only-secret-change-me";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    pub menu: MenuSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub allowed_origin: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub backend: StorageBackend,
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub csrf_secret: String,
    pub token_ttl_secs: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MenuSettings {
    pub sort_scheme: SortScheme,
    pub max_depth: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    /// `pretty` or `json`
    pub format: String,
    /// Daily-rotated log files are written here when set.
    pub directory: Option<String>,
}

impl Default for MenuSettings {
    fn default() -> Self {
        Self {
            sort_scheme: SortScheme::Leveled,
            max_depth: DEFAULT_MAX_MENU_DEPTH,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let builder = Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("APP").separator("__").try_parsing(true));
        Self::from_builder(builder)
    }

    /// Builder pre-populated with every default; sources are layered on top.
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("app.env", "development")?
            .set_default("app.host", "127.0.0.1")?
            .set_default("app.port", 8080)?
            .set_default("app.name", "cms-server")?
            .set_default("database.backend", "postgres")?
            .set_default("database.url", "postgres://localhost:5432/photo_cms")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.acquire_timeout_secs", 3)?
            .set_default("database.run_migrations", true)?
            .set_default("auth.jwt_secret", INSECURE_DEFAULT_SECRET)?
            .set_default("auth.csrf_secret", INSECURE_DEFAULT_SECRET)?
            .set_default("auth.token_ttl_secs", DEFAULT_TOKEN_TTL_SECS)?
            .set_default("menu.sort_scheme", "leveled")?
            .set_default("menu.max_depth", DEFAULT_MAX_MENU_DEPTH as i64)?
            .set_default("logging.format", "pretty")
    }

    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        self.app.env.eq_ignore_ascii_case("production")
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.menu.max_depth == 0 {
            return Err(ConfigError::Message("menu.max_depth must be at least 1".into()));
        }
        if self.is_production()
            && (self.auth.jwt_secret == INSECURE_DEFAULT_SECRET
                || self.auth.csrf_secret == INSECURE_DEFAULT_SECRET)
        {
            return Err(ConfigError::Message(
                "auth secrets must be configured in production".into(),
            ));
        }
        Ok(())
    }
}
