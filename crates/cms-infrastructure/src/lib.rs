//! # CMS Infrastructure
//! 
//! Storage adapters for the menu and settings ports: PostgreSQL for
//! deployments, an in-process store for development and tests.

pub mod database;

pub use database::{
    create_pool, run_migrations, InMemoryMenuRepository, InMemorySettingsRepository,
    PgMenuRepository, PgSettingsRepository,
};
