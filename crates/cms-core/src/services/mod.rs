//! Domain services (business logic)

pub mod menu_service;
pub mod settings_service;

pub use menu_service::{MenuDetail, MenuService};
pub use settings_service::{SettingsCache, SettingsService};
