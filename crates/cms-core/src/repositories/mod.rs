//! Repository traits (ports)

pub mod menu_repository;
pub mod settings_repository;

pub use menu_repository::MenuRepository;
pub use settings_repository::SettingsRepository;

#[cfg(test)]
pub use menu_repository::MockMenuRepository;
#[cfg(test)]
pub use settings_repository::MockSettingsRepository;
