//! In-process repositories.
//!
//! Used by the `memory` storage backend and by tests. Multi-row writes run
//! against a working copy of the state that replaces the committed state only
//! when the whole operation succeeds.

pub mod menu_repo_impl;
pub mod settings_repo_impl;

pub use menu_repo_impl::InMemoryMenuRepository;
pub use settings_repo_impl::InMemorySettingsRepository;
