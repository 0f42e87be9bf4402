use std::sync::Arc;

use cms_core::repositories::{MenuRepository, SettingsRepository};
use cms_core::services::{MenuService, SettingsService};
use cms_security::{CsrfService, JwtService};

pub type SharedMenuService = Arc<MenuService<dyn MenuRepository>>;
pub type SharedSettingsService = Arc<SettingsService<dyn SettingsRepository>>;

#[derive(Clone)]
pub struct AppState {
    pub menus: SharedMenuService,
    pub settings: SharedSettingsService,
    pub jwt: Arc<JwtService>,
    pub csrf: Arc<CsrfService>,
}
