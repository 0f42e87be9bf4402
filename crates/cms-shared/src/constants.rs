//! Application-wide constants

pub const DEFAULT_LINK_TARGET: &str = "_self";
pub const LINK_TARGETS: [&str; 4] = ["_self", "_blank", "_parent", "_top"];
pub const DEFAULT_MAX_MENU_DEPTH: usize = 5;
pub const LEVEL_SORT_STRIDE: i32 = 100;
pub const MAX_SETTING_KEY_LENGTH: usize = 64;
pub const ADMIN_ROLE: &str = "admin";
pub const CSRF_HEADER: &str = "x-csrf-token";
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;
