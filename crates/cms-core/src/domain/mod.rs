//! # CMS Core - Domain Module
//! 
//! Entities for menus, menu items, and site settings.

pub mod menu;
pub mod menu_item;
pub mod setting;

pub use menu::{Menu, MenuInput, MenuSummary};
pub use menu_item::{MenuItem, MenuItemInput, NewMenuItem};
pub use setting::Setting;
