//! # CMS Core
//! 
//! Menu and settings entities, tree algorithms, repository ports, and the
//! services the admin API drives.

pub mod domain;
pub mod tree;
pub mod services;
pub mod repositories;
pub mod error;

// Re-export domain entities
pub use domain::*;
pub use error::{DomainError, FieldErrors};
