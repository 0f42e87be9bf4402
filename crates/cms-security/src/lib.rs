//! # CMS Security
//! 
//! Security utilities: admin JWT and CSRF tokens.

pub mod jwt;
pub mod csrf;

pub use jwt::{Claims, JwtError, JwtService};
pub use csrf::{CsrfError, CsrfService};
