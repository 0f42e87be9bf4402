//! # CMS API
//! 
//! Admin HTTP surface: handlers, admin gate middleware, JSON envelope.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use extract::ApiJson;
pub use router::build_router;
pub use state::AppState;
