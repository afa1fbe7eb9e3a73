pub mod auth;
pub mod error;
pub mod handlers;
pub mod router;
pub mod types;

pub use error::ApiError;
pub use router::create_router;
pub use types::*;
