pub mod auth;
pub mod order;

pub use auth::ApiKeyGuard;
