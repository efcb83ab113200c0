// Public API - what other modules can use
pub use handlers::create_session;
pub use middleware::jwt_auth;
pub use types::SessionClaims;

// Internal modules
mod handlers;
mod middleware;
pub mod models;
pub mod repository;
pub mod service;
mod token;
pub mod types;
