pub mod models;
pub mod repository;
pub mod service;

pub use models::ChatMessage;
pub use service::ChatService;
