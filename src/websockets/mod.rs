// Public API
pub use booking_subscriber::BookingRoomSubscriber;
pub use connection_manager::{ConnectionManager, InMemoryConnectionManager};
pub use gateway::SessionGateway;
pub use handler::websocket_handler;
pub use messages::{ClientEvent, ServerEvent};
pub use socket::MessageHandler;

// Internal modules
mod booking_subscriber;
mod connection_manager;
mod gateway;
mod handler;
pub mod messages;
mod socket;
