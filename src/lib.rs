// Library crate for the TaskPal negotiation and messaging server
// This file exposes the public API for integration tests

pub mod booking;
pub mod event;
pub mod message;
pub mod negotiation;
pub mod payment;
pub mod room;
pub mod session;
pub mod shared;
pub mod websockets;

// Re-export commonly used types for easier access in tests
pub use booking::{Booking, BookingStatus, Role};
pub use event::{BookingRoomEvent, EventBus, SubscriptionManager};
pub use message::ChatMessage;
pub use negotiation::NegotiationEngine;
pub use room::RoomRegistry;
pub use shared::{AppError, AppState};
pub use websockets::{
    BookingRoomSubscriber, ClientEvent, ConnectionManager, InMemoryConnectionManager,
    MessageHandler, ServerEvent, SessionGateway,
};
