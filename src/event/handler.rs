use async_trait::async_trait;
use thiserror::Error;

use super::events::BookingRoomEvent;

/// Errors that can occur when handling room events
#[derive(Debug, Error)]
pub enum BookingEventError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Handler error: {0}")]
    HandlerError(String),
}

/// Trait for components that can handle booking room events
///
/// This provides a clean interface for reacting to room-specific events
/// without being tied to WebSocket or connection specifics.
#[async_trait]
pub trait BookingEventHandler: Send + Sync {
    /// Handle a room event for the given booking
    async fn handle_room_event(
        &self,
        booking_id: i64,
        event: BookingRoomEvent,
    ) -> Result<(), BookingEventError>;

    /// Get a human-readable name for this handler (for logging/debugging)
    fn handler_name(&self) -> &'static str;
}
