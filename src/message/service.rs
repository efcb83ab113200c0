use std::sync::Arc;
use tracing::{info, instrument};

use super::models::ChatMessage;
use super::repository::MessageRepository;
use crate::booking::locks::BookingLocks;
use crate::event::{BookingRoomEvent, EventBus};
use crate::shared::AppError;

/// Chat side of the booking room: persists messages and emits the fan-out
/// event once the append has committed.
pub struct ChatService {
    messages: Arc<dyn MessageRepository + Send + Sync>,
    locks: Arc<BookingLocks>,
    event_bus: EventBus,
}

impl ChatService {
    pub fn new(
        messages: Arc<dyn MessageRepository + Send + Sync>,
        locks: Arc<BookingLocks>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            messages,
            locks,
            event_bus,
        }
    }

    /// Appends the message to the store, then emits `MessageSent` so the
    /// broadcast reaches every room member except the originating
    /// connection. Runs under the booking lock so chat and negotiation
    /// events for one booking apply in arrival order.
    #[instrument(skip(self, message), fields(booking_id = message.booking_id))]
    pub async fn send_message(
        &self,
        message: ChatMessage,
        sender_connection: &str,
    ) -> Result<(), AppError> {
        let _guard = self.locks.acquire(message.booking_id).await;

        self.messages.append_message(&message).await?;

        info!(
            booking_id = message.booking_id,
            sender_id = message.sender_id,
            "Chat message persisted"
        );

        self.event_bus
            .emit_to_room(
                message.booking_id,
                BookingRoomEvent::MessageSent {
                    message,
                    sender_connection: sender_connection.to_string(),
                },
            )
            .await;

        Ok(())
    }

    /// Ordered history for replay on join. Finite, timestamp ascending; a
    /// second join re-fetches and may include messages sent since the first.
    #[instrument(skip(self))]
    pub async fn replay_history(&self, booking_id: i64) -> Result<Vec<ChatMessage>, AppError> {
        self.messages.get_message_history(booking_id).await
    }
}
