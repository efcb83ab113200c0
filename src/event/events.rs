use crate::booking::models::{Booking, Role};
use crate::message::models::ChatMessage;

/// Events that can occur in a booking room.
///
/// Events represent facts about things that have already happened: the
/// store mutation is committed before the event is emitted, so the fan-out
/// order observed by room members matches commit order.
#[derive(Debug, Clone)]
pub enum BookingRoomEvent {
    /// A chat message was appended to the booking's message log.
    /// `sender_connection` identifies the originating connection so the
    /// broadcast can skip its own echo.
    MessageSent {
        message: ChatMessage,
        sender_connection: String,
    },

    /// The canonical booking record changed; all members (including the
    /// actor) must replace their whole booking view.
    BookingUpdated { booking: Booking },

    /// A connection joined the booking room.
    ParticipantJoined { connection_id: String, role: Role },

    /// A connection left the booking room (explicitly or by disconnect).
    ParticipantLeft { connection_id: String, role: Role },
}

impl BookingRoomEvent {
    /// Get a human-readable description of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            BookingRoomEvent::MessageSent { .. } => "message_sent",
            BookingRoomEvent::BookingUpdated { .. } => "booking_updated",
            BookingRoomEvent::ParticipantJoined { .. } => "participant_joined",
            BookingRoomEvent::ParticipantLeft { .. } => "participant_left",
        }
    }
}
