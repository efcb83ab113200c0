use serde::{Deserialize, Serialize};

use crate::booking::models::{Booking, Role};
use crate::message::models::ChatMessage;
use crate::shared::AppError;

/// Client-to-server events. The wire envelope is
/// `{"event": "<name>", "data": {...}}` with the original socket event
/// names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    JoinRoom(RoomPayload),
    LeaveRoom(RoomPayload),
    SendMessage(ChatMessage),
    ProposePrice(ProposePricePayload),
    AgreePrice(AgreePricePayload),
}

/// Server-to-client events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// History replay, sent once to a joining connection only
    LoadMessages(Vec<ChatMessage>),
    /// Live chat fan-out to room members other than the sender
    ReceiveMessage(ChatMessage),
    /// Canonical booking replacement, sent to all room members
    BookingUpdated(Booking),
    /// Typed failure, delivered only to the originating connection
    Error(ErrorPayload),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomPayload {
    #[serde(rename = "bookingId")]
    pub booking_id: i64,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposePricePayload {
    #[serde(rename = "bookingId")]
    pub booking_id: i64,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgreePricePayload {
    #[serde(rename = "bookingId")]
    pub booking_id: i64,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub kind: String,
    pub message: String,
}

impl ServerEvent {
    pub fn error(err: &AppError) -> Self {
        ServerEvent::Error(ErrorPayload {
            kind: err.kind().to_string(),
            message: err.to_string(),
        })
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap()
    }
}
