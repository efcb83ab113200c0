use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::booking::models::Role;

/// A single chat message, immutable once appended to the message store.
///
/// Wire field names match what clients already send: `bookingId` camelCase,
/// the rest snake_case.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(rename = "bookingId")]
    pub booking_id: i64,
    pub sender_id: i64,
    pub sender_role: Role,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(booking_id: i64, sender_id: i64, sender_role: Role, message: String) -> Self {
        Self {
            booking_id,
            sender_id,
            sender_role,
            message,
            timestamp: Utc::now(),
        }
    }
}
