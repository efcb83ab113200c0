use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use super::events::BookingRoomEvent;

/// Event bus distributing room events, one channel per booking.
///
/// A booking's events flow through a single broadcast channel consumed by a
/// single subscription task, so delivery order per booking is the emission
/// order.
#[derive(Debug, Clone)]
pub struct EventBus {
    /// Booking-specific event channels: booking_id -> sender
    room_channels: Arc<RwLock<HashMap<i64, broadcast::Sender<BookingRoomEvent>>>>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            room_channels: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Emits an event to all subscribers of a booking's room
    pub async fn emit_to_room(&self, booking_id: i64, event: BookingRoomEvent) {
        let room_channels = self.room_channels.read().await;

        if let Some(sender) = room_channels.get(&booking_id) {
            match sender.send(event) {
                Ok(receiver_count) => {
                    debug!(
                        booking_id,
                        receivers = receiver_count,
                        "Room event emitted"
                    );
                }
                Err(_) => {
                    debug!(booking_id, "Room event emitted with no receivers");
                }
            }
        } else {
            debug!(booking_id, "No room channel found - creating one");
            drop(room_channels);

            // Create room channel if it doesn't exist
            let mut room_channels = self.room_channels.write().await;
            let sender = room_channels
                .entry(booking_id)
                .or_insert_with(|| broadcast::channel(100).0)
                .clone();

            if sender.send(event).is_err() {
                debug!(booking_id, "Room event sent to new channel with no receivers");
            }
        }
    }

    /// Drops a booking's channel. Existing receivers observe `Closed`; a
    /// later emit or subscribe recreates the channel lazily.
    pub async fn remove_room(&self, booking_id: i64) {
        let mut room_channels = self.room_channels.write().await;
        if room_channels.remove(&booking_id).is_some() {
            debug!(booking_id, "Room channel removed");
        }
    }

    /// Subscribe to events for a booking's room
    pub async fn subscribe_to_room(&self, booking_id: i64) -> broadcast::Receiver<BookingRoomEvent> {
        let room_channels = self.room_channels.read().await;

        if let Some(sender) = room_channels.get(&booking_id) {
            sender.subscribe()
        } else {
            debug!(booking_id, "Creating new room channel for subscription");
            drop(room_channels);

            let mut room_channels = self.room_channels.write().await;
            room_channels
                .entry(booking_id)
                .or_insert_with(|| broadcast::channel(100).0)
                .subscribe()
        }
    }
}
