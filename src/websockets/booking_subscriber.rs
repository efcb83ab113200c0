use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use crate::event::{BookingEventError, BookingEventHandler, BookingRoomEvent};
use crate::room::registry::RoomRegistry;
use crate::websockets::connection_manager::ConnectionManager;
use crate::websockets::messages::ServerEvent;

/// Fans booking room events out to the WebSocket connections registered in
/// the room.
///
/// Chat messages go to every member except the originating connection
/// (which already holds local optimistic state); booking updates go to all
/// members including the actor, since clients replace their whole booking
/// view rather than merging deltas.
pub struct BookingRoomSubscriber {
    registry: Arc<RoomRegistry>,
    connection_manager: Arc<dyn ConnectionManager>,
}

impl BookingRoomSubscriber {
    pub fn new(registry: Arc<RoomRegistry>, connection_manager: Arc<dyn ConnectionManager>) -> Self {
        Self {
            registry,
            connection_manager,
        }
    }

    async fn broadcast(&self, recipients: &[String], event: &ServerEvent) {
        self.connection_manager
            .send_to_connections(recipients, &event.to_json())
            .await;
    }
}

#[async_trait]
impl BookingEventHandler for BookingRoomSubscriber {
    async fn handle_room_event(
        &self,
        booking_id: i64,
        event: BookingRoomEvent,
    ) -> Result<(), BookingEventError> {
        match event {
            BookingRoomEvent::MessageSent {
                message,
                sender_connection,
            } => {
                let recipients = self
                    .registry
                    .members_except(booking_id, &sender_connection)
                    .await;
                debug!(
                    booking_id,
                    recipients = recipients.len(),
                    "Broadcasting chat message"
                );
                self.broadcast(&recipients, &ServerEvent::ReceiveMessage(message))
                    .await;
            }
            BookingRoomEvent::BookingUpdated { booking } => {
                let recipients = self.registry.members_of(booking_id).await;
                debug!(
                    booking_id,
                    recipients = recipients.len(),
                    "Broadcasting booking update"
                );
                self.broadcast(&recipients, &ServerEvent::BookingUpdated(booking))
                    .await;
            }
            BookingRoomEvent::ParticipantJoined {
                connection_id,
                role,
            } => {
                info!(booking_id, connection_id, %role, "Participant joined room");
            }
            BookingRoomEvent::ParticipantLeft {
                connection_id,
                role,
            } => {
                info!(booking_id, connection_id, %role, "Participant left room");
            }
        }

        Ok(())
    }

    fn handler_name(&self) -> &'static str {
        "BookingRoomSubscriber"
    }
}
