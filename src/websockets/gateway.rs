use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use crate::event::BookingRoomEvent;
use crate::message::models::ChatMessage;
use crate::session::SessionClaims;
use crate::shared::{AppError, AppState};
use crate::websockets::messages::{
    AgreePricePayload, ClientEvent, ProposePricePayload, RoomPayload, ServerEvent,
};
use crate::websockets::socket::MessageHandler;

/// Per-connection gateway: authenticated identity plus the room membership
/// gate for every inbound event.
///
/// Event ordering rules it enforces:
/// - no chat or negotiation event is accepted before a successful
///   `join_room` for that booking (`NotJoined`),
/// - sender identity on events must match the authenticated claims
///   (`Unauthorized`),
/// - failures are sent back to this connection only, never to the room.
pub struct SessionGateway {
    connection_id: String,
    claims: SessionClaims,
    state: AppState,
    /// The booking room this connection is currently in, at most one.
    joined: RwLock<Option<i64>>,
}

impl SessionGateway {
    pub fn new(connection_id: String, claims: SessionClaims, state: AppState) -> Self {
        Self {
            connection_id,
            claims,
            state,
            joined: RwLock::new(None),
        }
    }

    pub fn connection_id(&self) -> &str {
        &self.connection_id
    }

    async fn send_to_self(&self, event: &ServerEvent) {
        self.state
            .connection_manager
            .send_to_connection(&self.connection_id, &event.to_json())
            .await;
    }

    async fn require_joined(&self, booking_id: i64) -> Result<(), AppError> {
        match *self.joined.read().await {
            Some(joined) if joined == booking_id => Ok(()),
            _ => Err(AppError::NotJoined),
        }
    }

    #[instrument(skip(self), fields(connection_id = %self.connection_id))]
    async fn handle_join(&self, payload: RoomPayload) -> Result<(), AppError> {
        if payload.role != self.claims.role {
            return Err(AppError::Unauthorized(
                "Role does not match authenticated session".to_string(),
            ));
        }

        // The booking must exist; a cancelled booking is still readable.
        self.state
            .booking_repository
            .get_booking(payload.booking_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Booking {} not found", payload.booking_id))
            })?;

        // One room per connection: joining a new booking leaves the old one.
        let previous = {
            let mut joined = self.joined.write().await;
            joined.replace(payload.booking_id)
        };
        if let Some(previous_id) = previous {
            if previous_id != payload.booking_id {
                self.leave_room(previous_id).await;
            }
        }

        self.state
            .subscriptions
            .ensure_started(payload.booking_id)
            .await;
        self.state
            .room_registry
            .join(
                payload.booking_id,
                self.claims.role,
                self.claims.user_id,
                &self.connection_id,
            )
            .await;
        self.state
            .event_bus
            .emit_to_room(
                payload.booking_id,
                BookingRoomEvent::ParticipantJoined {
                    connection_id: self.connection_id.clone(),
                    role: self.claims.role,
                },
            )
            .await;

        // History replay goes to the joining connection only. One retry on
        // a transient store failure before surfacing.
        let history = match self
            .state
            .chat_service
            .replay_history(payload.booking_id)
            .await
        {
            Err(AppError::StoreUnavailable(reason)) => {
                warn!(
                    booking_id = payload.booking_id,
                    %reason,
                    "History fetch failed, retrying once"
                );
                self.state
                    .chat_service
                    .replay_history(payload.booking_id)
                    .await?
            }
            other => other?,
        };
        self.send_to_self(&ServerEvent::LoadMessages(history)).await;

        Ok(())
    }

    async fn handle_leave(&self, payload: RoomPayload) -> Result<(), AppError> {
        let was_joined = {
            let mut joined = self.joined.write().await;
            match *joined {
                Some(current) if current == payload.booking_id => {
                    *joined = None;
                    true
                }
                _ => false,
            }
        };

        // Leaving a room the connection is not in is a no-op, not an error.
        if was_joined {
            self.leave_room(payload.booking_id).await;
        }

        Ok(())
    }

    async fn leave_room(&self, booking_id: i64) {
        self.state
            .room_registry
            .leave(booking_id, &self.connection_id)
            .await;
        self.state
            .event_bus
            .emit_to_room(
                booking_id,
                BookingRoomEvent::ParticipantLeft {
                    connection_id: self.connection_id.clone(),
                    role: self.claims.role,
                },
            )
            .await;
    }

    async fn handle_send_message(&self, message: ChatMessage) -> Result<(), AppError> {
        self.require_joined(message.booking_id).await?;

        if message.sender_id != self.claims.user_id || message.sender_role != self.claims.role {
            return Err(AppError::Unauthorized(
                "Sender identity does not match authenticated session".to_string(),
            ));
        }

        self.state
            .chat_service
            .send_message(message, &self.connection_id)
            .await
    }

    async fn handle_propose_price(&self, payload: ProposePricePayload) -> Result<(), AppError> {
        self.require_joined(payload.booking_id).await?;

        self.state
            .engine
            .propose_price(payload.booking_id, self.claims.role, payload.price)
            .await?;
        Ok(())
    }

    async fn handle_agree_price(&self, payload: AgreePricePayload) -> Result<(), AppError> {
        self.require_joined(payload.booking_id).await?;

        if payload.role != self.claims.role {
            return Err(AppError::Unauthorized(
                "Role does not match authenticated session".to_string(),
            ));
        }

        self.state
            .engine
            .agree_to_price(payload.booking_id, self.claims.role)
            .await?;
        Ok(())
    }

    /// Called by the transport when the connection drops. Draining the
    /// joined slot guards against duplicate disconnect signals: `leave`
    /// runs exactly once per membership.
    pub async fn on_disconnect(&self) {
        let joined = self.joined.write().await.take();
        if let Some(booking_id) = joined {
            info!(
                connection_id = %self.connection_id,
                booking_id,
                "Connection disconnected, leaving room"
            );
            self.leave_room(booking_id).await;
        }
    }

    async fn dispatch(&self, event: ClientEvent) -> Result<(), AppError> {
        match event {
            ClientEvent::JoinRoom(payload) => self.handle_join(payload).await,
            ClientEvent::LeaveRoom(payload) => self.handle_leave(payload).await,
            ClientEvent::SendMessage(message) => self.handle_send_message(message).await,
            ClientEvent::ProposePrice(payload) => self.handle_propose_price(payload).await,
            ClientEvent::AgreePrice(payload) => self.handle_agree_price(payload).await,
        }
    }
}

#[async_trait]
impl MessageHandler for SessionGateway {
    async fn handle_message(&self, message: String) {
        match serde_json::from_str::<ClientEvent>(&message) {
            Ok(event) => {
                if let Err(e) = self.dispatch(event).await {
                    warn!(
                        connection_id = %self.connection_id,
                        kind = e.kind(),
                        error = %e,
                        "Inbound event failed"
                    );
                    // Only the originating connection ever sees the failure
                    self.send_to_self(&ServerEvent::error(&e)).await;
                }
            }
            Err(e) => {
                warn!(
                    connection_id = %self.connection_id,
                    error = %e,
                    "Failed to parse WebSocket event, dropping it"
                );
            }
        }
    }
}
