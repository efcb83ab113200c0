use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::booking::repository::BookingRepository;
use crate::event::{EventBus, SubscriptionManager};
use crate::message::service::ChatService;
use crate::negotiation::engine::NegotiationEngine;
use crate::payment::client::PaymentClient;
use crate::room::registry::RoomRegistry;
use crate::session::service::SessionService;
use crate::websockets::ConnectionManager;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub booking_repository: Arc<dyn BookingRepository + Send + Sync>,
    pub engine: Arc<NegotiationEngine>,
    pub chat_service: Arc<ChatService>,
    pub room_registry: Arc<RoomRegistry>,
    pub connection_manager: Arc<dyn ConnectionManager>,
    pub event_bus: EventBus,
    pub subscriptions: Arc<SubscriptionManager>,
    pub session_service: Arc<SessionService>,
    pub payment_client: Arc<dyn PaymentClient + Send + Sync>,
}

/// Error taxonomy for the negotiation and messaging subsystem.
///
/// Every failure surfaced to a client carries one of these kinds, either as
/// an HTTP status on the REST boundary or as a typed `error` event on the
/// WebSocket boundary. Errors are only ever delivered to the originating
/// connection, never broadcast to the room.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Room operation attempted before joining the booking room")]
    NotJoined,

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("No price has been proposed for this booking yet")]
    NoPriceSet,

    #[error("Negotiation is locked: booking is in a terminal state")]
    NegotiationLocked,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Internal server error")]
    Internal,
}

impl AppError {
    /// Machine-readable kind carried by the WebSocket `error` event.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => "unauthorized",
            AppError::NotJoined => "not_joined",
            AppError::InvalidAmount(_) => "invalid_amount",
            AppError::NoPriceSet => "no_price_set",
            AppError::NegotiationLocked => "negotiation_locked",
            AppError::NotFound(_) => "not_found",
            AppError::StoreUnavailable(_) => "store_unavailable",
            AppError::Internal => "internal",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotJoined => StatusCode::FORBIDDEN,
            AppError::InvalidAmount(_) | AppError::NoPriceSet => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NegotiationLocked => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "kind": self.kind(),
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
