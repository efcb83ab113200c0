use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::models::{Booking, Role};
use crate::session::SessionClaims;
use crate::shared::{AppError, AppState};

#[derive(Debug, Deserialize)]
pub struct PriceRequest {
    pub price: f64,
}

#[derive(Debug, Deserialize)]
pub struct AgreeRequest {
    pub role: Role,
}

/// Mutation responses wrap the canonical record as `{"booking": {...}}`,
/// the shape clients already consume.
#[derive(Debug, Serialize)]
pub struct BookingEnvelope {
    pub booking: Booking,
}

/// HTTP handler for fetching a booking
///
/// GET /bookings/:id
/// Readable in any status, including Cancelled.
#[instrument(name = "get_booking", skip(state, claims))]
pub async fn get_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(booking_id): Path<i64>,
) -> Result<Json<Booking>, AppError> {
    let booking = state
        .booking_repository
        .get_booking(booking_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", booking_id)))?;

    Ok(Json(booking))
}

/// HTTP handler for proposing a new price
///
/// PUT /bookings/:id/price
/// The proposer role comes from the authenticated session. The engine
/// broadcasts the resulting booking update to the room itself.
#[instrument(name = "propose_price", skip(state, claims))]
pub async fn propose_price(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(booking_id): Path<i64>,
    Json(request): Json<PriceRequest>,
) -> Result<Json<BookingEnvelope>, AppError> {
    info!(
        booking_id,
        role = %claims.role,
        price = request.price,
        "Price proposal via REST"
    );

    let booking = state
        .engine
        .propose_price(booking_id, claims.role, request.price)
        .await?;

    Ok(Json(BookingEnvelope { booking }))
}

/// HTTP handler for agreeing to the proposed price
///
/// PUT /bookings/:id/agree
#[instrument(name = "agree_price", skip(state, claims))]
pub async fn agree_price(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(booking_id): Path<i64>,
    Json(request): Json<AgreeRequest>,
) -> Result<Json<BookingEnvelope>, AppError> {
    if request.role != claims.role {
        return Err(AppError::Unauthorized(
            "Role does not match authenticated session".to_string(),
        ));
    }

    info!(booking_id, role = %claims.role, "Price agreement via REST");

    let booking = state.engine.agree_to_price(booking_id, claims.role).await?;

    Ok(Json(BookingEnvelope { booking }))
}
