use axum::{
    extract::{Path, State},
    Extension, Json,
};
use tracing::{info, instrument};

use super::client::PaymentIntent;
use crate::session::SessionClaims;
use crate::shared::{AppError, AppState};

/// HTTP handler for creating a payment checkout session
///
/// POST /payments/create-intent/:id
/// Returns the hosted checkout URL for the booking's agreed price
#[instrument(name = "create_payment_intent", skip(state, claims))]
pub async fn create_payment_intent(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(booking_id): Path<i64>,
) -> Result<Json<PaymentIntent>, AppError> {
    let booking = state
        .booking_repository
        .get_booking(booking_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", booking_id)))?;

    let intent = state.payment_client.create_intent(&booking).await?;

    info!(
        booking_id,
        user_id = claims.user_id,
        "Payment intent created"
    );

    Ok(Json(intent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::models::{Booking, Role};
    use crate::booking::repository::{BookingRepository, InMemoryBookingRepository};
    use crate::shared::test_utils::AppStateBuilder;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::post,
        Router,
    };
    use chrono::Utc;
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn app_with_booking(booking: Booking) -> (Router, String) {
        let repo = Arc::new(InMemoryBookingRepository::new());
        repo.create_booking(&booking).await.unwrap();

        let state = AppStateBuilder::new()
            .with_booking_repository(repo)
            .build();
        let token = state
            .session_service
            .create_session(1, Role::Client)
            .await
            .unwrap()
            .token;

        let app = Router::new()
            .route("/payments/create-intent/:id", post(create_payment_intent))
            .layer(axum::middleware::from_fn_with_state(
                state.clone(),
                crate::session::jwt_auth,
            ))
            .with_state(state);
        (app, token)
    }

    #[tokio::test]
    async fn test_create_intent_for_priced_booking() {
        let mut booking = Booking::new(42, 1, 2, Utc::now());
        booking.price = Some(50.0);
        let (app, token) = app_with_booking(booking).await;

        let request = Request::builder()
            .method("POST")
            .uri("/payments/create-intent/42")
            .header("Authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let intent: PaymentIntent = serde_json::from_slice(&body).unwrap();
        assert!(intent.url.ends_with("/42"));
    }

    #[tokio::test]
    async fn test_create_intent_without_price_is_unprocessable() {
        let (app, token) = app_with_booking(Booking::new(42, 1, 2, Utc::now())).await;

        let request = Request::builder()
            .method("POST")
            .uri("/payments/create-intent/42")
            .header("Authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_create_intent_requires_auth() {
        let (app, _token) = app_with_booking(Booking::new(42, 1, 2, Utc::now())).await;

        let request = Request::builder()
            .method("POST")
            .uri("/payments/create-intent/42")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
