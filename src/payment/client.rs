use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::booking::models::Booking;
use crate::shared::AppError;

/// Checkout session returned by the payment provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub url: String,
}

/// External payment collaborator: turns a confirmed price into a hosted
/// checkout URL the client is redirected to.
#[async_trait]
pub trait PaymentClient {
    async fn create_intent(&self, booking: &Booking) -> Result<PaymentIntent, AppError>;
}

/// HTTP implementation talking to the configured payment provider.
pub struct HttpPaymentClient {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpPaymentClient {
    pub fn new(endpoint: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
        }
    }
}

#[derive(Serialize)]
struct CreateIntentRequest {
    booking_id: i64,
    amount: f64,
}

#[async_trait]
impl PaymentClient for HttpPaymentClient {
    #[instrument(skip(self, booking), fields(booking_id = booking.id))]
    async fn create_intent(&self, booking: &Booking) -> Result<PaymentIntent, AppError> {
        let amount = booking.price.ok_or(AppError::NoPriceSet)?;

        let response = self
            .http
            .post(format!("{}/create-intent", self.endpoint))
            .json(&CreateIntentRequest {
                booking_id: booking.id,
                amount,
            })
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Payment provider request failed");
                AppError::StoreUnavailable(format!("payment provider: {}", e))
            })?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "Payment provider returned an error");
            return Err(AppError::StoreUnavailable(format!(
                "payment provider returned {}",
                response.status()
            )));
        }

        response.json::<PaymentIntent>().await.map_err(|e| {
            warn!(error = %e, "Failed to decode payment provider response");
            AppError::StoreUnavailable(format!("payment provider: {}", e))
        })
    }
}

/// Fixed-URL implementation for development and tests.
pub struct StaticPaymentClient {
    base_url: String,
}

impl StaticPaymentClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
        }
    }
}

#[async_trait]
impl PaymentClient for StaticPaymentClient {
    async fn create_intent(&self, booking: &Booking) -> Result<PaymentIntent, AppError> {
        booking.price.ok_or(AppError::NoPriceSet)?;

        Ok(PaymentIntent {
            url: format!("{}/{}", self.base_url, booking.id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_static_client_builds_checkout_url() {
        let client = StaticPaymentClient::new("https://pay.test/checkout");
        let mut booking = Booking::new(42, 1, 2, Utc::now());
        booking.price = Some(50.0);

        let intent = client.create_intent(&booking).await.unwrap();
        assert_eq!(intent.url, "https://pay.test/checkout/42");
    }

    #[tokio::test]
    async fn test_intent_without_price_fails() {
        let client = StaticPaymentClient::new("https://pay.test/checkout");
        let booking = Booking::new(42, 1, 2, Utc::now());

        assert!(matches!(
            client.create_intent(&booking).await,
            Err(AppError::NoPriceSet)
        ));
    }
}
