use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::{Booking, BookingStatus, Role};
use crate::shared::AppError;

/// Trait for booking store operations.
///
/// `update_booking_price` and `set_agreement` apply their transition
/// atomically against the canonical record; validity of the transition is
/// checked by the negotiation engine beforehand, under the per-booking lock.
#[async_trait]
pub trait BookingRepository {
    async fn create_booking(&self, booking: &Booking) -> Result<(), AppError>;
    async fn get_booking(&self, booking_id: i64) -> Result<Option<Booking>, AppError>;

    /// Sets the price, resets both agreement flags and moves the booking to
    /// `Negotiating`. A new proposal always invalidates prior agreement.
    async fn update_booking_price(&self, booking_id: i64, price: f64) -> Result<Booking, AppError>;

    /// Sets the agreement flag for `role`. When both flags end up true the
    /// booking becomes `Confirmed`.
    async fn set_agreement(&self, booking_id: i64, role: Role) -> Result<Booking, AppError>;
}

/// In-memory implementation of BookingRepository for development and testing
pub struct InMemoryBookingRepository {
    bookings: Mutex<HashMap<i64, Booking>>,
}

impl Default for InMemoryBookingRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBookingRepository {
    pub fn new() -> Self {
        Self {
            bookings: Mutex::new(HashMap::new()),
        }
    }

    /// Creates an in-memory repository pre-populated with bookings
    pub fn with_bookings(bookings: Vec<Booking>) -> Self {
        let mut map = HashMap::new();
        for booking in bookings {
            map.insert(booking.id, booking);
        }

        Self {
            bookings: Mutex::new(map),
        }
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    #[instrument(skip(self, booking))]
    async fn create_booking(&self, booking: &Booking) -> Result<(), AppError> {
        debug!(booking_id = booking.id, "Creating booking in memory");

        let mut bookings = self.bookings.lock().unwrap();
        if bookings.contains_key(&booking.id) {
            warn!(booking_id = booking.id, "Booking already exists in memory");
            return Err(AppError::StoreUnavailable(
                "Booking already exists".to_string(),
            ));
        }
        bookings.insert(booking.id, booking.clone());

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_booking(&self, booking_id: i64) -> Result<Option<Booking>, AppError> {
        debug!(booking_id, "Fetching booking from memory");

        let bookings = self.bookings.lock().unwrap();
        Ok(bookings.get(&booking_id).cloned())
    }

    #[instrument(skip(self))]
    async fn update_booking_price(&self, booking_id: i64, price: f64) -> Result<Booking, AppError> {
        debug!(booking_id, price, "Updating booking price in memory");

        let mut bookings = self.bookings.lock().unwrap();
        let booking = bookings
            .get_mut(&booking_id)
            .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", booking_id)))?;

        booking.price = Some(price);
        booking.agreement_signed_by_client = false;
        booking.agreement_signed_by_provider = false;
        booking.status = BookingStatus::Negotiating;

        Ok(booking.clone())
    }

    #[instrument(skip(self))]
    async fn set_agreement(&self, booking_id: i64, role: Role) -> Result<Booking, AppError> {
        debug!(booking_id, %role, "Setting agreement flag in memory");

        let mut bookings = self.bookings.lock().unwrap();
        let booking = bookings
            .get_mut(&booking_id)
            .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", booking_id)))?;

        match role {
            Role::Client => booking.agreement_signed_by_client = true,
            Role::Provider => booking.agreement_signed_by_provider = true,
        }
        if booking.both_parties_agreed() {
            booking.status = BookingStatus::Confirmed;
        }

        Ok(booking.clone())
    }
}

/// PostgreSQL implementation of the booking store
pub struct PostgresBookingRepository {
    pool: PgPool,
}

impl PostgresBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for PostgresBookingRepository {
    #[instrument(skip(self, booking))]
    async fn create_booking(&self, booking: &Booking) -> Result<(), AppError> {
        debug!(booking_id = booking.id, "Creating booking in database");

        sqlx::query(
            "INSERT INTO bookings (id, client_id, provider_id, status, price, \
             agreement_signed_by_client, agreement_signed_by_provider, notes, scheduled_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(booking.id)
        .bind(booking.client_id)
        .bind(booking.provider_id)
        .bind(booking.status.to_string())
        .bind(booking.price)
        .bind(booking.agreement_signed_by_client)
        .bind(booking.agreement_signed_by_provider)
        .bind(&booking.notes)
        .bind(booking.scheduled_date)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create booking in database");
            AppError::StoreUnavailable(e.to_string())
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_booking(&self, booking_id: i64) -> Result<Option<Booking>, AppError> {
        debug!(booking_id, "Fetching booking from database");

        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(booking_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, booking_id, "Failed to fetch booking from database");
                AppError::StoreUnavailable(e.to_string())
            })
    }

    #[instrument(skip(self))]
    async fn update_booking_price(&self, booking_id: i64, price: f64) -> Result<Booking, AppError> {
        debug!(booking_id, price, "Updating booking price in database");

        sqlx::query_as::<_, Booking>(
            "UPDATE bookings \
             SET price = $2, \
                 agreement_signed_by_client = FALSE, \
                 agreement_signed_by_provider = FALSE, \
                 status = 'Negotiating' \
             WHERE id = $1 \
             RETURNING *",
        )
        .bind(booking_id)
        .bind(price)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, booking_id, "Failed to update booking price in database");
            AppError::StoreUnavailable(e.to_string())
        })?
        .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", booking_id)))
    }

    #[instrument(skip(self))]
    async fn set_agreement(&self, booking_id: i64, role: Role) -> Result<Booking, AppError> {
        debug!(booking_id, %role, "Setting agreement flag in database");

        let query = match role {
            Role::Client => {
                "UPDATE bookings \
                 SET agreement_signed_by_client = TRUE, \
                     status = CASE WHEN agreement_signed_by_provider THEN 'Confirmed' \
                                   ELSE status END \
                 WHERE id = $1 \
                 RETURNING *"
            }
            Role::Provider => {
                "UPDATE bookings \
                 SET agreement_signed_by_provider = TRUE, \
                     status = CASE WHEN agreement_signed_by_client THEN 'Confirmed' \
                                   ELSE status END \
                 WHERE id = $1 \
                 RETURNING *"
            }
        };

        sqlx::query_as::<_, Booking>(query)
            .bind(booking_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, booking_id, "Failed to set agreement in database");
                AppError::StoreUnavailable(e.to_string())
            })?
            .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", booking_id)))
    }
}
