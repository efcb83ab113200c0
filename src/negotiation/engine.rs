use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::booking::locks::BookingLocks;
use crate::booking::models::{Booking, Role};
use crate::booking::repository::BookingRepository;
use crate::event::{BookingRoomEvent, EventBus};
use crate::shared::AppError;

/// The price-negotiation state machine.
///
/// `Pending` → `Negotiating` → `Confirmed`, with `Cancelled` reachable via
/// an external path. Any terminal status locks the booking against further
/// negotiation. Every mutation is a read-modify-write of the canonical store
/// record under the per-booking lock, and the engine emits the resulting
/// `booking_updated` broadcast itself, so a REST mutation and its socket
/// fan-out can never fall out of sync.
pub struct NegotiationEngine {
    bookings: Arc<dyn BookingRepository + Send + Sync>,
    locks: Arc<BookingLocks>,
    event_bus: EventBus,
}

impl NegotiationEngine {
    pub fn new(
        bookings: Arc<dyn BookingRepository + Send + Sync>,
        locks: Arc<BookingLocks>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            bookings,
            locks,
            event_bus,
        }
    }

    /// Proposes a new price for the booking.
    ///
    /// Valid while the booking is `Pending` or `Negotiating`. Sets the price,
    /// resets both agreement flags (a new proposal invalidates prior
    /// agreement) and moves the booking to `Negotiating`. Returns the full
    /// canonical record.
    #[instrument(skip(self))]
    pub async fn propose_price(
        &self,
        booking_id: i64,
        proposer: Role,
        amount: f64,
    ) -> Result<Booking, AppError> {
        if !amount.is_finite() || amount <= 0.0 {
            warn!(booking_id, %proposer, amount, "Rejecting non-positive price proposal");
            return Err(AppError::InvalidAmount(format!(
                "price must be a positive number, got {}",
                amount
            )));
        }

        let _guard = self.locks.acquire(booking_id).await;

        let booking = self
            .bookings
            .get_booking(booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", booking_id)))?;

        // Price is frozen once both parties agreed or the booking reached a
        // terminal state; no silent reopening.
        if booking.both_parties_agreed() || booking.status.is_terminal() {
            warn!(
                booking_id,
                %proposer,
                status = %booking.status,
                "Rejecting price proposal on locked booking"
            );
            return Err(AppError::NegotiationLocked);
        }

        let updated = self.bookings.update_booking_price(booking_id, amount).await?;

        info!(
            booking_id,
            %proposer,
            price = amount,
            status = %updated.status,
            "Price proposed"
        );

        self.event_bus
            .emit_to_room(
                booking_id,
                BookingRoomEvent::BookingUpdated {
                    booking: updated.clone(),
                },
            )
            .await;

        Ok(updated)
    }

    /// Records `role`'s agreement to the currently proposed price.
    ///
    /// Requires a proposed price. When both parties have agreed the booking
    /// becomes `Confirmed`. Agreement on an already-confirmed booking is
    /// rejected rather than silently accepted, to surface client bugs.
    #[instrument(skip(self))]
    pub async fn agree_to_price(&self, booking_id: i64, role: Role) -> Result<Booking, AppError> {
        let _guard = self.locks.acquire(booking_id).await;

        let booking = self
            .bookings
            .get_booking(booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", booking_id)))?;

        if booking.both_parties_agreed() || booking.status.is_terminal() {
            warn!(booking_id, %role, status = %booking.status, "Rejecting agreement on locked booking");
            return Err(AppError::NegotiationLocked);
        }

        if booking.price.is_none() {
            warn!(booking_id, %role, "Rejecting agreement before any price proposal");
            return Err(AppError::NoPriceSet);
        }

        let updated = self.bookings.set_agreement(booking_id, role).await?;

        info!(
            booking_id,
            %role,
            status = %updated.status,
            "Agreement recorded"
        );

        self.event_bus
            .emit_to_room(
                booking_id,
                BookingRoomEvent::BookingUpdated {
                    booking: updated.clone(),
                },
            )
            .await;

        Ok(updated)
    }
}
