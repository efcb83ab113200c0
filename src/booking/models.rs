use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Negotiating party attached to a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum Role {
    Client,
    Provider,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Client => write!(f, "client"),
            Role::Provider => write!(f, "provider"),
        }
    }
}

/// Lifecycle state of a booking within the negotiation subsystem.
///
/// `Confirmed` and `Cancelled` are terminal here; payment and later states
/// live outside this subsystem. Serialized as PascalCase strings, the values
/// clients switch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
pub enum BookingStatus {
    Pending,
    Negotiating,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    /// Terminal states reject any further negotiation mutation.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Confirmed | BookingStatus::Cancelled)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Negotiating => "Negotiating",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Cancelled => "Cancelled",
        };
        write!(f, "{}", s)
    }
}

/// Canonical booking record, owned by the booking store.
///
/// The negotiation engine never holds an independent copy: every mutation is
/// a read-modify-write against the store, and every successful transition
/// returns this full record rather than a partial patch.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub client_id: i64,
    pub provider_id: i64,
    pub status: BookingStatus,
    pub price: Option<f64>,
    pub agreement_signed_by_client: bool,
    pub agreement_signed_by_provider: bool,
    pub notes: Option<String>,
    pub scheduled_date: DateTime<Utc>,
}

impl Booking {
    /// Creates a fresh booking in the initial `Pending` state with no price.
    pub fn new(id: i64, client_id: i64, provider_id: i64, scheduled_date: DateTime<Utc>) -> Self {
        Self {
            id,
            client_id,
            provider_id,
            status: BookingStatus::Pending,
            price: None,
            agreement_signed_by_client: false,
            agreement_signed_by_provider: false,
            notes: None,
            scheduled_date,
        }
    }

    pub fn both_parties_agreed(&self) -> bool {
        self.agreement_signed_by_client && self.agreement_signed_by_provider
    }

    pub fn agreement_flag(&self, role: Role) -> bool {
        match role {
            Role::Client => self.agreement_signed_by_client,
            Role::Provider => self.agreement_signed_by_provider,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_booking_starts_pending_without_price() {
        let booking = Booking::new(1, 10, 20, Utc::now());

        assert_eq!(booking.status, BookingStatus::Pending);
        assert!(booking.price.is_none());
        assert!(!booking.agreement_signed_by_client);
        assert!(!booking.agreement_signed_by_provider);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!BookingStatus::Pending.is_terminal());
        assert!(!BookingStatus::Negotiating.is_terminal());
        assert!(BookingStatus::Confirmed.is_terminal());
        assert!(BookingStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_status_serializes_as_pascal_case() {
        let json = serde_json::to_string(&BookingStatus::Negotiating).unwrap();
        assert_eq!(json, "\"Negotiating\"");

        let role_json = serde_json::to_string(&Role::Provider).unwrap();
        assert_eq!(role_json, "\"provider\"");
    }
}
