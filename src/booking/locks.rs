use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

/// Keyed async lock map scoping mutual exclusion to a single booking id.
///
/// Every read-modify-write against the booking store must run under the
/// booking's lock so that suspended store I/O cannot interleave with a later
/// event for the same booking. Operations for different bookings share no
/// state and proceed without coordination.
pub struct BookingLocks {
    locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl Default for BookingLocks {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingLocks {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Acquires the lock for `booking_id`, waiting FIFO behind any in-flight
    /// operation on the same booking.
    pub async fn acquire(&self, booking_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks
                .entry(booking_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };

        debug!(booking_id, "Acquiring booking lock");
        lock.lock_owned().await
    }

    /// Drops the entry for `booking_id` if no task holds or waits on it.
    /// Guards and waiters each hold a clone of the inner `Arc`, so a strong
    /// count of one means the entry is idle.
    pub async fn release_if_unused(&self, booking_id: i64) -> bool {
        let mut locks = self.locks.lock().await;
        match locks.get(&booking_id) {
            Some(lock) if Arc::strong_count(lock) == 1 => {
                locks.remove(&booking_id);
                debug!(booking_id, "Booking lock entry released");
                true
            }
            _ => false,
        }
    }
}
