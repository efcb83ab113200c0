use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, info, instrument};

use super::registry::RoomRegistry;
use crate::booking::locks::BookingLocks;
use crate::event::{EventBus, SubscriptionManager};

/// Configuration for the cleanup task
#[derive(Debug, Clone)]
pub struct CleanupConfig {
    /// How often to sweep for idle rooms
    pub cleanup_interval: Duration,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            cleanup_interval: Duration::from_secs(60),
        }
    }
}

/// Starts the background task that reclaims per-booking resources once a
/// room has no members left.
///
/// Channels, subscription tasks and lock entries are created lazily on the
/// first join, so without this sweep a long-running server accumulates one
/// of each for every booking ever joined.
#[instrument(skip(registry, event_bus, subscriptions, locks))]
pub async fn start_cleanup_task(
    registry: Arc<RoomRegistry>,
    event_bus: EventBus,
    subscriptions: Arc<SubscriptionManager>,
    locks: Arc<BookingLocks>,
    config: CleanupConfig,
) {
    info!(
        cleanup_interval_secs = config.cleanup_interval.as_secs(),
        "Starting room cleanup background task"
    );

    let mut cleanup_interval = interval(config.cleanup_interval);

    loop {
        cleanup_interval.tick().await;

        let reclaimed = cleanup_idle_rooms(&registry, &event_bus, &subscriptions, &locks).await;
        if reclaimed > 0 {
            info!(reclaimed, "Room cleanup completed");
        } else {
            debug!("No idle rooms to clean up");
        }
    }
}

/// Reclaims the channel, subscription task and lock entry of every booking
/// whose room is empty. Returns the number of rooms reclaimed.
async fn cleanup_idle_rooms(
    registry: &Arc<RoomRegistry>,
    event_bus: &EventBus,
    subscriptions: &Arc<SubscriptionManager>,
    locks: &Arc<BookingLocks>,
) -> usize {
    let mut reclaimed = 0;

    for booking_id in subscriptions.tracked_bookings().await {
        if !registry.members_of(booking_id).await.is_empty() {
            continue;
        }

        subscriptions.stop(booking_id).await;

        // A connection may have joined while we were stopping; put the
        // subscription back rather than leave the room unserved.
        if !registry.members_of(booking_id).await.is_empty() {
            subscriptions.ensure_started(booking_id).await;
            continue;
        }

        event_bus.remove_room(booking_id).await;
        locks.release_if_unused(booking_id).await;
        debug!(booking_id, "Reclaimed idle room resources");
        reclaimed += 1;
    }

    reclaimed
}
