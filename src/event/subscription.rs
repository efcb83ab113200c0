use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{bus::EventBus, handler::BookingEventHandler};

/// Routes one booking room's events to a handler.
///
/// `start` subscribes before spawning, so events emitted after the
/// subscription is ensured are never lost.
pub struct RoomSubscription {
    booking_id: i64,
    handler: Arc<dyn BookingEventHandler>,
    event_bus: EventBus,
}

impl RoomSubscription {
    pub fn new(booking_id: i64, handler: Arc<dyn BookingEventHandler>, event_bus: EventBus) -> Self {
        Self {
            booking_id,
            handler,
            event_bus,
        }
    }

    /// Start the subscription - spawns a background task that listens to room
    /// events and routes them to the handler, one at a time in arrival order.
    pub async fn start(self) -> JoinHandle<()> {
        let booking_id = self.booking_id;
        let handler_name = self.handler.handler_name();

        info!(booking_id, handler = handler_name, "Starting room subscription");

        let mut receiver = self.event_bus.subscribe_to_room(booking_id).await;

        tokio::spawn(async move {
            while let Ok(event) = receiver.recv().await {
                debug!(
                    booking_id,
                    handler = handler_name,
                    event = event.event_type(),
                    "Received room event"
                );

                if let Err(e) = self.handler.handle_room_event(booking_id, event).await {
                    warn!(
                        booking_id,
                        handler = handler_name,
                        error = %e,
                        "Room event handler failed"
                    );
                }
            }

            info!(
                booking_id,
                handler = handler_name,
                "Room subscription ended - no more events"
            );
        })
    }
}

/// Lazily starts exactly one subscription task per booking room.
pub struct SubscriptionManager {
    event_bus: EventBus,
    handler: Arc<dyn BookingEventHandler>,
    tasks: RwLock<HashMap<i64, JoinHandle<()>>>,
}

impl SubscriptionManager {
    pub fn new(event_bus: EventBus, handler: Arc<dyn BookingEventHandler>) -> Self {
        Self {
            event_bus,
            handler,
            tasks: RwLock::new(HashMap::new()),
        }
    }

    /// Ensures a subscription task is running for `booking_id`. Idempotent.
    pub async fn ensure_started(&self, booking_id: i64) {
        {
            let tasks = self.tasks.read().await;
            if tasks.contains_key(&booking_id) {
                return;
            }
        }

        let mut tasks = self.tasks.write().await;
        if tasks.contains_key(&booking_id) {
            return; // lost the race, another caller started it
        }

        let subscription = RoomSubscription::new(
            booking_id,
            Arc::clone(&self.handler),
            self.event_bus.clone(),
        );
        let handle = subscription.start().await;
        tasks.insert(booking_id, handle);
    }

    /// Aborts and forgets the subscription task for `booking_id`. Returns
    /// whether a task was running. `ensure_started` brings it back.
    pub async fn stop(&self, booking_id: i64) -> bool {
        let handle = self.tasks.write().await.remove(&booking_id);
        match handle {
            Some(handle) => {
                handle.abort();
                debug!(booking_id, "Subscription task stopped");
                true
            }
            None => false,
        }
    }

    /// Booking ids with a subscription task, running or finished.
    pub async fn tracked_bookings(&self) -> Vec<i64> {
        self.tasks.read().await.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::models::Role;
    use crate::event::events::BookingRoomEvent;
    use crate::event::handler::BookingEventError;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    struct RecordingHandler {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl BookingEventHandler for RecordingHandler {
        async fn handle_room_event(
            &self,
            _booking_id: i64,
            event: BookingRoomEvent,
        ) -> Result<(), BookingEventError> {
            self.seen.lock().unwrap().push(event.event_type().to_string());
            Ok(())
        }

        fn handler_name(&self) -> &'static str {
            "RecordingHandler"
        }
    }

    #[tokio::test]
    async fn test_events_after_ensure_started_reach_the_handler() {
        let bus = EventBus::new();
        let handler = Arc::new(RecordingHandler {
            seen: Mutex::new(vec![]),
        });
        let manager = SubscriptionManager::new(bus.clone(), handler.clone());

        manager.ensure_started(7).await;
        manager.ensure_started(7).await; // idempotent

        bus.emit_to_room(
            7,
            BookingRoomEvent::ParticipantJoined {
                connection_id: "c1".to_string(),
                role: Role::Client,
            },
        )
        .await;

        // Give the subscription task a chance to run
        tokio::time::sleep(Duration::from_millis(50)).await;

        let seen = handler.seen.lock().unwrap().clone();
        assert_eq!(seen, vec!["participant_joined".to_string()]);
    }

    #[tokio::test]
    async fn test_stop_forgets_the_task_and_ensure_started_restarts() {
        let bus = EventBus::new();
        let handler = Arc::new(RecordingHandler {
            seen: Mutex::new(vec![]),
        });
        let manager = SubscriptionManager::new(bus.clone(), handler.clone());

        manager.ensure_started(7).await;
        assert_eq!(manager.tracked_bookings().await, vec![7]);

        assert!(manager.stop(7).await);
        assert!(!manager.stop(7).await);
        assert!(manager.tracked_bookings().await.is_empty());

        // Events emitted while stopped are dropped; a restart resumes routing
        manager.ensure_started(7).await;
        bus.emit_to_room(
            7,
            BookingRoomEvent::ParticipantLeft {
                connection_id: "c1".to_string(),
                role: Role::Client,
            },
        )
        .await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        let seen = handler.seen.lock().unwrap().clone();
        assert_eq!(seen, vec!["participant_left".to_string()]);
    }
}
