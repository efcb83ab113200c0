// Event-driven plumbing for booking rooms.
//
// Store mutations emit facts onto the bus; per-booking subscription tasks
// fan them out to connected clients.

// Public API - what other modules can use
pub use bus::EventBus;
pub use events::BookingRoomEvent;
pub use handler::{BookingEventError, BookingEventHandler};
pub use subscription::{RoomSubscription, SubscriptionManager};

// Internal modules
mod bus;
mod events;
mod handler;
mod subscription;
