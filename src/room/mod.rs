pub mod cleanup_task;
pub mod registry;

pub use cleanup_task::{start_cleanup_task, CleanupConfig};
pub use registry::{RoomRegistry, RoomSession};
