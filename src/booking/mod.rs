pub mod handlers;
pub mod locks;
pub mod models;
pub mod repository;

pub use models::{Booking, BookingStatus, Role};
