pub mod client;
pub mod handlers;

pub use client::{HttpPaymentClient, PaymentClient, PaymentIntent, StaticPaymentClient};
pub use handlers::create_payment_intent;
