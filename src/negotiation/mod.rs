pub mod engine;

pub use engine::NegotiationEngine;
