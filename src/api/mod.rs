//! HTTP API handlers for arr-warden

pub mod health;
pub mod webhook;

pub use health::health_routes;
pub use webhook::{handle_webhook, ROUTING_HEADER};
