//! Fixed-window throttling for the public submission endpoint.
//!
//! Client identifiers are hashed before they reach storage.

mod config;
mod ports;
mod service;

pub use config::RateLimitRule;
pub use ports::{AttemptInfo, RateLimitRepository};
pub use service::RateLimitService;
