//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod channel_notification_queue;
mod http_billing_gateway;
mod http_email_service;
mod in_memory_form_store;
mod logging_email_service;
mod postgres_form_repository;
mod postgres_rate_limit_repository;
mod postgres_submission_repository;
mod redis_rate_limit_repository;
mod static_billing_gateway;

pub use channel_notification_queue::{ChannelNotificationQueue, spawn_notification_worker};
pub use http_billing_gateway::HttpBillingGateway;
pub use http_email_service::{HttpEmailConfig, HttpEmailService};
pub use in_memory_form_store::InMemoryFormStore;
pub use logging_email_service::LoggingEmailService;
pub use postgres_form_repository::PostgresFormRepository;
pub use postgres_rate_limit_repository::PostgresRateLimitRepository;
pub use postgres_submission_repository::PostgresSubmissionRepository;
pub use redis_rate_limit_repository::RedisRateLimitRepository;
pub use static_billing_gateway::{STATIC_PRO_PRODUCT_ID, StaticBillingGateway};
