mod billing;
mod database;
mod email;
mod notifications;
mod rate_limit;
mod redis;
mod state_builder;

pub use database::connect_and_migrate;
pub use state_builder::build_app_state;
