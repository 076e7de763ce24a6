use std::sync::Arc;

use formwell_application::{
    BillingService, FormService, IntakeService, RateLimitRule, RateLimitService, UsageService,
};
use ipnet::IpNet;
use sqlx::PgPool;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub form_service: FormService,
    pub intake_service: IntakeService,
    pub usage_service: UsageService,
    pub billing_service: BillingService,
    pub rate_limit_service: RateLimitService,
    pub public_submit_rule: RateLimitRule,
    pub gateway_shared_secret: String,
    pub trusted_proxies: Arc<[IpNet]>,
    pub postgres_pool: Option<PgPool>,
    pub redis_client: Option<redis::Client>,
}
