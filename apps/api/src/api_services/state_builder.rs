use std::sync::Arc;

use formwell_application::{
    BillingService, EntitlementService, FormRepository, FormService, IntakeService,
    SubmissionRepository, UsageService,
};
use formwell_core::AppError;
use formwell_infrastructure::{PostgresFormRepository, PostgresSubmissionRepository};
use sqlx::PgPool;

use crate::api_config::ApiConfig;
use crate::state::AppState;

use super::billing::build_billing_gateway;
use super::email::build_email_service;
use super::notifications::start_notification_pipeline;
use super::rate_limit::{build_rate_limit_service, spawn_rate_limit_cleanup};
use super::redis::build_redis_client;

pub fn build_app_state(pool: PgPool, config: &ApiConfig) -> Result<AppState, AppError> {
    let http_client = reqwest::Client::new();
    let redis_client = config.redis_url().map(build_redis_client).transpose()?;

    let form_repository: Arc<dyn FormRepository> =
        Arc::new(PostgresFormRepository::new(pool.clone()));
    let submission_repository: Arc<dyn SubmissionRepository> =
        Arc::new(PostgresSubmissionRepository::new(pool.clone()));

    let billing_gateway = build_billing_gateway(config, http_client.clone());
    let usage_service = UsageService::new(
        EntitlementService::new(billing_gateway.clone()),
        form_repository.clone(),
        submission_repository.clone(),
    );

    let email_service = build_email_service(config, http_client);
    let notification_queue =
        start_notification_pipeline(config.notification_queue_capacity, email_service);

    let rate_limit_service = build_rate_limit_service(&pool, redis_client.clone());
    spawn_rate_limit_cleanup(rate_limit_service.clone());

    Ok(AppState {
        form_service: FormService::new(
            form_repository.clone(),
            submission_repository.clone(),
            usage_service.clone(),
        ),
        intake_service: IntakeService::new(
            form_repository,
            submission_repository,
            usage_service.clone(),
            notification_queue,
            config.submission_quota_mode,
        ),
        usage_service,
        billing_service: BillingService::new(billing_gateway),
        rate_limit_service,
        public_submit_rule: config.public_submit_rate_limit.clone(),
        gateway_shared_secret: config.gateway_shared_secret.clone(),
        trusted_proxies: Arc::from(config.trusted_proxies.clone()),
        postgres_pool: Some(pool),
        redis_client,
    })
}
