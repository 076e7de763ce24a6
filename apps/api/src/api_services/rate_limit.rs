use std::sync::Arc;
use std::time::Duration;

use formwell_application::{RateLimitRepository, RateLimitService};
use formwell_infrastructure::{PostgresRateLimitRepository, RedisRateLimitRepository};
use sqlx::PgPool;
use tracing::{info, warn};

const CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

pub(super) fn build_rate_limit_service(
    pool: &PgPool,
    redis_client: Option<redis::Client>,
) -> RateLimitService {
    let repository: Arc<dyn RateLimitRepository> = match redis_client {
        Some(client) => Arc::new(RedisRateLimitRepository::new(client, "formwell:rate_limit")),
        None => Arc::new(PostgresRateLimitRepository::new(pool.clone())),
    };

    RateLimitService::new(repository)
}

/// Periodically prunes stale throttle windows.
pub(super) fn spawn_rate_limit_cleanup(service: RateLimitService) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            match service.cleanup().await {
                Ok(0) => {}
                Ok(removed) => info!(removed, "pruned stale rate limit windows"),
                Err(error) => warn!(error = %error, "rate limit cleanup failed"),
            }
        }
    });
}
