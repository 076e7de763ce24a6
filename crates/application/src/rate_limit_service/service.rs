use std::fmt::Write as _;
use std::sync::Arc;

use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};

use formwell_core::{AppError, AppResult};

use super::config::RateLimitRule;
use super::ports::RateLimitRepository;

/// Application service for request throttling.
#[derive(Clone)]
pub struct RateLimitService {
    repository: Arc<dyn RateLimitRepository>,
}

impl RateLimitService {
    /// Creates a rate limit service.
    #[must_use]
    pub fn new(repository: Arc<dyn RateLimitRepository>) -> Self {
        Self { repository }
    }

    /// Records an attempt by `identifier` under `rule`.
    ///
    /// Returns `AppError::RateLimited` once the window holds more than
    /// `rule.max_attempts` attempts.
    pub async fn check_rate_limit(&self, rule: &RateLimitRule, identifier: &str) -> AppResult<()> {
        let key = storage_key(rule, identifier);
        let info = self
            .repository
            .record_attempt(key.as_str(), rule.window_seconds)
            .await?;

        if info.attempt_count > rule.max_attempts {
            return Err(AppError::RateLimited(
                "too many requests, please try again later".to_owned(),
            ));
        }

        Ok(())
    }

    /// Removes windows older than a day.
    pub async fn cleanup(&self) -> AppResult<u64> {
        let cutoff = Utc::now() - Duration::hours(24);
        self.repository.cleanup_expired(cutoff).await
    }
}

fn storage_key(rule: &RateLimitRule, identifier: &str) -> String {
    let digest = Sha256::digest(identifier.as_bytes());
    let mut key = String::with_capacity(rule.category.len() + 1 + digest.len() * 2);
    key.push_str(rule.category.as_str());
    key.push(':');
    for byte in digest {
        let _ = write!(key, "{byte:02x}");
    }
    key
}
