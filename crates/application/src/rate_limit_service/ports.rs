use async_trait::async_trait;
use chrono::{DateTime, Utc};

use formwell_core::AppResult;

/// Repository port for throttling counters.
#[async_trait]
pub trait RateLimitRepository: Send + Sync {
    /// Counts one attempt for `key` and returns the state of its window.
    ///
    /// A window older than `window_duration_seconds` restarts at one.
    async fn record_attempt(
        &self,
        key: &str,
        window_duration_seconds: i64,
    ) -> AppResult<AttemptInfo>;

    /// Deletes windows that started before `before`.
    async fn cleanup_expired(&self, before: DateTime<Utc>) -> AppResult<u64>;
}

/// Counter state after recording an attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptInfo {
    /// Attempts in the current window, this one included.
    pub attempt_count: i32,
    /// Start of the current window.
    pub window_started_at: DateTime<Utc>,
}
