//! Redis-backed throttling counters using fixed windows.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use redis::Script;

use formwell_application::{AttemptInfo, RateLimitRepository};
use formwell_core::{AppError, AppResult};

// Counts into a per-window key and arms its expiry on the first hit.
const COUNT_IN_WINDOW_SCRIPT: &str = r#"
local count = redis.call('INCR', KEYS[1])
if count == 1 then
  redis.call('EXPIRE', KEYS[1], tonumber(ARGV[1]))
end
return count
"#;

/// Redis implementation of the rate limit repository port.
///
/// Each window gets its own key, so expired windows vanish through TTL and
/// `cleanup_expired` has nothing to do.
#[derive(Clone)]
pub struct RedisRateLimitRepository {
    client: redis::Client,
    key_prefix: String,
}

impl RedisRateLimitRepository {
    /// Creates a repository with a configured Redis client and key prefix.
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    fn window_key(&self, key: &str, window_start_epoch: i64) -> String {
        format!("{}:{key}:{window_start_epoch}", self.key_prefix)
    }
}

fn window_start_epoch(now_epoch: i64, window_duration_seconds: i64) -> i64 {
    now_epoch - now_epoch.rem_euclid(window_duration_seconds)
}

#[async_trait]
impl RateLimitRepository for RedisRateLimitRepository {
    async fn record_attempt(
        &self,
        key: &str,
        window_duration_seconds: i64,
    ) -> AppResult<AttemptInfo> {
        if window_duration_seconds <= 0 {
            return Err(AppError::Validation(
                "rate limit window must be greater than zero".to_owned(),
            ));
        }

        let window_start = window_start_epoch(Utc::now().timestamp(), window_duration_seconds);
        let window_started_at = Utc
            .timestamp_opt(window_start, 0)
            .single()
            .ok_or_else(|| {
                AppError::Internal(format!("invalid rate limit window start: {window_start}"))
            })?;

        let mut connection = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Internal(format!("failed to connect to redis: {error}")))?;

        let attempt_count: i64 = Script::new(COUNT_IN_WINDOW_SCRIPT)
            .key(self.window_key(key, window_start))
            .arg(window_duration_seconds)
            .invoke_async(&mut connection)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to record submission attempt: {error}"))
            })?;

        Ok(AttemptInfo {
            attempt_count: i32::try_from(attempt_count).unwrap_or(i32::MAX),
            window_started_at,
        })
    }

    async fn cleanup_expired(&self, _before: DateTime<Utc>) -> AppResult<u64> {
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::{RedisRateLimitRepository, window_start_epoch};

    #[test]
    fn windows_align_to_their_length() {
        assert_eq!(window_start_epoch(1_000, 600), 600);
        assert_eq!(window_start_epoch(1_200, 600), 1_200);
        assert_eq!(window_start_epoch(1_799, 600), 1_200);
    }

    #[test]
    fn keys_carry_prefix_and_window() {
        let client = redis::Client::open("redis://127.0.0.1:6379")
            .unwrap_or_else(|_| unreachable!());
        let repository = RedisRateLimitRepository::new(client, "formwell:rate");

        assert_eq!(
            repository.window_key("public_submit:ab12", 1_200),
            "formwell:rate:public_submit:ab12:1200"
        );
    }
}
