//! PostgreSQL-backed throttling counters in the `submission_rate_limits` table.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;

use formwell_application::{AttemptInfo, RateLimitRepository};
use formwell_core::{AppError, AppResult};

/// PostgreSQL implementation of the rate limit repository port.
#[derive(Clone)]
pub struct PostgresRateLimitRepository {
    pool: PgPool,
}

impl PostgresRateLimitRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Windows that started before the returned instant are stale at `now`.
fn stale_before(now: DateTime<Utc>, window_duration_seconds: i64) -> AppResult<DateTime<Utc>> {
    if window_duration_seconds <= 0 {
        return Err(AppError::Validation(
            "rate limit window must be greater than zero".to_owned(),
        ));
    }

    Duration::try_seconds(window_duration_seconds)
        .and_then(|window| now.checked_sub_signed(window))
        .ok_or_else(|| {
            AppError::Validation(format!(
                "rate limit window of {window_duration_seconds}s is out of range"
            ))
        })
}

#[async_trait]
impl RateLimitRepository for PostgresRateLimitRepository {
    async fn record_attempt(
        &self,
        key: &str,
        window_duration_seconds: i64,
    ) -> AppResult<AttemptInfo> {
        let now = Utc::now();
        let cutoff = stale_before(now, window_duration_seconds)?;

        let row = sqlx::query_as::<_, AttemptRow>(
            r#"
            INSERT INTO submission_rate_limits AS limits (key, window_started_at, attempt_count)
            VALUES ($1, $2, 1)
            ON CONFLICT (key) DO UPDATE
            SET
                attempt_count = CASE
                    WHEN limits.window_started_at < $3 THEN 1
                    ELSE limits.attempt_count + 1
                END,
                window_started_at = CASE
                    WHEN limits.window_started_at < $3 THEN EXCLUDED.window_started_at
                    ELSE limits.window_started_at
                END
            RETURNING attempt_count, window_started_at
            "#,
        )
        .bind(key)
        .bind(now)
        .bind(cutoff)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to record submission attempt: {error}"))
        })?;

        Ok(AttemptInfo {
            attempt_count: row.attempt_count,
            window_started_at: row.window_started_at,
        })
    }

    async fn cleanup_expired(&self, before: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM submission_rate_limits
            WHERE window_started_at < $1
            "#,
        )
        .bind(before)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to delete stale submission windows: {error}"))
        })?;

        Ok(result.rows_affected())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AttemptRow {
    attempt_count: i32,
    window_started_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::stale_before;

    #[test]
    fn cutoff_is_one_window_back() {
        let now = Utc::now();
        assert!(matches!(
            stale_before(now, 600),
            Ok(cutoff) if now - cutoff == Duration::seconds(600)
        ));
    }

    #[test]
    fn non_positive_windows_are_rejected() {
        let now = Utc::now();
        assert!(stale_before(now, 0).is_err());
        assert!(stale_before(now, -5).is_err());
        assert!(stale_before(now, i64::MAX).is_err());
    }
}
