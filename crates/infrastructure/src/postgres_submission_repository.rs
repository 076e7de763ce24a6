//! PostgreSQL-backed submission repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use formwell_application::SubmissionRepository;
use formwell_core::{AccountId, AppError, AppResult};
use formwell_domain::{FormId, Submission, SubmissionData, SubmissionId};

/// PostgreSQL implementation of the submission repository port.
#[derive(Clone)]
pub struct PostgresSubmissionRepository {
    pool: PgPool,
}

impl PostgresSubmissionRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubmissionRepository for PostgresSubmissionRepository {
    async fn create_submission(&self, submission: &Submission) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO submissions (id, form_id, data, ip_address, user_agent, submitted_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(submission.id().as_uuid())
        .bind(submission.form_id().as_uuid())
        .bind(submission.data().to_json())
        .bind(submission.ip_address())
        .bind(submission.user_agent())
        .bind(submission.submitted_at())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to insert submission for form '{}': {error}",
                submission.form_id()
            ))
        })?;

        Ok(())
    }

    async fn list_submissions(&self, form_id: FormId) -> AppResult<Vec<Submission>> {
        let rows = sqlx::query_as::<_, SubmissionRow>(
            r#"
            SELECT id, form_id, data, ip_address, user_agent, submitted_at
            FROM submissions
            WHERE form_id = $1
            ORDER BY submitted_at DESC
            "#,
        )
        .bind(form_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list submissions for form '{form_id}': {error}"
            ))
        })?;

        rows.into_iter().map(SubmissionRow::into_submission).collect()
    }

    async fn count_submissions_since(
        &self,
        owner_id: AccountId,
        since: DateTime<Utc>,
    ) -> AppResult<u64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM submissions
            INNER JOIN forms ON forms.id = submissions.form_id
            WHERE forms.owner_id = $1
              AND submissions.submitted_at >= $2
            "#,
        )
        .bind(owner_id.as_uuid())
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to count submissions for owner '{owner_id}': {error}"
            ))
        })?;

        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn count_form_submissions_since(
        &self,
        form_id: FormId,
        since: DateTime<Utc>,
    ) -> AppResult<u64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM submissions
            WHERE form_id = $1
              AND submitted_at >= $2
            "#,
        )
        .bind(form_id.as_uuid())
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to count submissions for form '{form_id}': {error}"
            ))
        })?;

        Ok(u64::try_from(count).unwrap_or_default())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SubmissionRow {
    id: Uuid,
    form_id: Uuid,
    data: Value,
    ip_address: Option<String>,
    user_agent: Option<String>,
    submitted_at: DateTime<Utc>,
}

impl SubmissionRow {
    fn into_submission(self) -> AppResult<Submission> {
        Ok(Submission::from_parts(
            SubmissionId::from_uuid(self.id),
            FormId::from_uuid(self.form_id),
            SubmissionData::from_json(self.data)?,
            self.ip_address,
            self.user_agent,
            self.submitted_at,
        ))
    }
}
