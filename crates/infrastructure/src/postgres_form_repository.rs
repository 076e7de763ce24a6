//! PostgreSQL-backed form repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use formwell_application::{FormInsertOutcome, FormRepository, FormSummary};
use formwell_core::{AccountId, AppError, AppResult};
use formwell_domain::{Form, FormField, FormId, FormSchema, FormSettings, PlanLimit};

/// PostgreSQL implementation of the form repository port.
#[derive(Clone)]
pub struct PostgresFormRepository {
    pool: PgPool,
}

impl PostgresFormRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FormRepository for PostgresFormRepository {
    async fn create_form_within_limit(
        &self,
        form: &Form,
        max_forms: PlanLimit,
    ) -> AppResult<FormInsertOutcome> {
        let (fields, settings) = encode_schema(form)?;

        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        if let PlanLimit::Limited(limit) = max_forms {
            // Serializes concurrent creations for one owner until commit.
            sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::text, 0))")
                .bind(form.owner_id().as_uuid())
                .execute(&mut *transaction)
                .await
                .map_err(|error| {
                    AppError::Internal(format!(
                        "failed to lock forms of owner '{}': {error}",
                        form.owner_id()
                    ))
                })?;

            let existing = sqlx::query_scalar::<_, i64>(
                r#"
                SELECT COUNT(*)
                FROM forms
                WHERE owner_id = $1
                "#,
            )
            .bind(form.owner_id().as_uuid())
            .fetch_one(&mut *transaction)
            .await
            .map_err(|error| AppError::Internal(format!("failed to count forms: {error}")))?;
            let existing = u64::try_from(existing).unwrap_or_default();

            if existing >= u64::from(limit) {
                return Ok(FormInsertOutcome::LimitReached { existing });
            }
        }

        sqlx::query(
            r#"
            INSERT INTO forms (
                id, owner_id, name, description, fields, settings, is_active, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(form.id().as_uuid())
        .bind(form.owner_id().as_uuid())
        .bind(form.name())
        .bind(form.description())
        .bind(fields)
        .bind(settings)
        .bind(form.is_active())
        .bind(form.created_at())
        .bind(form.updated_at())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to insert form: {error}")))?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(FormInsertOutcome::Created)
    }

    async fn update_form(&self, form: &Form) -> AppResult<()> {
        let (fields, settings) = encode_schema(form)?;

        let result = sqlx::query(
            r#"
            UPDATE forms
            SET name = $2,
                description = $3,
                fields = $4,
                settings = $5,
                is_active = $6,
                updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(form.id().as_uuid())
        .bind(form.name())
        .bind(form.description())
        .bind(fields)
        .bind(settings)
        .bind(form.is_active())
        .bind(form.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to update form '{}': {error}", form.id()))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("form '{}' not found", form.id())));
        }

        Ok(())
    }

    async fn find_form(&self, form_id: FormId) -> AppResult<Option<Form>> {
        let row = sqlx::query_as::<_, FormRow>(
            r#"
            SELECT id, owner_id, name, description, fields, settings, is_active, created_at, updated_at
            FROM forms
            WHERE id = $1
            "#,
        )
        .bind(form_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load form '{form_id}': {error}"))
        })?;

        row.map(FormRow::into_form).transpose()
    }

    async fn list_forms_for_owner(&self, owner_id: AccountId) -> AppResult<Vec<FormSummary>> {
        let rows = sqlx::query_as::<_, FormSummaryRow>(
            r#"
            SELECT
                forms.id,
                forms.owner_id,
                forms.name,
                forms.description,
                forms.fields,
                forms.settings,
                forms.is_active,
                forms.created_at,
                forms.updated_at,
                COUNT(submissions.id) AS submission_count
            FROM forms
            LEFT JOIN submissions ON submissions.form_id = forms.id
            WHERE forms.owner_id = $1
            GROUP BY forms.id
            ORDER BY forms.created_at DESC
            "#,
        )
        .bind(owner_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list forms for owner '{owner_id}': {error}"
            ))
        })?;

        rows.into_iter()
            .map(|row| {
                Ok(FormSummary {
                    submission_count: u64::try_from(row.submission_count).unwrap_or_default(),
                    form: row.form.into_form()?,
                })
            })
            .collect()
    }

    async fn delete_form(&self, owner_id: AccountId, form_id: FormId) -> AppResult<bool> {
        // Submissions go with the form through ON DELETE CASCADE.
        let result = sqlx::query(
            r#"
            DELETE FROM forms
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(form_id.as_uuid())
        .bind(owner_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to delete form '{form_id}': {error}"))
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_forms(&self, owner_id: AccountId) -> AppResult<u64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM forms
            WHERE owner_id = $1
            "#,
        )
        .bind(owner_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to count forms: {error}")))?;

        Ok(u64::try_from(count).unwrap_or_default())
    }
}

fn encode_schema(form: &Form) -> AppResult<(Value, Value)> {
    let fields = serde_json::to_value(form.fields()).map_err(|error| {
        AppError::Internal(format!("failed to encode fields of form '{}': {error}", form.id()))
    })?;
    let settings = serde_json::to_value(form.settings()).map_err(|error| {
        AppError::Internal(format!(
            "failed to encode settings of form '{}': {error}",
            form.id()
        ))
    })?;

    Ok((fields, settings))
}

#[derive(Debug, sqlx::FromRow)]
struct FormRow {
    id: Uuid,
    owner_id: Uuid,
    name: String,
    description: Option<String>,
    fields: Value,
    settings: Value,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct FormSummaryRow {
    #[sqlx(flatten)]
    form: FormRow,
    submission_count: i64,
}

impl FormRow {
    fn into_form(self) -> AppResult<Form> {
        let fields: Vec<FormField> = serde_json::from_value(self.fields).map_err(|error| {
            AppError::Internal(format!("invalid stored fields for form '{}': {error}", self.id))
        })?;
        let settings: FormSettings = serde_json::from_value(self.settings).map_err(|error| {
            AppError::Internal(format!(
                "invalid stored settings for form '{}': {error}",
                self.id
            ))
        })?;

        Form::from_parts(
            FormId::from_uuid(self.id),
            AccountId::from_uuid(self.owner_id),
            self.name,
            self.description,
            FormSchema::new(fields, settings)?,
            self.is_active,
            self.created_at,
            self.updated_at,
        )
    }
}
