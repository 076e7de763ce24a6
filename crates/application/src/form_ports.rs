use async_trait::async_trait;
use chrono::{DateTime, Utc};

use formwell_core::{AccountId, AppResult};
use formwell_domain::{Form, FormId, PlanLimit, Submission};

/// Form with its lifetime submission count, as shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSummary {
    /// Form aggregate.
    pub form: Form,
    /// Number of stored submissions.
    pub submission_count: u64,
}

/// Result of a conditional form insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormInsertOutcome {
    /// The form was stored.
    Created,
    /// The owner already holds `existing` forms, at or above the cap.
    LimitReached {
        /// Forms owned when the insert was refused.
        existing: u64,
    },
}

/// Repository port for form persistence.
#[async_trait]
pub trait FormRepository: Send + Sync {
    /// Stores `form` only if its owner holds fewer than `max_forms` forms.
    ///
    /// The count and the insert happen atomically with respect to other
    /// inserts for the same owner.
    async fn create_form_within_limit(
        &self,
        form: &Form,
        max_forms: PlanLimit,
    ) -> AppResult<FormInsertOutcome>;

    /// Replaces a stored form. Returns `NotFound` when it does not exist.
    async fn update_form(&self, form: &Form) -> AppResult<()>;

    /// Finds a form by id regardless of owner.
    async fn find_form(&self, form_id: FormId) -> AppResult<Option<Form>>;

    /// Lists forms of one owner, newest first, with submission counts.
    async fn list_forms_for_owner(&self, owner_id: AccountId) -> AppResult<Vec<FormSummary>>;

    /// Deletes a form and all of its submissions.
    ///
    /// Returns `false` when the owner has no such form.
    async fn delete_form(&self, owner_id: AccountId, form_id: FormId) -> AppResult<bool>;

    /// Counts forms currently owned by the account.
    async fn count_forms(&self, owner_id: AccountId) -> AppResult<u64>;
}

/// Repository port for submission persistence.
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    /// Appends one submission. Either the full record is stored or nothing is.
    async fn create_submission(&self, submission: &Submission) -> AppResult<()>;

    /// Lists submissions of a form, newest first.
    async fn list_submissions(&self, form_id: FormId) -> AppResult<Vec<Submission>>;

    /// Counts submissions across every form of `owner_id` since `since`.
    async fn count_submissions_since(
        &self,
        owner_id: AccountId,
        since: DateTime<Utc>,
    ) -> AppResult<u64>;

    /// Counts submissions of one form since `since`.
    async fn count_form_submissions_since(
        &self,
        form_id: FormId,
        since: DateTime<Utc>,
    ) -> AppResult<u64>;
}
