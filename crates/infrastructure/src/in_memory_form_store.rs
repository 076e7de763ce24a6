use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use formwell_application::{FormInsertOutcome, FormRepository, FormSummary, SubmissionRepository};
use formwell_core::{AccountId, AppError, AppResult};
use formwell_domain::{Form, FormId, PlanLimit, Submission};

/// In-memory form and submission store.
///
/// Implements both repository ports over one lock pair so deleting a form
/// removes its submissions in the same step.
#[derive(Debug, Default)]
pub struct InMemoryFormStore {
    forms: RwLock<HashMap<FormId, Form>>,
    submissions: RwLock<Vec<Submission>>,
}

impl InMemoryFormStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn owned_count<'a>(forms: impl Iterator<Item = &'a Form>, owner_id: AccountId) -> u64 {
    forms.filter(|form| form.owner_id() == owner_id).count() as u64
}

#[async_trait]
impl FormRepository for InMemoryFormStore {
    async fn create_form_within_limit(
        &self,
        form: &Form,
        max_forms: PlanLimit,
    ) -> AppResult<FormInsertOutcome> {
        let mut forms = self.forms.write().await;

        if forms.contains_key(&form.id()) {
            return Err(AppError::Conflict(format!(
                "form '{}' already exists",
                form.id()
            )));
        }

        let existing = owned_count(forms.values(), form.owner_id());
        if max_forms.is_reached(existing) {
            return Ok(FormInsertOutcome::LimitReached { existing });
        }

        forms.insert(form.id(), form.clone());
        Ok(FormInsertOutcome::Created)
    }

    async fn update_form(&self, form: &Form) -> AppResult<()> {
        let mut forms = self.forms.write().await;
        let stored = forms
            .get_mut(&form.id())
            .ok_or_else(|| AppError::NotFound(format!("form '{}' not found", form.id())))?;
        *stored = form.clone();
        Ok(())
    }

    async fn find_form(&self, form_id: FormId) -> AppResult<Option<Form>> {
        Ok(self.forms.read().await.get(&form_id).cloned())
    }

    async fn list_forms_for_owner(&self, owner_id: AccountId) -> AppResult<Vec<FormSummary>> {
        let forms = self.forms.read().await;
        let submissions = self.submissions.read().await;

        let mut summaries: Vec<FormSummary> = forms
            .values()
            .filter(|form| form.owner_id() == owner_id)
            .map(|form| FormSummary {
                form: form.clone(),
                submission_count: submissions
                    .iter()
                    .filter(|submission| submission.form_id() == form.id())
                    .count() as u64,
            })
            .collect();
        summaries.sort_by(|left, right| right.form.created_at().cmp(&left.form.created_at()));

        Ok(summaries)
    }

    async fn delete_form(&self, owner_id: AccountId, form_id: FormId) -> AppResult<bool> {
        let mut forms = self.forms.write().await;
        let owned = forms
            .get(&form_id)
            .is_some_and(|form| form.owner_id() == owner_id);
        if !owned {
            return Ok(false);
        }

        let mut submissions = self.submissions.write().await;
        forms.remove(&form_id);
        submissions.retain(|submission| submission.form_id() != form_id);
        Ok(true)
    }

    async fn count_forms(&self, owner_id: AccountId) -> AppResult<u64> {
        Ok(owned_count(self.forms.read().await.values(), owner_id))
    }
}

#[async_trait]
impl SubmissionRepository for InMemoryFormStore {
    async fn create_submission(&self, submission: &Submission) -> AppResult<()> {
        let forms = self.forms.read().await;
        if !forms.contains_key(&submission.form_id()) {
            return Err(AppError::NotFound(format!(
                "form '{}' not found",
                submission.form_id()
            )));
        }

        self.submissions.write().await.push(submission.clone());
        Ok(())
    }

    async fn list_submissions(&self, form_id: FormId) -> AppResult<Vec<Submission>> {
        let mut submissions: Vec<Submission> = self
            .submissions
            .read()
            .await
            .iter()
            .filter(|submission| submission.form_id() == form_id)
            .cloned()
            .collect();
        submissions.sort_by(|left, right| right.submitted_at().cmp(&left.submitted_at()));
        Ok(submissions)
    }

    async fn count_submissions_since(
        &self,
        owner_id: AccountId,
        since: DateTime<Utc>,
    ) -> AppResult<u64> {
        let forms = self.forms.read().await;
        let submissions = self.submissions.read().await;

        Ok(submissions
            .iter()
            .filter(|submission| {
                submission.submitted_at() >= since
                    && forms
                        .get(&submission.form_id())
                        .is_some_and(|form| form.owner_id() == owner_id)
            })
            .count() as u64)
    }

    async fn count_form_submissions_since(
        &self,
        form_id: FormId,
        since: DateTime<Utc>,
    ) -> AppResult<u64> {
        Ok(self
            .submissions
            .read()
            .await
            .iter()
            .filter(|submission| {
                submission.form_id() == form_id && submission.submitted_at() >= since
            })
            .count() as u64)
    }
}
