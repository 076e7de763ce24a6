//! Port fakes shared by service tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};

use formwell_core::{AccountId, AccountIdentity, AppError, AppResult};
use formwell_domain::{
    FieldType, FieldValue, Form, FormField, FormId, FormSchema, FormSettings, PlanLimit,
    Submission, SubmissionData,
};

use crate::billing_service::{BillingGateway, BillingProduct, BillingSubscription};
use crate::form_ports::{FormInsertOutcome, FormRepository, FormSummary, SubmissionRepository};
use crate::notification_service::{NotificationQueue, SubmissionNotification};

pub(crate) fn owner() -> AccountIdentity {
    AccountIdentity::new(AccountId::new(), Some("owner@example.com".to_owned()))
}

pub(crate) fn contact_schema(settings: FormSettings) -> FormSchema {
    let fields = vec![
        FormField::new("name", FieldType::Text, "Name", None, true, None),
        FormField::new("email", FieldType::Email, "Email", None, true, None),
        FormField::new("website", FieldType::Url, "Website", None, false, None),
        FormField::new(
            "topics",
            FieldType::Checkbox,
            "Topics",
            None,
            false,
            Some(vec!["A".to_owned(), "B".to_owned(), "C".to_owned()]),
        ),
    ]
    .into_iter()
    .collect::<Result<Vec<_>, _>>()
    .unwrap_or_else(|_| unreachable!());

    FormSchema::new(fields, settings).unwrap_or_else(|_| unreachable!())
}

pub(crate) fn contact_form(actor: &AccountIdentity) -> Form {
    Form::new(
        actor.account_id(),
        "Contact",
        None,
        contact_schema(FormSettings::default()),
        Utc::now(),
    )
    .unwrap_or_else(|_| unreachable!())
}

/// Mirrors `formwell_infrastructure::InMemoryFormStore`, which this crate
/// cannot depend on. Keep the two in step.
#[derive(Default)]
pub(crate) struct InMemoryStore {
    forms: RwLock<Vec<Form>>,
    submissions: RwLock<Vec<Submission>>,
}

impl InMemoryStore {
    pub(crate) async fn insert_form(&self, form: Form) {
        self.forms.write().await.push(form);
    }

    pub(crate) async fn insert_submissions(&self, form: &Form, count: usize) {
        let mut submissions = self.submissions.write().await;
        for index in 0..count {
            let mut data = SubmissionData::default();
            data.insert("name", FieldValue::Text(format!("Visitor {index}")));
            submissions.push(Submission::new(form.id(), data, None, None, Utc::now()));
        }
    }

    pub(crate) async fn submissions_for(&self, form_id: FormId) -> Vec<Submission> {
        self.submissions
            .read()
            .await
            .iter()
            .filter(|submission| submission.form_id() == form_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl FormRepository for InMemoryStore {
    async fn create_form_within_limit(
        &self,
        form: &Form,
        max_forms: PlanLimit,
    ) -> AppResult<FormInsertOutcome> {
        let mut forms = self.forms.write().await;
        let existing = forms
            .iter()
            .filter(|stored| stored.owner_id() == form.owner_id())
            .count() as u64;
        if max_forms.is_reached(existing) {
            return Ok(FormInsertOutcome::LimitReached { existing });
        }
        forms.push(form.clone());
        Ok(FormInsertOutcome::Created)
    }

    async fn update_form(&self, form: &Form) -> AppResult<()> {
        let mut forms = self.forms.write().await;
        let stored = forms
            .iter_mut()
            .find(|stored| stored.id() == form.id())
            .ok_or_else(|| AppError::NotFound(format!("form '{}' not found", form.id())))?;
        *stored = form.clone();
        Ok(())
    }

    async fn find_form(&self, form_id: FormId) -> AppResult<Option<Form>> {
        Ok(self
            .forms
            .read()
            .await
            .iter()
            .find(|form| form.id() == form_id)
            .cloned())
    }

    async fn list_forms_for_owner(&self, owner_id: AccountId) -> AppResult<Vec<FormSummary>> {
        let forms = self.forms.read().await;
        let submissions = self.submissions.read().await;
        let mut summaries: Vec<FormSummary> = forms
            .iter()
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
        let before = forms.len();
        forms.retain(|form| !(form.id() == form_id && form.owner_id() == owner_id));
        let deleted = forms.len() != before;
        if deleted {
            self.submissions
                .write()
                .await
                .retain(|submission| submission.form_id() != form_id);
        }
        Ok(deleted)
    }

    async fn count_forms(&self, owner_id: AccountId) -> AppResult<u64> {
        Ok(self
            .forms
            .read()
            .await
            .iter()
            .filter(|form| form.owner_id() == owner_id)
            .count() as u64)
    }
}

#[async_trait]
impl SubmissionRepository for InMemoryStore {
    async fn create_submission(&self, submission: &Submission) -> AppResult<()> {
        let forms = self.forms.read().await;
        if !forms.iter().any(|form| form.id() == submission.form_id()) {
            return Err(AppError::NotFound(format!(
                "form '{}' not found",
                submission.form_id()
            )));
        }

        self.submissions.write().await.push(submission.clone());
        Ok(())
    }

    async fn list_submissions(&self, form_id: FormId) -> AppResult<Vec<Submission>> {
        let mut submissions = self.submissions_for(form_id).await;
        submissions.sort_by(|left, right| right.submitted_at().cmp(&left.submitted_at()));
        Ok(submissions)
    }

    async fn count_submissions_since(
        &self,
        owner_id: AccountId,
        since: DateTime<Utc>,
    ) -> AppResult<u64> {
        let forms = self.forms.read().await;
        let owned: Vec<FormId> = forms
            .iter()
            .filter(|form| form.owner_id() == owner_id)
            .map(Form::id)
            .collect();
        Ok(self
            .submissions
            .read()
            .await
            .iter()
            .filter(|submission| {
                owned.contains(&submission.form_id()) && submission.submitted_at() >= since
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
            .filter(|submission| submission.form_id() == form_id && submission.submitted_at() >= since)
            .count() as u64)
    }
}

pub(crate) enum FixedBilling {
    Free,
    Pro,
    Failing,
}

#[async_trait]
impl BillingGateway for FixedBilling {
    async fn has_entitlement(&self, _account: &AccountIdentity, _flag: &str) -> AppResult<bool> {
        match self {
            Self::Free => Ok(false),
            Self::Pro => Ok(true),
            Self::Failing => Err(AppError::Internal(
                "billing request failed: timed out".to_owned(),
            )),
        }
    }

    async fn list_products(&self) -> AppResult<Vec<BillingProduct>> {
        Ok(Vec::new())
    }

    async fn list_active_subscriptions(
        &self,
        _account: &AccountIdentity,
    ) -> AppResult<Vec<BillingSubscription>> {
        Ok(Vec::new())
    }
}

#[derive(Default)]
pub(crate) struct RecordingQueue {
    pub(crate) jobs: Mutex<Vec<SubmissionNotification>>,
}

#[async_trait]
impl NotificationQueue for RecordingQueue {
    async fn enqueue(&self, notification: SubmissionNotification) -> AppResult<()> {
        self.jobs.lock().await.push(notification);
        Ok(())
    }
}
