//! Anonymous submission intake.
//!
//! Gates run in a fixed order and the first failure wins: form lookup,
//! active flag, field validation, monthly quota. A submission that passes
//! every gate is written once. The notification that may follow is queued
//! and never changes the outcome returned to the submitter.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{error, info, warn};

use formwell_core::{AccountIdentity, AppError};
use formwell_domain::{
    EntitlementSnapshot, FieldIssue, Form, FormId, PlanLimit, Submission, SubmissionId,
};

use crate::form_ports::{FormRepository, SubmissionRepository};
use crate::notification_service::{NotificationQueue, SubmissionNotification};
use crate::usage_service::UsageService;

/// Whether intake enforces the monthly submission cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionQuotaMode {
    /// Reject submissions once the owner's monthly cap is reached.
    #[default]
    Enforce,
    /// Accept every submission and only log when the cap is exceeded.
    Observe,
}

impl FromStr for SubmissionQuotaMode {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "enforce" => Ok(Self::Enforce),
            "observe" => Ok(Self::Observe),
            other => Err(AppError::Validation(format!(
                "SUBMISSION_QUOTA_MODE must be 'enforce' or 'observe', got '{other}'"
            ))),
        }
    }
}

/// Transport metadata recorded with a submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionContext {
    /// Client address.
    pub ip_address: Option<String>,
    /// Client user agent.
    pub user_agent: Option<String>,
}

/// Successful intake result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionAck {
    /// Stored submission id.
    pub submission_id: SubmissionId,
    /// Message the form shows after submitting.
    pub success_message: String,
}

/// Reasons a submission was not stored.
#[derive(Debug, Error)]
pub enum IntakeError {
    /// No form has the requested id.
    #[error("form not found")]
    FormNotFound,
    /// The owner has closed the form.
    #[error("this form is not accepting submissions")]
    FormInactive,
    /// One or more fields were rejected.
    #[error("submission has {} invalid field(s)", .0.len())]
    ValidationFailed(Vec<FieldIssue>),
    /// The owner's monthly submission cap is reached.
    #[error("monthly submission limit of {limit} reached")]
    QuotaExceeded {
        /// Monthly cap in force.
        limit: u32,
    },
    /// The store could not be read or written.
    #[error(transparent)]
    Store(#[from] AppError),
}

/// Submission intake pipeline.
#[derive(Clone)]
pub struct IntakeService {
    forms: Arc<dyn FormRepository>,
    submissions: Arc<dyn SubmissionRepository>,
    usage: UsageService,
    notifications: Arc<dyn NotificationQueue>,
    quota_mode: SubmissionQuotaMode,
}

impl IntakeService {
    /// Creates an intake pipeline.
    #[must_use]
    pub fn new(
        forms: Arc<dyn FormRepository>,
        submissions: Arc<dyn SubmissionRepository>,
        usage: UsageService,
        notifications: Arc<dyn NotificationQueue>,
        quota_mode: SubmissionQuotaMode,
    ) -> Self {
        Self {
            forms,
            submissions,
            usage,
            notifications,
            quota_mode,
        }
    }

    /// Validates and stores one anonymous submission.
    pub async fn submit(
        &self,
        form_id: FormId,
        raw: &Map<String, Value>,
        context: SubmissionContext,
    ) -> Result<SubmissionAck, IntakeError> {
        let form = self
            .forms
            .find_form(form_id)
            .await
            .map_err(|error| store_failure(error, form_id, "find_form"))?
            .ok_or(IntakeError::FormNotFound)?;

        if !form.is_active() {
            return Err(IntakeError::FormInactive);
        }

        let data = form
            .schema()
            .validate_submission(raw)
            .map_err(IntakeError::ValidationFailed)?;

        let owner = AccountIdentity::new(form.owner_id(), None);
        let entitlements = self.usage.resolve_limits(&owner).await;
        let now = Utc::now();
        self.check_quota(&form, &entitlements, now).await?;

        let submission = Submission::new(
            form.id(),
            data,
            context.ip_address,
            context.user_agent,
            now,
        );
        self.submissions
            .create_submission(&submission)
            .await
            .map_err(|error| store_failure(error, form_id, "create_submission"))?;

        info!(form_id = %form_id, submission_id = %submission.id(), "submission accepted");

        self.dispatch_notification(&form, &submission, &entitlements)
            .await;

        Ok(SubmissionAck {
            submission_id: submission.id(),
            success_message: form.settings().success_message().to_owned(),
        })
    }

    async fn check_quota(
        &self,
        form: &Form,
        entitlements: &EntitlementSnapshot,
        now: DateTime<Utc>,
    ) -> Result<(), IntakeError> {
        if entitlements.max_submissions_per_month() == PlanLimit::Unlimited {
            return Ok(());
        }

        let usage = match self
            .usage
            .submission_usage_for(form.owner_id(), entitlements, now)
            .await
        {
            Ok(usage) => usage,
            Err(error) if self.quota_mode == SubmissionQuotaMode::Observe => {
                warn!(
                    error = %error,
                    form_id = %form.id(),
                    account_id = %form.owner_id(),
                    "failed to count submissions for quota observation"
                );
                return Ok(());
            }
            Err(error) => return Err(store_failure(error, form.id(), "count_submissions_since")),
        };

        if !usage.reached {
            return Ok(());
        }

        match (self.quota_mode, usage.limit) {
            (SubmissionQuotaMode::Enforce, PlanLimit::Limited(limit)) => {
                info!(
                    form_id = %form.id(),
                    account_id = %form.owner_id(),
                    limit,
                    "submission refused at monthly limit"
                );
                Err(IntakeError::QuotaExceeded { limit })
            }
            _ => {
                info!(
                    form_id = %form.id(),
                    account_id = %form.owner_id(),
                    current = usage.current,
                    "monthly submission limit exceeded, accepting in observe mode"
                );
                Ok(())
            }
        }
    }

    async fn dispatch_notification(
        &self,
        form: &Form,
        submission: &Submission,
        entitlements: &EntitlementSnapshot,
    ) {
        let Some(destination) = form.settings().notify_email() else {
            return;
        };

        if !entitlements.email_notifications_allowed() {
            info!(
                form_id = %form.id(),
                "skipping submission notification, plan does not include notifications"
            );
            return;
        }

        let notification = SubmissionNotification::for_submission(
            form,
            submission.id(),
            submission.data(),
            destination.clone(),
            submission.submitted_at(),
        );

        if let Err(error) = self.notifications.enqueue(notification).await {
            warn!(
                error = %error,
                form_id = %form.id(),
                submission_id = %submission.id(),
                "failed to queue submission notification"
            );
        }
    }
}

fn store_failure(error: AppError, form_id: FormId, operation: &'static str) -> IntakeError {
    error!(error = %error, form_id = %form_id, operation, "submission store failure");
    IntakeError::Store(error)
}

#[cfg(test)]
mod tests;
