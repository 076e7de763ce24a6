use std::sync::Arc;

use chrono::{DateTime, Utc};

use formwell_core::{AccountId, AccountIdentity, AppResult};
use formwell_domain::{
    EntitlementSnapshot, FormCreationDecision, PlanLimit, SubmissionUsage, billing_period_start,
};

use crate::entitlement_service::EntitlementService;
use crate::form_ports::{FormRepository, SubmissionRepository};

/// Current plan and consumption of one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageSummary {
    /// Limits in force.
    pub entitlements: EntitlementSnapshot,
    /// Forms currently owned.
    pub form_count: u64,
    /// Submissions received in the current billing period.
    pub submissions_this_period: u64,
    /// First instant of the current billing period.
    pub period_start: DateTime<Utc>,
}

/// Quota counters and the usage gates built on them.
///
/// Counts are point-in-time reads. Nothing here locks, so two concurrent
/// callers may both observe room under a cap.
#[derive(Clone)]
pub struct UsageService {
    entitlements: EntitlementService,
    forms: Arc<dyn FormRepository>,
    submissions: Arc<dyn SubmissionRepository>,
}

impl UsageService {
    /// Creates a usage service.
    #[must_use]
    pub fn new(
        entitlements: EntitlementService,
        forms: Arc<dyn FormRepository>,
        submissions: Arc<dyn SubmissionRepository>,
    ) -> Self {
        Self {
            entitlements,
            forms,
            submissions,
        }
    }

    /// Resolves the account's limits.
    pub async fn resolve_limits(&self, account: &AccountIdentity) -> EntitlementSnapshot {
        self.entitlements.resolve_limits(account).await
    }

    /// Counts forms currently owned by the account.
    pub async fn count_forms(&self, owner_id: AccountId) -> AppResult<u64> {
        self.forms.count_forms(owner_id).await
    }

    /// Counts the account's submissions received since `period_start`.
    pub async fn count_submissions(
        &self,
        owner_id: AccountId,
        period_start: DateTime<Utc>,
    ) -> AppResult<u64> {
        self.submissions
            .count_submissions_since(owner_id, period_start)
            .await
    }

    /// Decides whether the account may create another form.
    pub async fn can_create_form(&self, actor: &AccountIdentity) -> AppResult<FormCreationDecision> {
        let entitlements = self.resolve_limits(actor).await;
        if entitlements.max_forms() == PlanLimit::Unlimited {
            return Ok(FormCreationDecision::allowed());
        }

        let form_count = self.count_forms(actor.account_id()).await?;
        Ok(entitlements.form_creation(form_count))
    }

    /// Reports monthly submission usage against the account's cap.
    pub async fn submission_usage(&self, actor: &AccountIdentity) -> AppResult<SubmissionUsage> {
        let entitlements = self.resolve_limits(actor).await;
        self.submission_usage_for(actor.account_id(), &entitlements, Utc::now())
            .await
    }

    /// Reports monthly submission usage under an already resolved snapshot.
    pub async fn submission_usage_for(
        &self,
        owner_id: AccountId,
        entitlements: &EntitlementSnapshot,
        now: DateTime<Utc>,
    ) -> AppResult<SubmissionUsage> {
        let current = self
            .count_submissions(owner_id, billing_period_start(now))
            .await?;
        Ok(entitlements.submission_usage(current))
    }

    /// Loads plan limits plus current consumption for the usage banner.
    pub async fn usage_summary(&self, actor: &AccountIdentity) -> AppResult<UsageSummary> {
        let entitlements = self.resolve_limits(actor).await;
        let period_start = billing_period_start(Utc::now());
        let form_count = self.count_forms(actor.account_id()).await?;
        let submissions_this_period = self
            .count_submissions(actor.account_id(), period_start)
            .await?;

        Ok(UsageSummary {
            entitlements,
            form_count,
            submissions_this_period,
            period_start,
        })
    }
}
