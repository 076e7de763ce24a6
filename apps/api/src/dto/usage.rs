use formwell_application::UsageSummary;
use formwell_domain::{FormCreationDecision, SubmissionUsage};
use serde::Serialize;
use ts_rs::TS;

/// Plan limits and current consumption for the usage banner.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/usage-response.ts"
)]
pub struct UsageResponse {
    #[ts(type = "\"free\" | \"pro\"")]
    pub plan: String,
    /// `null` means unlimited.
    pub max_forms: Option<u32>,
    /// `null` means unlimited.
    pub max_submissions_per_month: Option<u32>,
    pub email_notifications: bool,
    #[ts(type = "number")]
    pub form_count: u64,
    #[ts(type = "number")]
    pub submissions_this_period: u64,
    pub period_start: String,
}

/// Whether the caller may create another form.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/form-creation-response.ts"
)]
pub struct FormCreationResponse {
    pub allowed: bool,
    pub reason: Option<String>,
}

/// Monthly submission consumption across the caller's forms.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/submission-usage-response.ts"
)]
pub struct SubmissionUsageResponse {
    pub reached: bool,
    #[ts(type = "number")]
    pub current: u64,
    pub limit: Option<u32>,
}

impl From<UsageSummary> for UsageResponse {
    fn from(summary: UsageSummary) -> Self {
        let entitlements = summary.entitlements;
        Self {
            plan: entitlements.tier().as_str().to_owned(),
            max_forms: entitlements.max_forms().as_option(),
            max_submissions_per_month: entitlements.max_submissions_per_month().as_option(),
            email_notifications: entitlements.email_notifications_allowed(),
            form_count: summary.form_count,
            submissions_this_period: summary.submissions_this_period,
            period_start: summary.period_start.to_rfc3339(),
        }
    }
}

impl From<FormCreationDecision> for FormCreationResponse {
    fn from(decision: FormCreationDecision) -> Self {
        Self {
            allowed: decision.is_allowed(),
            reason: decision.reason().map(ToOwned::to_owned),
        }
    }
}

impl From<SubmissionUsage> for SubmissionUsageResponse {
    fn from(usage: SubmissionUsage) -> Self {
        Self {
            reached: usage.reached,
            current: usage.current,
            limit: usage.limit.as_option(),
        }
    }
}
