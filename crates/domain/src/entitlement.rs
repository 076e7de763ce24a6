//! Plan limits and the values derived from them.
//!
//! Snapshots are recomputed for every decision and never cached.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Forms a free-tier account may own.
pub const FREE_TIER_MAX_FORMS: u32 = 1;

/// Submissions a free-tier account may receive per calendar month.
pub const FREE_TIER_MAX_SUBMISSIONS_PER_MONTH: u32 = 50;

/// Billing entitlement flag that unlocks the paid plan.
pub const PRO_ENTITLEMENT: &str = "pro";

/// Numeric usage ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum PlanLimit {
    /// At most this many.
    Limited(u32),
    /// No ceiling.
    Unlimited,
}

impl PlanLimit {
    /// Returns whether `current` usage has reached the ceiling.
    #[must_use]
    pub fn is_reached(&self, current: u64) -> bool {
        match self {
            Self::Limited(limit) => current >= u64::from(*limit),
            Self::Unlimited => false,
        }
    }

    /// Returns the ceiling, or `None` when unlimited.
    #[must_use]
    pub fn as_option(&self) -> Option<u32> {
        match self {
            Self::Limited(limit) => Some(*limit),
            Self::Unlimited => None,
        }
    }
}

/// Billing plan an account is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanTier {
    /// Default plan.
    Free,
    /// Paid plan.
    Pro,
}

impl PlanTier {
    /// Returns stable display value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Pro => "pro",
        }
    }
}

/// Usage rights of one account at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitlementSnapshot {
    tier: PlanTier,
    max_forms: PlanLimit,
    max_submissions_per_month: PlanLimit,
    email_notifications_allowed: bool,
}

impl EntitlementSnapshot {
    /// Conservative snapshot used without a pro entitlement and whenever the
    /// billing lookup fails.
    #[must_use]
    pub fn free_tier() -> Self {
        Self {
            tier: PlanTier::Free,
            max_forms: PlanLimit::Limited(FREE_TIER_MAX_FORMS),
            max_submissions_per_month: PlanLimit::Limited(FREE_TIER_MAX_SUBMISSIONS_PER_MONTH),
            email_notifications_allowed: false,
        }
    }

    /// Snapshot for accounts holding the pro entitlement.
    #[must_use]
    pub fn pro() -> Self {
        Self {
            tier: PlanTier::Pro,
            max_forms: PlanLimit::Unlimited,
            max_submissions_per_month: PlanLimit::Unlimited,
            email_notifications_allowed: true,
        }
    }

    /// Returns the plan tier.
    #[must_use]
    pub fn tier(&self) -> PlanTier {
        self.tier
    }

    /// Returns the form count ceiling.
    #[must_use]
    pub fn max_forms(&self) -> PlanLimit {
        self.max_forms
    }

    /// Returns the monthly submission ceiling.
    #[must_use]
    pub fn max_submissions_per_month(&self) -> PlanLimit {
        self.max_submissions_per_month
    }

    /// Returns whether forms may send submission notifications.
    #[must_use]
    pub fn email_notifications_allowed(&self) -> bool {
        self.email_notifications_allowed
    }

    /// Decides whether an account owning `form_count` forms may create another.
    #[must_use]
    pub fn form_creation(&self, form_count: u64) -> FormCreationDecision {
        match self.max_forms {
            PlanLimit::Limited(limit) if form_count >= u64::from(limit) => {
                FormCreationDecision::denied(form_limit_message(limit))
            }
            _ => FormCreationDecision::allowed(),
        }
    }

    /// Derives monthly submission usage from the current count.
    #[must_use]
    pub fn submission_usage(&self, current: u64) -> SubmissionUsage {
        SubmissionUsage {
            reached: self.max_submissions_per_month.is_reached(current),
            current,
            limit: self.max_submissions_per_month,
        }
    }
}

/// Human-readable upgrade prompt for the form cap.
#[must_use]
pub fn form_limit_message(limit: u32) -> String {
    let noun = if limit == 1 { "form" } else { "forms" };
    format!("Free plan allows {limit} {noun}. Upgrade to Pro for unlimited forms.")
}

/// Human-readable upgrade prompt for the monthly submission cap.
#[must_use]
pub fn submission_limit_message(limit: u32) -> String {
    format!(
        "This form has reached its limit of {limit} submissions this month. \
         The owner can upgrade to Pro for unlimited submissions."
    )
}

/// Outcome of the form-creation gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormCreationDecision {
    allowed: bool,
    reason: Option<String>,
}

impl FormCreationDecision {
    /// Creation is allowed.
    #[must_use]
    pub fn allowed() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    /// Creation is refused for `reason`.
    #[must_use]
    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }

    /// Returns whether creation is allowed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        self.allowed
    }

    /// Returns the refusal reason.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
}

/// Monthly submission usage of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionUsage {
    /// Whether the ceiling has been reached.
    pub reached: bool,
    /// Submissions received since the start of the billing period.
    pub current: u64,
    /// Monthly ceiling.
    pub limit: PlanLimit,
}

/// Returns the first instant of the calendar month containing `now`, in UTC.
#[must_use]
pub fn billing_period_start(now: DateTime<Utc>) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(now.year(), now.month(), 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map_or(now, |start| start.and_utc())
}
