//! Application services and ports.

#![forbid(unsafe_code)]

mod billing_service;
mod csv_export;
mod entitlement_service;
mod form_ports;
mod form_service;
mod intake_service;
mod notification_service;
mod rate_limit_service;
mod usage_service;

#[cfg(test)]
mod test_support;

pub use billing_service::{
    BillingGateway, BillingProduct, BillingService, BillingSubscription, PricingOverview,
};
pub use csv_export::{export_file_name, render_submissions_csv};
pub use entitlement_service::EntitlementService;
pub use form_ports::{FormInsertOutcome, FormRepository, FormSummary, SubmissionRepository};
pub use form_service::{FormDetail, FormInput, FormService, SubmissionExport};
pub use intake_service::{
    IntakeError, IntakeService, SubmissionAck, SubmissionContext, SubmissionQuotaMode,
};
pub use notification_service::{
    EmailService, NotificationQueue, NotificationRow, NotificationService,
    SubmissionNotification,
};
pub use rate_limit_service::{AttemptInfo, RateLimitRepository, RateLimitRule, RateLimitService};
pub use usage_service::{UsageService, UsageSummary};
