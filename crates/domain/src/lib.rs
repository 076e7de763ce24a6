//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod email;
mod entitlement;
mod field;
mod form;
mod submission;

pub use email::{EMAIL_MAX_LENGTH, EmailAddress, is_plausible_email};
pub use entitlement::{
    EntitlementSnapshot, FREE_TIER_MAX_FORMS, FREE_TIER_MAX_SUBMISSIONS_PER_MONTH,
    FormCreationDecision, PRO_ENTITLEMENT, PlanLimit, PlanTier, SubmissionUsage,
    billing_period_start, form_limit_message, submission_limit_message,
};
pub use field::{FieldError, FieldIssue, FieldType, FieldValue, FormField, FormFieldInput};
pub use form::{
    DEFAULT_BUTTON_COLOR, DEFAULT_SUBMIT_BUTTON_TEXT, DEFAULT_SUCCESS_MESSAGE, Form, FormId,
    FormSchema, FormSettings, FormSettingsInput, FormTheme,
};
pub use submission::{Submission, SubmissionData, SubmissionId};
