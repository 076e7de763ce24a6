mod billing;
mod forms;
mod health;
mod submissions;
mod usage;

pub use billing::PricingResponse;
pub use forms::{
    FormDetailResponse, FormListItemResponse, FormRequest, FormResponse, PublicFormResponse,
    SetFormActiveRequest,
};
pub use health::{DependencyHealth, HealthResponse};
pub use submissions::{PublicSubmissionRequest, PublicSubmissionResponse, SubmissionListResponse};
pub use usage::{FormCreationResponse, SubmissionUsageResponse, UsageResponse};
