use formwell_application::SubmissionAck;
use formwell_domain::{Form, Submission};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ts_rs::TS;

use super::FormResponse;

/// Anonymous submission payload keyed by field id.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/public-submission-request.ts"
)]
pub struct PublicSubmissionRequest {
    #[ts(type = "Record<string, unknown>")]
    pub data: Map<String, Value>,
}

/// Accepted anonymous submission.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/public-submission-response.ts"
)]
pub struct PublicSubmissionResponse {
    pub success: bool,
    pub submission_id: String,
    pub message: String,
}

/// API representation of a stored submission.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/submission-response.ts"
)]
pub struct SubmissionResponse {
    pub id: String,
    pub form_id: String,
    #[ts(type = "Record<string, string | Array<string>>")]
    pub data: Value,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub submitted_at: String,
}

/// Submissions of one form, newest first.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/submission-list-response.ts"
)]
pub struct SubmissionListResponse {
    pub form: FormResponse,
    pub submissions: Vec<SubmissionResponse>,
}

impl From<SubmissionAck> for PublicSubmissionResponse {
    fn from(ack: SubmissionAck) -> Self {
        Self {
            success: true,
            submission_id: ack.submission_id.to_string(),
            message: ack.success_message,
        }
    }
}

impl From<Submission> for SubmissionResponse {
    fn from(submission: Submission) -> Self {
        Self {
            id: submission.id().to_string(),
            form_id: submission.form_id().to_string(),
            data: submission.data().to_json(),
            ip_address: submission.ip_address().map(ToOwned::to_owned),
            user_agent: submission.user_agent().map(ToOwned::to_owned),
            submitted_at: submission.submitted_at().to_rfc3339(),
        }
    }
}

impl SubmissionListResponse {
    pub fn new(form: Form, submissions: Vec<Submission>) -> Self {
        Self {
            form: FormResponse::from(form),
            submissions: submissions
                .into_iter()
                .map(SubmissionResponse::from)
                .collect(),
        }
    }
}
