use serde::Serialize;
use ts_rs::TS;

/// API error payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    field_errors: Option<Vec<FieldErrorResponse>>,
}

impl ErrorResponse {
    pub(super) fn new(code: &'static str, message: String) -> Self {
        Self {
            code,
            message,
            field_errors: None,
        }
    }

    pub(super) fn with_field_errors(mut self, field_errors: Vec<FieldErrorResponse>) -> Self {
        self.field_errors = Some(field_errors);
        self
    }
}

/// One rejected field of a submission.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/field-error-response.ts"
)]
pub struct FieldErrorResponse {
    pub field_id: String,
    pub message: String,
}
