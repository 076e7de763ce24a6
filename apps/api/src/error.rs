mod types;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use formwell_application::IntakeError;
use formwell_core::AppError;
use formwell_domain::submission_limit_message;
use tracing::error;

use types::{ErrorResponse, FieldErrorResponse};

/// HTTP API error wrapper around application and intake errors.
#[derive(Debug)]
pub enum ApiError {
    App(AppError),
    Intake(IntakeError),
}

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self::App(value)
    }
}

impl From<IntakeError> for ApiError {
    fn from(value: IntakeError) -> Self {
        Self::Intake(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, payload) = match self {
            Self::App(error) => app_error_payload(error),
            Self::Intake(error) => intake_error_payload(error),
        };

        (status, Json(payload)).into_response()
    }
}

fn app_error_payload(error: AppError) -> (StatusCode, ErrorResponse) {
    let (status, code, message) = match error {
        AppError::Validation(message) => (StatusCode::BAD_REQUEST, "validation_error", message),
        AppError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
        AppError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message),
        AppError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, "unauthorized", message),
        AppError::Forbidden(message) => (StatusCode::FORBIDDEN, "forbidden", message),
        AppError::QuotaExceeded(message) => {
            (StatusCode::PAYMENT_REQUIRED, "quota_exceeded", message)
        }
        AppError::RateLimited(message) => {
            (StatusCode::TOO_MANY_REQUESTS, "rate_limited", message)
        }
        AppError::Internal(message) => {
            error!(error = %message, "request failed with internal error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "an internal error occurred".to_owned(),
            )
        }
    };

    (status, ErrorResponse::new(code, message))
}

fn intake_error_payload(error: IntakeError) -> (StatusCode, ErrorResponse) {
    match error {
        IntakeError::FormNotFound => (
            StatusCode::NOT_FOUND,
            ErrorResponse::new("not_found", error.to_string()),
        ),
        IntakeError::FormInactive => (
            StatusCode::CONFLICT,
            ErrorResponse::new("form_inactive", error.to_string()),
        ),
        IntakeError::ValidationFailed(ref issues) => {
            let field_errors = issues
                .iter()
                .map(|issue| FieldErrorResponse {
                    field_id: issue.field_id().to_owned(),
                    message: issue.message(),
                })
                .collect();
            (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("validation_failed", error.to_string())
                    .with_field_errors(field_errors),
            )
        }
        IntakeError::QuotaExceeded { limit } => (
            StatusCode::PAYMENT_REQUIRED,
            ErrorResponse::new("quota_exceeded", submission_limit_message(limit)),
        ),
        IntakeError::Store(error) => app_error_payload(error),
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;
