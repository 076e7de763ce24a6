use axum::Json;
use axum::extract::{Extension, State};
use formwell_core::AccountIdentity;

use crate::dto::{FormCreationResponse, SubmissionUsageResponse, UsageResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn usage_summary_handler(
    State(state): State<AppState>,
    Extension(account): Extension<AccountIdentity>,
) -> ApiResult<Json<UsageResponse>> {
    let summary = state.usage_service.usage_summary(&account).await?;
    Ok(Json(UsageResponse::from(summary)))
}

pub async fn can_create_form_handler(
    State(state): State<AppState>,
    Extension(account): Extension<AccountIdentity>,
) -> ApiResult<Json<FormCreationResponse>> {
    let decision = state.usage_service.can_create_form(&account).await?;
    Ok(Json(FormCreationResponse::from(decision)))
}

pub async fn submission_usage_handler(
    State(state): State<AppState>,
    Extension(account): Extension<AccountIdentity>,
) -> ApiResult<Json<SubmissionUsageResponse>> {
    let usage = state.usage_service.submission_usage(&account).await?;
    Ok(Json(SubmissionUsageResponse::from(usage)))
}
