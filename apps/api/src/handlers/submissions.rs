use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use formwell_core::AccountIdentity;
use formwell_domain::FormId;

use crate::dto::SubmissionListResponse;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_submissions_handler(
    State(state): State<AppState>,
    Extension(account): Extension<AccountIdentity>,
    Path(form_id): Path<String>,
) -> ApiResult<Json<SubmissionListResponse>> {
    let (form, submissions) = state
        .form_service
        .list_submissions(&account, form_id.parse::<FormId>()?)
        .await?;

    Ok(Json(SubmissionListResponse::new(form, submissions)))
}

pub async fn export_submissions_handler(
    State(state): State<AppState>,
    Extension(account): Extension<AccountIdentity>,
    Path(form_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let export = state
        .form_service
        .export_submissions_csv(&account, form_id.parse::<FormId>()?)
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export.file_name),
            ),
        ],
        export.csv,
    ))
}
