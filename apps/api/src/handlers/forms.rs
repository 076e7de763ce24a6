use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use formwell_application::FormInput;
use formwell_core::AccountIdentity;
use formwell_domain::FormId;

use crate::dto::{
    FormDetailResponse, FormListItemResponse, FormRequest, FormResponse, SetFormActiveRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_forms_handler(
    State(state): State<AppState>,
    Extension(account): Extension<AccountIdentity>,
) -> ApiResult<Json<Vec<FormListItemResponse>>> {
    let forms = state
        .form_service
        .list_forms(&account)
        .await?
        .into_iter()
        .map(FormListItemResponse::from)
        .collect();

    Ok(Json(forms))
}

pub async fn create_form_handler(
    State(state): State<AppState>,
    Extension(account): Extension<AccountIdentity>,
    Json(payload): Json<FormRequest>,
) -> ApiResult<(StatusCode, Json<FormResponse>)> {
    let form = state
        .form_service
        .create_form(&account, FormInput::try_from(payload)?)
        .await?;

    Ok((StatusCode::CREATED, Json(FormResponse::from(form))))
}

pub async fn get_form_handler(
    State(state): State<AppState>,
    Extension(account): Extension<AccountIdentity>,
    Path(form_id): Path<String>,
) -> ApiResult<Json<FormDetailResponse>> {
    let detail = state
        .form_service
        .get_form(&account, form_id.parse::<FormId>()?)
        .await?;

    Ok(Json(FormDetailResponse::from(detail)))
}

pub async fn update_form_handler(
    State(state): State<AppState>,
    Extension(account): Extension<AccountIdentity>,
    Path(form_id): Path<String>,
    Json(payload): Json<FormRequest>,
) -> ApiResult<Json<FormResponse>> {
    let form = state
        .form_service
        .update_form(
            &account,
            form_id.parse::<FormId>()?,
            FormInput::try_from(payload)?,
        )
        .await?;

    Ok(Json(FormResponse::from(form)))
}

pub async fn set_form_active_handler(
    State(state): State<AppState>,
    Extension(account): Extension<AccountIdentity>,
    Path(form_id): Path<String>,
    Json(payload): Json<SetFormActiveRequest>,
) -> ApiResult<Json<FormResponse>> {
    let form = state
        .form_service
        .set_form_active(&account, form_id.parse::<FormId>()?, payload.is_active)
        .await?;

    Ok(Json(FormResponse::from(form)))
}

pub async fn delete_form_handler(
    State(state): State<AppState>,
    Extension(account): Extension<AccountIdentity>,
    Path(form_id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .form_service
        .delete_form(&account, form_id.parse::<FormId>()?)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
