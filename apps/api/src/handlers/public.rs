use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use formwell_application::{IntakeError, SubmissionContext};
use formwell_domain::FormId;

use crate::dto::{PublicFormResponse, PublicSubmissionRequest, PublicSubmissionResponse};
use crate::error::ApiResult;
use crate::middleware::ClientIp;
use crate::state::AppState;

const USER_AGENT_MAX_LENGTH: usize = 512;

pub async fn get_public_form_handler(
    State(state): State<AppState>,
    Path(form_id): Path<String>,
) -> ApiResult<Json<PublicFormResponse>> {
    let form = state
        .form_service
        .get_public_form(form_id.parse::<FormId>()?)
        .await?;

    Ok(Json(PublicFormResponse::from(form)))
}

pub async fn submit_public_form_handler(
    State(state): State<AppState>,
    Path(form_id): Path<String>,
    Extension(ClientIp(client_ip)): Extension<ClientIp>,
    headers: HeaderMap,
    Json(payload): Json<PublicSubmissionRequest>,
) -> ApiResult<(StatusCode, Json<PublicSubmissionResponse>)> {
    let form_id = form_id
        .parse::<FormId>()
        .map_err(|_| IntakeError::FormNotFound)?;
    let context = SubmissionContext {
        ip_address: client_ip.map(|ip| ip.to_string()),
        user_agent: headers
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.chars().take(USER_AGENT_MAX_LENGTH).collect()),
    };

    let ack = state
        .intake_service
        .submit(form_id, &payload.data, context)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PublicSubmissionResponse::from(ack)),
    ))
}
