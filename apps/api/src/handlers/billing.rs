use axum::Json;
use axum::extract::{Extension, State};
use formwell_core::AccountIdentity;

use crate::dto::PricingResponse;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn pricing_handler(
    State(state): State<AppState>,
    Extension(account): Extension<AccountIdentity>,
) -> ApiResult<Json<PricingResponse>> {
    let overview = state.billing_service.pricing(&account).await?;
    Ok(Json(PricingResponse::from(overview)))
}
