mod cors;
#[cfg(test)]
mod tests;

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use formwell_core::AppError;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, middleware};

use cors::build_cors_layer;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let account_routes = Router::new()
        .route(
            "/api/forms",
            get(handlers::forms::list_forms_handler).post(handlers::forms::create_form_handler),
        )
        .route(
            "/api/forms/{form_id}",
            get(handlers::forms::get_form_handler)
                .put(handlers::forms::update_form_handler)
                .delete(handlers::forms::delete_form_handler),
        )
        .route(
            "/api/forms/{form_id}/active",
            put(handlers::forms::set_form_active_handler),
        )
        .route(
            "/api/forms/{form_id}/submissions",
            get(handlers::submissions::list_submissions_handler),
        )
        .route(
            "/api/forms/{form_id}/submissions/export",
            get(handlers::submissions::export_submissions_handler),
        )
        .route("/api/usage", get(handlers::usage::usage_summary_handler))
        .route(
            "/api/usage/can-create-form",
            get(handlers::usage::can_create_form_handler),
        )
        .route(
            "/api/usage/submissions",
            get(handlers::usage::submission_usage_handler),
        )
        .route(
            "/api/billing/pricing",
            get(handlers::billing::pricing_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_gateway_identity,
        ));

    let public_submit_routes = Router::new()
        .route(
            "/api/public/forms/{form_id}/submissions",
            post(handlers::public::submit_public_form_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::throttle_public_submissions,
        ));

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route(
            "/api/public/forms/{form_id}",
            get(handlers::public::get_public_form_handler),
        )
        .merge(public_submit_routes)
        .merge(account_routes)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(frontend_url)?)
        .with_state(app_state))
}
