mod checks;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::dto::HealthResponse;
use crate::state::AppState;

use checks::{check_postgres, check_redis};

/// Reports 503 only when a configured dependency fails its probe.
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (postgres, redis) = tokio::join!(
        check_postgres(state.postgres_pool.clone()),
        check_redis(state.redis_client.clone()),
    );

    let ready = !postgres.is_error() && !redis.is_error();
    let (http_status, status) = if ready {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        http_status,
        Json(HealthResponse {
            service: env!("CARGO_PKG_NAME"),
            status,
            ready,
            postgres,
            redis,
        }),
    )
}
