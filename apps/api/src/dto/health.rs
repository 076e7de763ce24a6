use serde::Serialize;
use ts_rs::TS;

/// Liveness report for load balancers and the status page.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub service: &'static str,
    pub status: &'static str,
    pub ready: bool,
    pub postgres: DependencyHealth,
    pub redis: DependencyHealth,
}

/// `ok`, `disabled` when not configured, or `error` with a detail.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/dependency-health.ts"
)]
pub struct DependencyHealth {
    pub status: &'static str,
    pub detail: Option<String>,
}

impl DependencyHealth {
    pub fn ok() -> Self {
        Self {
            status: "ok",
            detail: None,
        }
    }

    pub fn disabled() -> Self {
        Self {
            status: "disabled",
            detail: None,
        }
    }

    pub fn error(detail: String) -> Self {
        Self {
            status: "error",
            detail: Some(detail),
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == "error"
    }
}
