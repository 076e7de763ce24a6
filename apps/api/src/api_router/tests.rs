use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, Bytes, to_bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use chrono::Utc;
use formwell_application::{
    AttemptInfo, BillingGateway, BillingService, EntitlementService, FormRepository, FormService,
    IntakeService, RateLimitRepository, RateLimitRule, RateLimitService, SubmissionNotification,
    SubmissionQuotaMode, SubmissionRepository, UsageService,
};
use formwell_core::{AccountId, AppResult};
use formwell_infrastructure::{
    ChannelNotificationQueue, InMemoryFormStore, STATIC_PRO_PRODUCT_ID, StaticBillingGateway,
};
use serde_json::{Value, json};
use tokio::sync::{Mutex, mpsc};
use tower::ServiceExt;

use super::build_router;
use crate::middleware::{ACCOUNT_ID_HEADER, GATEWAY_SECRET_HEADER};
use crate::state::AppState;

const SECRET: &str = "router-test-gateway-secret-0123456789";

#[derive(Default)]
struct CountingRateLimitRepository {
    counts: Mutex<HashMap<String, i32>>,
}

#[async_trait]
impl RateLimitRepository for CountingRateLimitRepository {
    async fn record_attempt(
        &self,
        key: &str,
        _window_duration_seconds: i64,
    ) -> AppResult<AttemptInfo> {
        let mut counts = self.counts.lock().await;
        let count = counts.entry(key.to_owned()).or_insert(0);
        *count += 1;
        Ok(AttemptInfo {
            attempt_count: *count,
            window_started_at: Utc::now(),
        })
    }

    async fn cleanup_expired(&self, _before: chrono::DateTime<Utc>) -> AppResult<u64> {
        Ok(0)
    }
}

struct TestApp {
    router: Router,
    _notifications: mpsc::Receiver<SubmissionNotification>,
}

fn test_app(pro_accounts: Vec<AccountId>, public_submit_limit: i32) -> TestApp {
    let store = Arc::new(InMemoryFormStore::new());
    let forms: Arc<dyn FormRepository> = store.clone();
    let submissions: Arc<dyn SubmissionRepository> = store;
    let gateway: Arc<dyn BillingGateway> = Arc::new(StaticBillingGateway::new(pro_accounts));
    let usage = UsageService::new(
        EntitlementService::new(gateway.clone()),
        forms.clone(),
        submissions.clone(),
    );
    let (queue, notifications) = ChannelNotificationQueue::bounded(16);

    let state = AppState {
        form_service: FormService::new(forms.clone(), submissions.clone(), usage.clone()),
        intake_service: IntakeService::new(
            forms,
            submissions,
            usage.clone(),
            Arc::new(queue),
            SubmissionQuotaMode::Enforce,
        ),
        usage_service: usage,
        billing_service: BillingService::new(gateway),
        rate_limit_service: RateLimitService::new(Arc::new(
            CountingRateLimitRepository::default(),
        )),
        public_submit_rule: RateLimitRule::new("public_submit", public_submit_limit, 600),
        gateway_shared_secret: SECRET.to_owned(),
        trusted_proxies: Arc::from(Vec::new()),
        postgres_pool: None,
        redis_client: None,
    };

    TestApp {
        router: build_router(state, "http://localhost:3000").unwrap_or_else(|_| unreachable!()),
        _notifications: notifications,
    }
}

fn request(
    method: Method,
    uri: &str,
    account: Option<AccountId>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(account) = account {
        builder = builder
            .header(GATEWAY_SECRET_HEADER, SECRET)
            .header(ACCOUNT_ID_HEADER, account.to_string());
    }

    let body = match body {
        Some(body) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(body.to_string())
        }
        None => Body::empty(),
    };

    builder.body(body).unwrap_or_else(|_| unreachable!())
}

async fn send_raw(app: &TestApp, request: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
    let response = app
        .router
        .clone()
        .oneshot(request)
        .await
        .unwrap_or_else(|_| unreachable!());
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_else(|_| unreachable!());
    (status, headers, body)
}

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
    let (status, _, body) = send_raw(app, request).await;
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|_| unreachable!())
    };
    (status, json)
}

fn contact_form() -> Value {
    json!({
        "name": "Contact",
        "description": "Get in touch",
        "fields": [
            { "id": "name", "type": "text", "label": "Name", "required": true },
            { "id": "email", "type": "email", "label": "Email", "required": true }
        ],
        "settings": { "success_message": "Thanks!" }
    })
}

async fn create_contact_form(app: &TestApp, owner: AccountId) -> String {
    let (status, body) = send(
        app,
        request(Method::POST, "/api/forms", Some(owner), Some(contact_form())),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"]
        .as_str()
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| unreachable!())
}

fn submission_uri(form_id: &str) -> String {
    format!("/api/public/forms/{form_id}/submissions")
}

#[tokio::test]
async fn health_reports_unconfigured_dependencies_as_disabled() {
    let app = test_app(Vec::new(), 30);

    let (status, body) = send(&app, request(Method::GET, "/health", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "formwell-api");
    assert_eq!(body["postgres"]["status"], "disabled");
    assert_eq!(body["redis"]["status"], "disabled");
}

#[tokio::test]
async fn account_routes_require_the_gateway_secret() {
    let app = test_app(Vec::new(), 30);

    let (status, body) = send(&app, request(Method::GET, "/api/forms", None, None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
}

#[tokio::test]
async fn free_accounts_are_capped_at_one_form() {
    let app = test_app(Vec::new(), 30);
    let owner = AccountId::new();

    create_contact_form(&app, owner).await;
    let (status, body) = send(
        &app,
        request(Method::POST, "/api/forms", Some(owner), Some(contact_form())),
    )
    .await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body["code"], "quota_exceeded");

    let (status, body) = send(
        &app,
        request(Method::GET, "/api/usage/can-create-form", Some(owner), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["allowed"], false);

    let (_, body) = send(&app, request(Method::GET, "/api/usage", Some(owner), None)).await;
    assert_eq!(body["plan"], "free");
    assert_eq!(body["form_count"], 1);
    assert_eq!(body["max_submissions_per_month"], 50);
}

#[tokio::test]
async fn public_submissions_are_validated_stored_and_exported() {
    let app = test_app(Vec::new(), 30);
    let owner = AccountId::new();
    let form_id = create_contact_form(&app, owner).await;

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            &submission_uri(&form_id),
            None,
            Some(json!({ "data": { "name": "Ada" } })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_failed");
    assert_eq!(body["field_errors"][0]["field_id"], "email");

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            &submission_uri(&form_id),
            None,
            Some(json!({ "data": { "name": "Ada", "email": "ada@example.com" } })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Thanks!");

    let (status, body) = send(
        &app,
        request(
            Method::GET,
            &format!("/api/forms/{form_id}/submissions"),
            Some(owner),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["submissions"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["submissions"][0]["data"]["email"], "ada@example.com");

    let (status, headers, csv) = send_raw(
        &app,
        request(
            Method::GET,
            &format!("/api/forms/{form_id}/submissions/export"),
            Some(owner),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok()),
        Some("text/csv; charset=utf-8")
    );
    assert!(
        headers
            .get(header::CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.contains("contact_submissions_"))
    );
    let csv = String::from_utf8(csv.to_vec()).unwrap_or_else(|_| unreachable!());
    assert!(csv.starts_with("Submission ID,Submitted At,Name,Email\n"));
    assert!(csv.ends_with(",Ada,ada@example.com"));
}

#[tokio::test]
async fn closed_and_unknown_forms_reject_submissions() {
    let app = test_app(Vec::new(), 30);
    let owner = AccountId::new();
    let form_id = create_contact_form(&app, owner).await;

    let (status, body) = send(
        &app,
        request(
            Method::PUT,
            &format!("/api/forms/{form_id}/active"),
            Some(owner),
            Some(json!({ "is_active": false })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_active"], false);

    let (status, body) = send(
        &app,
        request(Method::GET, &format!("/api/public/forms/{form_id}"), None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_active"], false);
    assert!(body.get("notify_email").is_none());

    let payload = json!({ "data": { "name": "Ada", "email": "ada@example.com" } });
    let (status, body) = send(
        &app,
        request(
            Method::POST,
            &submission_uri(&form_id),
            None,
            Some(payload.clone()),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "form_inactive");

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            &submission_uri("not-a-form"),
            None,
            Some(payload),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn other_accounts_cannot_see_or_delete_a_form() {
    let app = test_app(Vec::new(), 30);
    let owner = AccountId::new();
    let stranger = AccountId::new();
    let form_id = create_contact_form(&app, owner).await;
    let uri = format!("/api/forms/{form_id}");

    let (status, _) = send(&app, request(Method::GET, &uri, Some(stranger), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, request(Method::DELETE, &uri, Some(stranger), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, request(Method::GET, &uri, Some(owner), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["form"]["name"], "Contact");
    assert_eq!(body["submissions_this_period"], 0);

    let (status, _) = send(&app, request(Method::DELETE, &uri, Some(owner), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, request(Method::GET, &uri, Some(owner), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn public_submissions_are_throttled_per_client() {
    let app = test_app(Vec::new(), 2);
    let owner = AccountId::new();
    let form_id = create_contact_form(&app, owner).await;
    let payload = json!({ "data": { "name": "Ada", "email": "ada@example.com" } });

    for _ in 0..2 {
        let (status, _) = send(
            &app,
            request(
                Method::POST,
                &submission_uri(&form_id),
                None,
                Some(payload.clone()),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            &submission_uri(&form_id),
            None,
            Some(payload),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["code"], "rate_limited");
}

#[tokio::test]
async fn pro_accounts_see_their_current_product() {
    let owner = AccountId::new();
    let app = test_app(vec![owner], 30);

    let (status, body) = send(
        &app,
        request(Method::GET, "/api/billing/pricing", Some(owner), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["current_product_id"], STATIC_PRO_PRODUCT_ID);
    assert_eq!(body["products"][0]["unit_amount"], 900);

    let (_, body) = send(&app, request(Method::GET, "/api/usage", Some(owner), None)).await;
    assert_eq!(body["plan"], "pro");
    assert_eq!(body["max_forms"], Value::Null);
}
