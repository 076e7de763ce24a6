use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value, json};

use formwell_core::{AccountId, AccountIdentity, AppError, AppResult};
use formwell_domain::{
    FieldError, FieldType, FieldValue, Form, FormField, FormId, FormSchema, FormSettings, FormTheme,
    Submission, SubmissionData,
};

use super::{IntakeError, IntakeService, SubmissionContext, SubmissionQuotaMode};
use crate::entitlement_service::EntitlementService;
use crate::form_ports::SubmissionRepository;
use crate::notification_service::{
    EmailService, NotificationQueue, NotificationService, SubmissionNotification,
};
use crate::test_support::{
    FixedBilling, InMemoryStore, RecordingQueue, contact_form, contact_schema, owner,
};
use crate::usage_service::UsageService;

fn pipeline(
    store: &Arc<InMemoryStore>,
    billing: FixedBilling,
    queue: Arc<dyn NotificationQueue>,
    quota_mode: SubmissionQuotaMode,
) -> IntakeService {
    let usage = UsageService::new(
        EntitlementService::new(Arc::new(billing)),
        store.clone(),
        store.clone(),
    );
    IntakeService::new(store.clone(), store.clone(), usage, queue, quota_mode)
}

fn enforcing(store: &Arc<InMemoryStore>, billing: FixedBilling) -> IntakeService {
    pipeline(
        store,
        billing,
        Arc::new(RecordingQueue::default()),
        SubmissionQuotaMode::Enforce,
    )
}

fn payload(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

fn valid_payload() -> Map<String, Value> {
    payload(json!({
        "name": "Ada Lovelace",
        "email": "ada@example.com",
        "website": "https://example.com/ada",
        "topics": ["A", "C"]
    }))
}

fn notifying_form(actor: &AccountIdentity) -> Form {
    let settings = FormSettings::new(
        "Send",
        "Thanks, we will be in touch.",
        FormTheme::Light,
        "#112233",
        Some("owner@example.com".to_owned()),
    )
    .unwrap_or_else(|_| unreachable!());
    Form::new(
        actor.account_id(),
        "Leads",
        None,
        contact_schema(settings),
        Utc::now(),
    )
    .unwrap_or_else(|_| unreachable!())
}

async fn stored_form(store: &Arc<InMemoryStore>) -> Form {
    let form = contact_form(&owner());
    store.insert_form(form.clone()).await;
    form
}

#[tokio::test]
async fn unknown_form_is_not_found() {
    let store = Arc::new(InMemoryStore::default());
    let result = enforcing(&store, FixedBilling::Free)
        .submit(FormId::new(), &valid_payload(), SubmissionContext::default())
        .await;

    assert!(matches!(result, Err(IntakeError::FormNotFound)));
}

#[tokio::test]
async fn inactive_form_rejects_every_submission() {
    let store = Arc::new(InMemoryStore::default());
    let mut form = contact_form(&owner());
    form.set_active(false, Utc::now());
    store.insert_form(form.clone()).await;
    let intake = enforcing(&store, FixedBilling::Pro);

    let payloads = [
        valid_payload(),
        Map::new(),
        payload(json!({ "email": "not-an-email", "topics": ["Z"], "injected": 1 })),
    ];
    for raw in payloads {
        let result = intake
            .submit(form.id(), &raw, SubmissionContext::default())
            .await;
        assert!(matches!(result, Err(IntakeError::FormInactive)));
    }

    assert!(store.submissions_for(form.id()).await.is_empty());
}

fn every_type_form(actor: &AccountIdentity) -> Form {
    let options = || Some(vec!["A".to_owned(), "B".to_owned(), "C".to_owned()]);
    let fields = [
        ("text", FieldType::Text, None),
        ("email", FieldType::Email, None),
        ("textarea", FieldType::Textarea, None),
        ("select", FieldType::Select, options()),
        ("checkbox", FieldType::Checkbox, options()),
        ("radio", FieldType::Radio, options()),
        ("number", FieldType::Number, None),
        ("tel", FieldType::Tel, None),
        ("url", FieldType::Url, None),
    ]
    .into_iter()
    .map(|(id, field_type, options)| FormField::new(id, field_type, id, None, true, options))
    .collect::<Result<Vec<_>, _>>()
    .unwrap_or_else(|_| unreachable!());
    let schema =
        FormSchema::new(fields, FormSettings::default()).unwrap_or_else(|_| unreachable!());

    Form::new(actor.account_id(), "Everything", None, schema, Utc::now())
        .unwrap_or_else(|_| unreachable!())
}

#[tokio::test]
async fn every_field_type_round_trips_through_storage() {
    let store = Arc::new(InMemoryStore::default());
    let form = every_type_form(&owner());
    store.insert_form(form.clone()).await;
    let raw = payload(json!({
        "text": "Ada, \"the\" first",
        "email": "ada@example.com",
        "textarea": "line one\nline two",
        "select": "B",
        "checkbox": ["C", "A"],
        "radio": "A",
        "number": "0042.50",
        "tel": "+44 20 7946 0958",
        "url": "https://example.com/a?b=c"
    }));

    let ack = enforcing(&store, FixedBilling::Free)
        .submit(form.id(), &raw, SubmissionContext::default())
        .await
        .unwrap_or_else(|_| unreachable!());

    let stored = store.submissions_for(form.id()).await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id(), ack.submission_id);
    assert_eq!(stored[0].data().get("select"), Some(&FieldValue::Choice("B".to_owned())));

    let persisted = stored[0].data().to_json();
    assert_eq!(persisted, Value::Object(raw.clone()));

    let reloaded = SubmissionData::from_json(persisted).unwrap_or_else(|_| unreachable!());
    assert_eq!(reloaded.to_json(), Value::Object(raw));
    assert_eq!(reloaded.get("select"), Some(&FieldValue::Text("B".to_owned())));
    assert_eq!(reloaded.get("radio"), Some(&FieldValue::Text("A".to_owned())));
    assert_eq!(
        reloaded.get("checkbox"),
        Some(&FieldValue::ChoiceSet(vec!["C".to_owned(), "A".to_owned()]))
    );
}

#[tokio::test]
async fn submissions_for_unknown_forms_are_not_stored() {
    let store = InMemoryStore::default();
    let orphan = Submission::new(
        FormId::new(),
        SubmissionData::default(),
        None,
        None,
        Utc::now(),
    );

    assert!(matches!(
        store.create_submission(&orphan).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn missing_required_fields_are_all_reported() {
    let store = Arc::new(InMemoryStore::default());
    let form = stored_form(&store).await;

    let result = enforcing(&store, FixedBilling::Free)
        .submit(
            form.id(),
            &payload(json!({ "website": "https://example.com" })),
            SubmissionContext::default(),
        )
        .await;

    let Err(IntakeError::ValidationFailed(issues)) = result else {
        unreachable!()
    };
    let rejected: Vec<(&str, &FieldError)> = issues
        .iter()
        .map(|issue| (issue.field_id(), issue.error()))
        .collect();
    assert_eq!(
        rejected,
        vec![
            ("name", &FieldError::Required),
            ("email", &FieldError::Required)
        ]
    );
    assert!(store.submissions_for(form.id()).await.is_empty());
}

#[tokio::test]
async fn valid_submission_is_stored_exactly_as_submitted() {
    let store = Arc::new(InMemoryStore::default());
    let form = stored_form(&store).await;
    let raw = valid_payload();

    let ack = enforcing(&store, FixedBilling::Free)
        .submit(
            form.id(),
            &raw,
            SubmissionContext {
                ip_address: Some("203.0.113.9".to_owned()),
                user_agent: Some("Mozilla/5.0".to_owned()),
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(ack.success_message, "Thank you for your submission!");

    let stored = store
        .list_submissions(form.id())
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id(), ack.submission_id);
    assert_eq!(stored[0].data().to_json(), Value::Object(raw));
    assert_eq!(stored[0].ip_address(), Some("203.0.113.9"));
    assert_eq!(stored[0].user_agent(), Some("Mozilla/5.0"));
}

#[tokio::test]
async fn email_url_and_checkbox_rules_apply_at_intake() {
    let store = Arc::new(InMemoryStore::default());
    let form = stored_form(&store).await;
    let intake = enforcing(&store, FixedBilling::Free);

    let cases = [
        ("email", json!("not-an-email"), FieldError::InvalidEmail),
        ("website", json!("not a url"), FieldError::InvalidUrl),
        ("topics", json!(["Z"]), FieldError::InvalidOption("Z".to_owned())),
    ];

    for (field_id, value, expected) in cases {
        let mut raw = valid_payload();
        raw.insert(field_id.to_owned(), value);

        let result = intake
            .submit(form.id(), &raw, SubmissionContext::default())
            .await;
        assert!(matches!(
            result,
            Err(IntakeError::ValidationFailed(ref issues))
                if issues.len() == 1
                    && issues[0].field_id() == field_id
                    && issues[0].error() == &expected
        ));
    }

    assert!(store.submissions_for(form.id()).await.is_empty());
}

#[tokio::test]
async fn unknown_keys_are_rejected() {
    let store = Arc::new(InMemoryStore::default());
    let form = stored_form(&store).await;
    let mut raw = valid_payload();
    raw.insert("injected".to_owned(), json!("value"));

    let result = enforcing(&store, FixedBilling::Free)
        .submit(form.id(), &raw, SubmissionContext::default())
        .await;

    assert!(matches!(
        result,
        Err(IntakeError::ValidationFailed(ref issues))
            if issues.len() == 1 && issues[0].error() == &FieldError::UnknownField
    ));
}

#[tokio::test]
async fn free_tier_monthly_cap_is_enforced() {
    let store = Arc::new(InMemoryStore::default());
    let form = stored_form(&store).await;
    store.insert_submissions(&form, 50).await;

    let result = enforcing(&store, FixedBilling::Free)
        .submit(form.id(), &valid_payload(), SubmissionContext::default())
        .await;

    assert!(matches!(result, Err(IntakeError::QuotaExceeded { limit: 50 })));
    assert_eq!(store.submissions_for(form.id()).await.len(), 50);
}

#[tokio::test]
async fn billing_outage_applies_free_tier_cap() {
    let store = Arc::new(InMemoryStore::default());
    let form = stored_form(&store).await;
    store.insert_submissions(&form, 50).await;

    let result = enforcing(&store, FixedBilling::Failing)
        .submit(form.id(), &valid_payload(), SubmissionContext::default())
        .await;

    assert!(matches!(result, Err(IntakeError::QuotaExceeded { limit: 50 })));
}

#[tokio::test]
async fn observe_mode_accepts_over_the_cap() {
    let store = Arc::new(InMemoryStore::default());
    let form = stored_form(&store).await;
    store.insert_submissions(&form, 50).await;

    let result = pipeline(
        &store,
        FixedBilling::Free,
        Arc::new(RecordingQueue::default()),
        SubmissionQuotaMode::Observe,
    )
    .submit(form.id(), &valid_payload(), SubmissionContext::default())
    .await;

    assert!(result.is_ok());
    assert_eq!(store.submissions_for(form.id()).await.len(), 51);
}

#[tokio::test]
async fn pro_forms_queue_one_notification() {
    let store = Arc::new(InMemoryStore::default());
    let form = notifying_form(&owner());
    store.insert_form(form.clone()).await;
    store.insert_submissions(&form, 60).await;
    let queue = Arc::new(RecordingQueue::default());

    let result = pipeline(
        &store,
        FixedBilling::Pro,
        queue.clone(),
        SubmissionQuotaMode::Enforce,
    )
    .submit(form.id(), &valid_payload(), SubmissionContext::default())
    .await;

    assert!(matches!(
        result,
        Ok(ref ack) if ack.success_message == "Thanks, we will be in touch."
    ));

    let jobs = queue.jobs.lock().await;
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].destination.as_str(), "owner@example.com");
    assert_eq!(jobs[0].subject(), "New submission for Leads");
    assert!(
        jobs[0]
            .rows
            .iter()
            .any(|row| row.label == "Topics" && row.value == "A, C")
    );
}

#[tokio::test]
async fn downgraded_owner_gets_no_notification() {
    let store = Arc::new(InMemoryStore::default());
    let form = notifying_form(&owner());
    store.insert_form(form.clone()).await;
    let queue = Arc::new(RecordingQueue::default());

    let result = pipeline(
        &store,
        FixedBilling::Free,
        queue.clone(),
        SubmissionQuotaMode::Enforce,
    )
    .submit(form.id(), &valid_payload(), SubmissionContext::default())
    .await;

    assert!(result.is_ok());
    assert!(queue.jobs.lock().await.is_empty());
}

struct ServerErrorEmail;

#[async_trait]
impl EmailService for ServerErrorEmail {
    async fn send_email(
        &self,
        _to: &str,
        _subject: &str,
        _text_body: &str,
        _html_body: Option<&str>,
    ) -> AppResult<()> {
        Err(AppError::Internal(
            "email provider returned status 500".to_owned(),
        ))
    }
}

/// Delivers inline so a provider failure happens inside `submit`.
struct InlineDelivery(NotificationService);

#[async_trait]
impl NotificationQueue for InlineDelivery {
    async fn enqueue(&self, notification: SubmissionNotification) -> AppResult<()> {
        self.0.deliver(&notification).await;
        Ok(())
    }
}

struct ClosedQueue;

#[async_trait]
impl NotificationQueue for ClosedQueue {
    async fn enqueue(&self, _notification: SubmissionNotification) -> AppResult<()> {
        Err(AppError::Internal("notification queue is closed".to_owned()))
    }
}

#[tokio::test]
async fn provider_failure_still_acknowledges_the_submission() {
    let store = Arc::new(InMemoryStore::default());
    let form = notifying_form(&owner());
    store.insert_form(form.clone()).await;
    let queue = Arc::new(InlineDelivery(NotificationService::new(Arc::new(
        ServerErrorEmail,
    ))));

    let result = pipeline(&store, FixedBilling::Pro, queue, SubmissionQuotaMode::Enforce)
        .submit(form.id(), &valid_payload(), SubmissionContext::default())
        .await;

    assert!(result.is_ok());
    assert_eq!(store.submissions_for(form.id()).await.len(), 1);
}

#[tokio::test]
async fn queue_failure_still_acknowledges_the_submission() {
    let store = Arc::new(InMemoryStore::default());
    let form = notifying_form(&owner());
    store.insert_form(form.clone()).await;

    let result = pipeline(
        &store,
        FixedBilling::Pro,
        Arc::new(ClosedQueue),
        SubmissionQuotaMode::Enforce,
    )
    .submit(form.id(), &valid_payload(), SubmissionContext::default())
    .await;

    assert!(result.is_ok());
    assert_eq!(store.submissions_for(form.id()).await.len(), 1);
}

struct UnwritableSubmissions;

#[async_trait]
impl SubmissionRepository for UnwritableSubmissions {
    async fn create_submission(&self, _submission: &Submission) -> AppResult<()> {
        Err(AppError::Internal(
            "failed to insert submission: connection reset".to_owned(),
        ))
    }

    async fn list_submissions(&self, _form_id: FormId) -> AppResult<Vec<Submission>> {
        Ok(Vec::new())
    }

    async fn count_submissions_since(
        &self,
        _owner_id: AccountId,
        _since: DateTime<Utc>,
    ) -> AppResult<u64> {
        Ok(0)
    }

    async fn count_form_submissions_since(
        &self,
        _form_id: FormId,
        _since: DateTime<Utc>,
    ) -> AppResult<u64> {
        Ok(0)
    }
}

#[tokio::test]
async fn store_write_failure_is_surfaced() {
    let store = Arc::new(InMemoryStore::default());
    let form = stored_form(&store).await;
    let submissions = Arc::new(UnwritableSubmissions);
    let usage = UsageService::new(
        EntitlementService::new(Arc::new(FixedBilling::Free)),
        store.clone(),
        submissions.clone(),
    );
    let intake = IntakeService::new(
        store.clone(),
        submissions,
        usage,
        Arc::new(RecordingQueue::default()),
        SubmissionQuotaMode::Enforce,
    );

    let result = intake
        .submit(form.id(), &valid_payload(), SubmissionContext::default())
        .await;

    assert!(matches!(result, Err(IntakeError::Store(AppError::Internal(_)))));
}

#[test]
fn quota_mode_parses_from_config() {
    assert_eq!(
        "Observe".parse::<SubmissionQuotaMode>().ok(),
        Some(SubmissionQuotaMode::Observe)
    );
    assert_eq!(
        "enforce".parse::<SubmissionQuotaMode>().ok(),
        Some(SubmissionQuotaMode::Enforce)
    );
    assert!("strict".parse::<SubmissionQuotaMode>().is_err());
}
