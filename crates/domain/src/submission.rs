use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use formwell_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::field::FieldValue;
use crate::form::FormId;

/// Unique identifier for a stored submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubmissionId(Uuid);

impl SubmissionId {
    /// Creates a random submission identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a submission identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for SubmissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for SubmissionId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Accepted values keyed by field id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionData(BTreeMap<String, FieldValue>);

impl SubmissionData {
    /// Stores the value accepted for `field_id`.
    pub fn insert(&mut self, field_id: impl Into<String>, value: FieldValue) {
        self.0.insert(field_id.into(), value);
    }

    /// Returns the value stored for `field_id`.
    #[must_use]
    pub fn get(&self, field_id: &str) -> Option<&FieldValue> {
        self.0.get(field_id)
    }

    /// Returns the data as a JSON object.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(key, value)| (key.clone(), value.to_json()))
                .collect::<Map<String, Value>>(),
        )
    }

    /// Reads stored submission data back from JSON.
    pub fn from_json(value: Value) -> AppResult<Self> {
        serde_json::from_value(value)
            .map_err(|error| AppError::Internal(format!("invalid stored submission data: {error}")))
    }
}

/// Stored response to a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    id: SubmissionId,
    form_id: FormId,
    data: SubmissionData,
    ip_address: Option<String>,
    user_agent: Option<String>,
    submitted_at: DateTime<Utc>,
}

impl Submission {
    /// Creates a new submission record.
    #[must_use]
    pub fn new(
        form_id: FormId,
        data: SubmissionData,
        ip_address: Option<String>,
        user_agent: Option<String>,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self::from_parts(
            SubmissionId::new(),
            form_id,
            data,
            ip_address,
            user_agent,
            submitted_at,
        )
    }

    /// Rebuilds a submission from persisted state.
    #[must_use]
    pub fn from_parts(
        id: SubmissionId,
        form_id: FormId,
        data: SubmissionData,
        ip_address: Option<String>,
        user_agent: Option<String>,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            form_id,
            data,
            ip_address: ip_address.filter(|value| !value.trim().is_empty()),
            user_agent: user_agent.filter(|value| !value.trim().is_empty()),
            submitted_at,
        }
    }

    /// Returns submission id.
    #[must_use]
    pub fn id(&self) -> SubmissionId {
        self.id
    }

    /// Returns the form this submission answers.
    #[must_use]
    pub fn form_id(&self) -> FormId {
        self.form_id
    }

    /// Returns accepted values.
    #[must_use]
    pub fn data(&self) -> &SubmissionData {
        &self.data
    }

    /// Returns client address recorded at intake.
    #[must_use]
    pub fn ip_address(&self) -> Option<&str> {
        self.ip_address.as_deref()
    }

    /// Returns client user agent recorded at intake.
    #[must_use]
    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    /// Returns intake time.
    #[must_use]
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }
}
