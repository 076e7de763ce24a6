use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use formwell_core::{AccountId, AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::email::EmailAddress;
use crate::field::{FieldIssue, FormField};
use crate::submission::SubmissionData;

/// Default label of the submit button.
pub const DEFAULT_SUBMIT_BUTTON_TEXT: &str = "Submit";

/// Default message shown after a successful submission.
pub const DEFAULT_SUCCESS_MESSAGE: &str = "Thank you for your submission!";

/// Default submit button color.
pub const DEFAULT_BUTTON_COLOR: &str = "#000000";

/// Unique identifier for a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FormId(Uuid);

impl FormId {
    /// Creates a random form identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a form identifier from an existing UUID value.
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

impl Default for FormId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for FormId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for FormId {
    type Err = AppError;

    // Unparseable ids cannot name an existing form.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|_| AppError::NotFound(format!("form '{value}' not found")))
    }
}

/// Public form color scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormTheme {
    /// Light background.
    #[default]
    Light,
    /// Dark background.
    Dark,
}

impl FormTheme {
    /// Returns stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl FromStr for FormTheme {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            _ => Err(AppError::Validation(format!("unknown form theme '{value}'"))),
        }
    }
}

/// Unvalidated settings as authored in the form builder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormSettingsInput {
    /// Submit button label.
    pub submit_button_text: String,
    /// Confirmation message.
    pub success_message: String,
    /// Color theme.
    pub theme: FormTheme,
    /// Submit button color as a hex string.
    pub button_color: String,
    /// Address notified about new submissions.
    pub notify_email: Option<String>,
}

/// Presentation settings of a public form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "FormSettingsInput")]
pub struct FormSettings {
    submit_button_text: String,
    success_message: String,
    theme: FormTheme,
    button_color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    notify_email: Option<EmailAddress>,
}

impl FormSettings {
    /// Creates validated form settings.
    ///
    /// Blank texts fall back to the builder defaults.
    pub fn new(
        submit_button_text: impl Into<String>,
        success_message: impl Into<String>,
        theme: FormTheme,
        button_color: impl Into<String>,
        notify_email: Option<String>,
    ) -> AppResult<Self> {
        let button_color = button_color.into().trim().to_owned();
        let button_color = if button_color.is_empty() {
            DEFAULT_BUTTON_COLOR.to_owned()
        } else {
            validate_hex_color(button_color)?
        };

        Ok(Self {
            submit_button_text: non_blank_or(submit_button_text.into(), DEFAULT_SUBMIT_BUTTON_TEXT),
            success_message: non_blank_or(success_message.into(), DEFAULT_SUCCESS_MESSAGE),
            theme,
            button_color,
            notify_email: notify_email
                .filter(|value| !value.trim().is_empty())
                .map(EmailAddress::new)
                .transpose()?,
        })
    }

    /// Returns submit button text.
    #[must_use]
    pub fn submit_button_text(&self) -> &str {
        self.submit_button_text.as_str()
    }

    /// Returns the message shown after submitting.
    #[must_use]
    pub fn success_message(&self) -> &str {
        self.success_message.as_str()
    }

    /// Returns color theme.
    #[must_use]
    pub fn theme(&self) -> FormTheme {
        self.theme
    }

    /// Returns submit button color.
    #[must_use]
    pub fn button_color(&self) -> &str {
        self.button_color.as_str()
    }

    /// Returns the submission notification address.
    #[must_use]
    pub fn notify_email(&self) -> Option<&EmailAddress> {
        self.notify_email.as_ref()
    }
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            submit_button_text: DEFAULT_SUBMIT_BUTTON_TEXT.to_owned(),
            success_message: DEFAULT_SUCCESS_MESSAGE.to_owned(),
            theme: FormTheme::Light,
            button_color: DEFAULT_BUTTON_COLOR.to_owned(),
            notify_email: None,
        }
    }
}

impl TryFrom<FormSettingsInput> for FormSettings {
    type Error = AppError;

    fn try_from(input: FormSettingsInput) -> Result<Self, Self::Error> {
        Self::new(
            input.submit_button_text,
            input.success_message,
            input.theme,
            input.button_color,
            input.notify_email,
        )
    }
}

fn non_blank_or(value: String, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_owned()
    } else {
        value
    }
}

fn validate_hex_color(value: String) -> AppResult<String> {
    let digits = value.strip_prefix('#').unwrap_or_default();
    let valid = matches!(digits.len(), 3 | 4 | 6 | 8)
        && digits.chars().all(|character| character.is_ascii_hexdigit());

    if !valid {
        return Err(AppError::Validation(format!(
            "button color '{value}' must be a hex color such as #000000"
        )));
    }

    Ok(value)
}

/// Ordered field schemas plus presentation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSchema {
    fields: Vec<FormField>,
    settings: FormSettings,
}

impl FormSchema {
    /// Creates a validated form schema.
    pub fn new(fields: Vec<FormField>, settings: FormSettings) -> AppResult<Self> {
        if fields.is_empty() {
            return Err(AppError::Validation(
                "forms must include at least one field".to_owned(),
            ));
        }

        let mut seen_ids = HashSet::new();
        for field in &fields {
            if !seen_ids.insert(field.id()) {
                return Err(AppError::Validation(format!(
                    "duplicate field id '{}' in form",
                    field.id()
                )));
            }
        }

        Ok(Self { fields, settings })
    }

    /// Returns fields in display and validation order.
    #[must_use]
    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Returns presentation settings.
    #[must_use]
    pub fn settings(&self) -> &FormSettings {
        &self.settings
    }

    /// Validates a raw submission payload against every field.
    ///
    /// Fields are checked in form order and every problem is collected;
    /// keys that name no field are reported after the field issues.
    pub fn validate_submission(
        &self,
        raw: &Map<String, Value>,
    ) -> Result<SubmissionData, Vec<FieldIssue>> {
        let mut data = SubmissionData::default();
        let mut issues = Vec::new();

        for field in &self.fields {
            match field.validate(raw.get(field.id())) {
                Ok(Some(value)) => data.insert(field.id(), value),
                Ok(None) => {}
                Err(error) => issues.push(FieldIssue::for_field(field, error)),
            }
        }

        for key in raw.keys() {
            if !self.fields.iter().any(|field| field.id() == key) {
                issues.push(FieldIssue::unknown_field(key.as_str()));
            }
        }

        if issues.is_empty() {
            Ok(data)
        } else {
            Err(issues)
        }
    }
}

/// Owner-authored form published at a public URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    id: FormId,
    owner_id: AccountId,
    name: NonEmptyString,
    description: Option<String>,
    schema: FormSchema,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Form {
    /// Creates a new active form owned by `owner_id`.
    pub fn new(
        owner_id: AccountId,
        name: impl Into<String>,
        description: Option<String>,
        schema: FormSchema,
        now: DateTime<Utc>,
    ) -> AppResult<Self> {
        Ok(Self {
            id: FormId::new(),
            owner_id,
            name: validated_name(name)?,
            description: normalize_description(description),
            schema,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuilds a form from persisted state.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: FormId,
        owner_id: AccountId,
        name: impl Into<String>,
        description: Option<String>,
        schema: FormSchema,
        is_active: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            owner_id,
            name: validated_name(name)?,
            description: normalize_description(description),
            schema,
            is_active,
            created_at,
            updated_at,
        })
    }

    /// Replaces the editable content of the form.
    pub fn revise(
        &mut self,
        name: impl Into<String>,
        description: Option<String>,
        schema: FormSchema,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        self.name = validated_name(name)?;
        self.description = normalize_description(description);
        self.schema = schema;
        self.updated_at = now;
        Ok(())
    }

    /// Enables or disables public submissions.
    pub fn set_active(&mut self, is_active: bool, now: DateTime<Utc>) {
        self.is_active = is_active;
        self.updated_at = now;
    }

    /// Returns form id.
    #[must_use]
    pub fn id(&self) -> FormId {
        self.id
    }

    /// Returns the owning account.
    #[must_use]
    pub fn owner_id(&self) -> AccountId {
        self.owner_id
    }

    /// Returns whether `account_id` owns this form.
    #[must_use]
    pub fn is_owned_by(&self, account_id: AccountId) -> bool {
        self.owner_id == account_id
    }

    /// Returns form name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns form schema.
    #[must_use]
    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    /// Returns fields in display order.
    #[must_use]
    pub fn fields(&self) -> &[FormField] {
        self.schema.fields()
    }

    /// Returns presentation settings.
    #[must_use]
    pub fn settings(&self) -> &FormSettings {
        self.schema.settings()
    }

    /// Returns whether the form accepts submissions.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns creation time.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns last update time.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

fn validated_name(name: impl Into<String>) -> AppResult<NonEmptyString> {
    let name = name.into().trim().to_owned();
    NonEmptyString::new(name)
        .map_err(|_| AppError::Validation("form name must not be empty".to_owned()))
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description.and_then(|value| {
        let trimmed = value.trim().to_owned();
        (!trimmed.is_empty()).then_some(trimmed)
    })
}
