//! Field schemas and the per-field submission validator.

use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use formwell_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::email::is_plausible_email;

/// Supported form input types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Single-line text.
    Text,
    /// Email address.
    Email,
    /// Multi-line text.
    Textarea,
    /// Single choice from a dropdown.
    Select,
    /// Any number of choices.
    Checkbox,
    /// Single choice from radio buttons.
    Radio,
    /// Numeric input, stored as supplied.
    Number,
    /// Telephone number.
    Tel,
    /// Absolute URL.
    Url,
}

impl FieldType {
    /// Returns stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Textarea => "textarea",
            Self::Select => "select",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::Number => "number",
            Self::Tel => "tel",
            Self::Url => "url",
        }
    }

    /// Returns whether the type draws its values from `options`.
    #[must_use]
    pub fn uses_options(&self) -> bool {
        matches!(self, Self::Select | Self::Checkbox | Self::Radio)
    }
}

impl FromStr for FieldType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "text" => Ok(Self::Text),
            "email" => Ok(Self::Email),
            "textarea" => Ok(Self::Textarea),
            "select" => Ok(Self::Select),
            "checkbox" => Ok(Self::Checkbox),
            "radio" => Ok(Self::Radio),
            "number" => Ok(Self::Number),
            "tel" => Ok(Self::Tel),
            "url" => Ok(Self::Url),
            _ => Err(AppError::Validation(format!("unknown field type '{value}'"))),
        }
    }
}

/// Unvalidated field schema as authored in the form builder.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FormFieldInput {
    /// Field id, unique within a form.
    pub id: String,
    /// Input type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Human-readable label.
    pub label: String,
    /// Optional placeholder text.
    #[serde(default)]
    pub placeholder: Option<String>,
    /// Whether a value must be supplied.
    #[serde(default)]
    pub required: bool,
    /// Allowed values for select, radio and checkbox fields.
    #[serde(default)]
    pub options: Option<Vec<String>>,
}

/// Validated field schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FormFieldInput")]
pub struct FormField {
    id: NonEmptyString,
    #[serde(rename = "type")]
    field_type: FieldType,
    label: NonEmptyString,
    #[serde(skip_serializing_if = "Option::is_none")]
    placeholder: Option<String>,
    required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<Vec<String>>,
}

impl FormField {
    /// Creates a validated field schema.
    ///
    /// Options are required for select, radio and checkbox fields and rejected
    /// for every other type.
    pub fn new(
        id: impl Into<String>,
        field_type: FieldType,
        label: impl Into<String>,
        placeholder: Option<String>,
        required: bool,
        options: Option<Vec<String>>,
    ) -> AppResult<Self> {
        let id = NonEmptyString::new(id)?;
        let label = NonEmptyString::new(label).map_err(|_| {
            AppError::Validation(format!("field '{}' must have a label", id.as_str()))
        })?;

        let options = match (field_type.uses_options(), options) {
            (true, Some(options)) => {
                if options.is_empty() {
                    return Err(AppError::Validation(format!(
                        "{} field '{}' must define at least one option",
                        field_type.as_str(),
                        id.as_str()
                    )));
                }

                let mut seen = HashSet::new();
                for option in &options {
                    if option.trim().is_empty() {
                        return Err(AppError::Validation(format!(
                            "field '{}' has an empty option",
                            id.as_str()
                        )));
                    }
                    if !seen.insert(option.as_str()) {
                        return Err(AppError::Validation(format!(
                            "field '{}' has duplicate option '{option}'",
                            id.as_str()
                        )));
                    }
                }

                Some(options)
            }
            (true, None) => {
                return Err(AppError::Validation(format!(
                    "{} field '{}' must define options",
                    field_type.as_str(),
                    id.as_str()
                )));
            }
            (false, Some(_)) => {
                return Err(AppError::Validation(format!(
                    "options are only allowed for select, radio and checkbox fields, got '{}' on field '{}'",
                    field_type.as_str(),
                    id.as_str()
                )));
            }
            (false, None) => None,
        };

        Ok(Self {
            id,
            field_type,
            label,
            placeholder: placeholder.filter(|value| !value.is_empty()),
            required,
            options,
        })
    }

    /// Returns field id.
    #[must_use]
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Returns field type.
    #[must_use]
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Returns field label.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    /// Returns placeholder text.
    #[must_use]
    pub fn placeholder(&self) -> Option<&str> {
        self.placeholder.as_deref()
    }

    /// Returns whether the field is required.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Returns allowed options, empty for free-form types.
    #[must_use]
    pub fn options(&self) -> &[String] {
        self.options.as_deref().unwrap_or_default()
    }

    /// Validates one raw submitted value against this field.
    ///
    /// `None` and JSON `null` mean the key was not submitted. Returns the
    /// normalized value to store, or `Ok(None)` when nothing should be stored.
    pub fn validate(&self, raw: Option<&Value>) -> Result<Option<FieldValue>, FieldError> {
        let raw = match raw {
            None | Some(Value::Null) => None,
            Some(value) => Some(value),
        };

        let Some(raw) = raw else {
            return if self.required {
                Err(FieldError::Required)
            } else {
                Ok(None)
            };
        };

        // Blank strings and empty lists are missing values for every type.
        if is_blank(raw) {
            if self.required {
                return Err(FieldError::Required);
            }
            let is_checkbox = self.field_type == FieldType::Checkbox;
            return Ok(match raw {
                Value::String(text) if !is_checkbox => Some(FieldValue::Text(text.clone())),
                Value::Array(_) if is_checkbox => Some(FieldValue::ChoiceSet(Vec::new())),
                _ => None,
            });
        }

        if self.field_type == FieldType::Checkbox {
            return self.validate_choice_set(raw).map(Some);
        }

        let Value::String(text) = raw else {
            return Err(FieldError::InvalidValue {
                expected: "a string",
            });
        };

        match self.field_type {
            FieldType::Email if !is_plausible_email(text) => Err(FieldError::InvalidEmail),
            FieldType::Url if Url::parse(text).is_err() => Err(FieldError::InvalidUrl),
            FieldType::Select | FieldType::Radio => {
                if self.options().iter().any(|option| option == text) {
                    Ok(Some(FieldValue::Choice(text.clone())))
                } else {
                    Err(FieldError::InvalidOption(text.clone()))
                }
            }
            _ => Ok(Some(FieldValue::Text(text.clone()))),
        }
    }

    fn validate_choice_set(&self, raw: &Value) -> Result<FieldValue, FieldError> {
        let Value::Array(items) = raw else {
            return Err(FieldError::InvalidValue {
                expected: "a list of options",
            });
        };

        let mut selected: Vec<String> = Vec::with_capacity(items.len());
        for item in items {
            let Value::String(choice) = item else {
                return Err(FieldError::InvalidValue {
                    expected: "a list of options",
                });
            };
            if !self.options().iter().any(|option| option == choice) {
                return Err(FieldError::InvalidOption(choice.clone()));
            }
            if selected.contains(choice) {
                return Err(FieldError::InvalidValue {
                    expected: "a list of distinct options",
                });
            }
            selected.push(choice.clone());
        }

        Ok(FieldValue::ChoiceSet(selected))
    }
}

fn is_blank(raw: &Value) -> bool {
    match raw {
        Value::String(text) => text.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

impl TryFrom<FormFieldInput> for FormField {
    type Error = AppError;

    fn try_from(input: FormFieldInput) -> Result<Self, Self::Error> {
        Self::new(
            input.id,
            input.field_type,
            input.label,
            input.placeholder,
            input.required,
            input.options,
        )
    }
}

/// Normalized submitted value, shaped by the field type that accepted it.
///
/// All variants serialize to the plain JSON the visitor sent: strings for
/// text and single choices, an array for checkbox selections. Reading a
/// stored string back always yields `Text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Free-form text value.
    Text(String),
    /// Distinct selected options, in submitted order.
    ChoiceSet(Vec<String>),
    /// One option of a select or radio field.
    #[serde(skip_deserializing)]
    Choice(String),
}

impl FieldValue {
    /// Returns the value as a JSON value.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(text) | Self::Choice(text) => Value::String(text.clone()),
            Self::ChoiceSet(choices) => {
                Value::Array(choices.iter().cloned().map(Value::String).collect())
            }
        }
    }
}

impl Display for FieldValue {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(text) | Self::Choice(text) => formatter.write_str(text),
            Self::ChoiceSet(choices) => formatter.write_str(choices.join(", ").as_str()),
        }
    }
}

/// Reason a submitted value was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// A required field was absent, empty, or an empty selection.
    #[error("is required")]
    Required,
    /// Email field value is not a `local@domain.tld` address.
    #[error("must be a valid email address")]
    InvalidEmail,
    /// URL field value is not an absolute URL.
    #[error("must be a valid URL")]
    InvalidUrl,
    /// Choice value is not one of the field options.
    #[error("has no option '{0}'")]
    InvalidOption(String),
    /// JSON shape does not fit the field type.
    #[error("must be {expected}")]
    InvalidValue {
        /// Expected JSON shape.
        expected: &'static str,
    },
    /// Submitted key does not name a field of the form.
    #[error("is not a field of this form")]
    UnknownField,
}

/// One rejected field in a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    field_id: String,
    label: Option<String>,
    error: FieldError,
}

impl FieldIssue {
    /// Creates an issue for a known field.
    #[must_use]
    pub fn for_field(field: &FormField, error: FieldError) -> Self {
        Self {
            field_id: field.id().to_owned(),
            label: Some(field.label().to_owned()),
            error,
        }
    }

    /// Creates an issue for a submitted key that matches no field.
    #[must_use]
    pub fn unknown_field(key: impl Into<String>) -> Self {
        Self {
            field_id: key.into(),
            label: None,
            error: FieldError::UnknownField,
        }
    }

    /// Returns the offending field id or submitted key.
    #[must_use]
    pub fn field_id(&self) -> &str {
        self.field_id.as_str()
    }

    /// Returns the error kind.
    #[must_use]
    pub fn error(&self) -> &FieldError {
        &self.error
    }

    /// Returns the message shown next to the field.
    #[must_use]
    pub fn message(&self) -> String {
        let subject = self.label.as_deref().unwrap_or(self.field_id.as_str());
        match &self.error {
            FieldError::InvalidEmail => "Please enter a valid email address".to_owned(),
            FieldError::InvalidUrl => "Please enter a valid URL".to_owned(),
            FieldError::UnknownField => format!("unknown field '{}'", self.field_id),
            error => format!("{subject} {error}"),
        }
    }
}
