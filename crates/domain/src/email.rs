//! Email address rules shared by form settings and email-typed fields.

use formwell_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Maximum accepted length for a stored email address.
pub const EMAIL_MAX_LENGTH: usize = 254;

/// Returns whether `value` has the single-line `local@domain.tld` shape.
///
/// The local part and domain may not contain whitespace or a second `@`, and
/// the domain needs a `.` with at least one character on each side.
#[must_use]
pub fn is_plausible_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    domain
        .char_indices()
        .any(|(index, character)| character == '.' && index > 0 && index + 1 < domain.len())
}

/// Validated notification destination address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated, lowercased email address.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim().to_lowercase();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "email address must not be empty".to_owned(),
            ));
        }

        if trimmed.len() > EMAIL_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "email address must not exceed {EMAIL_MAX_LENGTH} characters"
            )));
        }

        if !is_plausible_email(trimmed.as_str()) {
            return Err(AppError::Validation(format!(
                "'{trimmed}' is not a valid email address"
            )));
        }

        Ok(Self(trimmed))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}
