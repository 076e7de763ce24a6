//! Transactional email over an HTTP delivery API (Resend-compatible).

use async_trait::async_trait;
use serde::Serialize;

use formwell_application::EmailService;
use formwell_core::{AppError, AppResult};

/// HTTP email service configuration.
#[derive(Clone)]
pub struct HttpEmailConfig {
    /// Provider endpoint accepting `POST` with a JSON message.
    pub api_url: String,
    /// Bearer credential.
    pub api_key: String,
    /// Verified sender address.
    pub from_address: String,
}

/// Email service posting messages to a delivery provider.
#[derive(Clone)]
pub struct HttpEmailService {
    http_client: reqwest::Client,
    config: HttpEmailConfig,
}

impl HttpEmailService {
    /// Creates a new HTTP email service.
    #[must_use]
    pub fn new(http_client: reqwest::Client, config: HttpEmailConfig) -> Self {
        Self {
            http_client,
            config,
        }
    }
}

#[derive(Debug, Serialize)]
struct OutgoingEmail<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
}

#[async_trait]
impl EmailService for HttpEmailService {
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: Option<&str>,
    ) -> AppResult<()> {
        let message = OutgoingEmail {
            from: self.config.from_address.as_str(),
            to: [to],
            subject,
            text: text_body,
            html: html_body,
        };

        let response = self
            .http_client
            .post(self.config.api_url.as_str())
            .bearer_auth(self.config.api_key.as_str())
            .json(&message)
            .send()
            .await
            .map_err(|error| AppError::Internal(format!("failed to send email: {error}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Internal(format!(
                "email provider returned status {status}: {body}"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::OutgoingEmail;

    #[test]
    fn message_matches_provider_shape() {
        let message = OutgoingEmail {
            from: "noreply@formwell.local",
            to: ["owner@example.com"],
            subject: "New submission for Contact",
            text: "Name: Ada",
            html: None,
        };

        assert_eq!(
            serde_json::to_value(&message).ok(),
            Some(json!({
                "from": "noreply@formwell.local",
                "to": ["owner@example.com"],
                "subject": "New submission for Contact",
                "text": "Name: Ada"
            }))
        );
    }
}
