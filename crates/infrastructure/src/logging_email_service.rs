//! Email service used when no delivery credential is configured.

use async_trait::async_trait;
use tracing::info;

use formwell_application::EmailService;
use formwell_core::AppResult;

/// Email service that only logs that a message would have been sent.
///
/// Recipient and body are left out of the log line since they carry
/// submitter data.
#[derive(Clone, Default)]
pub struct LoggingEmailService;

impl LoggingEmailService {
    /// Creates a new logging email service.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmailService for LoggingEmailService {
    async fn send_email(
        &self,
        _to: &str,
        subject: &str,
        _text_body: &str,
        _html_body: Option<&str>,
    ) -> AppResult<()> {
        info!(
            subject = subject,
            "email delivery is not configured, skipping message"
        );
        Ok(())
    }
}
