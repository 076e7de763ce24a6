//! Best-effort submission notifications.
//!
//! Intake only enqueues a [`SubmissionNotification`]; a worker outside the
//! request path hands it to [`NotificationService::deliver`]. Delivery is
//! attempted once and failures end in a log line.

use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use formwell_core::AppResult;
use formwell_domain::{EmailAddress, Form, FormId, SubmissionData, SubmissionId};

/// Port for sending transactional emails.
#[async_trait]
pub trait EmailService: Send + Sync {
    /// Sends a plain-text email with an optional HTML alternative.
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: Option<&str>,
    ) -> AppResult<()>;
}

/// Port for handing notification jobs to an out-of-band worker.
#[async_trait]
pub trait NotificationQueue: Send + Sync {
    /// Enqueues a job without waiting for delivery.
    async fn enqueue(&self, notification: SubmissionNotification) -> AppResult<()>;
}

/// One labelled value of a submission summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRow {
    /// Field label.
    pub label: String,
    /// Display value, with selections joined by `", "`.
    pub value: String,
}

/// Notification job for one stored submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionNotification {
    /// Form the submission answered.
    pub form_id: FormId,
    /// Stored submission.
    pub submission_id: SubmissionId,
    /// Form name used in the subject line.
    pub form_name: String,
    /// Recipient.
    pub destination: EmailAddress,
    /// Submitted values in form field order.
    pub rows: Vec<NotificationRow>,
    /// Intake time.
    pub submitted_at: DateTime<Utc>,
}

impl SubmissionNotification {
    /// Builds a job for `destination`, labelling values by the form's fields.
    #[must_use]
    pub fn for_submission(
        form: &Form,
        submission_id: SubmissionId,
        data: &SubmissionData,
        destination: EmailAddress,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        let rows = form
            .fields()
            .iter()
            .filter_map(|field| {
                data.get(field.id()).map(|value| NotificationRow {
                    label: field.label().to_owned(),
                    value: value.to_string(),
                })
            })
            .collect();

        Self {
            form_id: form.id(),
            submission_id,
            form_name: form.name().to_owned(),
            destination,
            rows,
            submitted_at,
        }
    }

    /// Returns the subject line.
    #[must_use]
    pub fn subject(&self) -> String {
        format!("New submission for {}", self.form_name)
    }

    /// Renders the plain-text body.
    #[must_use]
    pub fn text_body(&self) -> String {
        let mut body = format!(
            "You received a new submission for {}.\n\n",
            self.form_name
        );
        for row in &self.rows {
            let _ = writeln!(body, "{}: {}", row.label, row.value);
        }
        body
    }

    /// Renders the HTML body. Every submitted value is escaped.
    #[must_use]
    pub fn html_body(&self) -> String {
        let rows = self.rows.iter().fold(String::new(), |mut html, row| {
            let _ = write!(
                html,
                "<tr><td style=\"padding: 12px; border-bottom: 1px solid #e5e7eb; font-weight: 600; color: #374151;\">{}</td>\
                 <td style=\"padding: 12px; border-bottom: 1px solid #e5e7eb; color: #6b7280;\">{}</td></tr>",
                escape_html(row.label.as_str()),
                escape_html(row.value.as_str())
            );
            html
        });

        format!(
            "<!DOCTYPE html><html><head><meta charset=\"utf-8\"></head>\
             <body style=\"font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; background-color: #f9fafb; padding: 20px;\">\
             <div style=\"max-width: 600px; margin: 0 auto; background-color: white; border-radius: 8px;\">\
             <div style=\"padding: 24px; border-bottom: 2px solid #e5e7eb;\">\
             <h1 style=\"margin: 0; font-size: 24px; color: #111827;\">New Form Submission</h1>\
             <p style=\"margin: 8px 0 0 0; color: #6b7280;\">You received a new submission for <strong>{}</strong></p></div>\
             <div style=\"padding: 24px;\"><table style=\"width: 100%; border-collapse: collapse;\">{rows}</table></div>\
             </div></body></html>",
            escape_html(self.form_name.as_str())
        )
    }
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for character in value.chars() {
        match character {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Delivers queued submission notifications.
#[derive(Clone)]
pub struct NotificationService {
    email_service: Arc<dyn EmailService>,
}

impl NotificationService {
    /// Creates a notification service.
    #[must_use]
    pub fn new(email_service: Arc<dyn EmailService>) -> Self {
        Self { email_service }
    }

    /// Sends one notification. Failures are logged and never retried.
    pub async fn deliver(&self, notification: &SubmissionNotification) {
        let result = self
            .email_service
            .send_email(
                notification.destination.as_str(),
                notification.subject().as_str(),
                notification.text_body().as_str(),
                Some(notification.html_body().as_str()),
            )
            .await;

        match result {
            Ok(()) => info!(
                form_id = %notification.form_id,
                submission_id = %notification.submission_id,
                "submission notification sent"
            ),
            Err(error) => warn!(
                error = %error,
                form_id = %notification.form_id,
                submission_id = %notification.submission_id,
                "submission notification failed"
            ),
        }
    }
}
