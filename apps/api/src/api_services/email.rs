use std::sync::Arc;

use formwell_application::EmailService;
use formwell_infrastructure::{HttpEmailConfig, HttpEmailService, LoggingEmailService};
use tracing::info;

use crate::api_config::{ApiConfig, EmailProviderConfig};

pub(super) fn build_email_service(
    config: &ApiConfig,
    http_client: reqwest::Client,
) -> Arc<dyn EmailService> {
    match &config.email_provider {
        EmailProviderConfig::Logging => {
            info!("EMAIL_API_KEY is not set, submission notifications will only be logged");
            Arc::new(LoggingEmailService::new())
        }
        EmailProviderConfig::Http(email) => Arc::new(HttpEmailService::new(
            http_client,
            HttpEmailConfig {
                api_url: email.api_url.clone(),
                api_key: email.api_key.clone(),
                from_address: email.from_address.clone(),
            },
        )),
    }
}
