use std::sync::Arc;

use formwell_application::BillingGateway;
use formwell_infrastructure::{HttpBillingGateway, StaticBillingGateway};
use tracing::info;

use crate::api_config::{ApiConfig, BillingProviderConfig};

pub(super) fn build_billing_gateway(
    config: &ApiConfig,
    http_client: reqwest::Client,
) -> Arc<dyn BillingGateway> {
    match &config.billing_provider {
        BillingProviderConfig::Static { pro_accounts } => {
            info!(
                pro_accounts = pro_accounts.len(),
                "using static billing gateway"
            );
            Arc::new(StaticBillingGateway::new(pro_accounts.iter().copied()))
        }
        BillingProviderConfig::Http { base_url, api_key } => Arc::new(HttpBillingGateway::new(
            http_client,
            base_url.as_str(),
            api_key.clone(),
        )),
    }
}
