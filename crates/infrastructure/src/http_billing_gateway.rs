//! Billing provider client over HTTPS.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use formwell_application::{BillingGateway, BillingProduct, BillingSubscription};
use formwell_core::{AccountIdentity, AppError, AppResult};

/// Billing gateway backed by the provider's REST API.
///
/// Entitlements are read from
/// `GET {base}/accounts/{account_id}/entitlements/{flag}`, products from
/// `GET {base}/products` and subscriptions from
/// `GET {base}/accounts/{account_id}/subscriptions?status=active`.
#[derive(Clone)]
pub struct HttpBillingGateway {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpBillingGateway {
    /// Creates a gateway for the provider at `base_url`.
    #[must_use]
    pub fn new(http_client: reqwest::Client, base_url: impl Into<String>, api_key: String) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            api_key,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> AppResult<Option<T>> {
        let response = self
            .http_client
            .get(self.endpoint(path))
            .bearer_auth(self.api_key.as_str())
            .send()
            .await
            .map_err(|error| AppError::Internal(format!("billing request failed: {error}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AppError::Internal(format!(
                "billing provider returned status {status} for '{path}'"
            )));
        }

        response.json::<T>().await.map(Some).map_err(|error| {
            AppError::Internal(format!("failed to decode billing response: {error}"))
        })
    }
}

#[derive(Debug, Deserialize)]
struct EntitlementResponse {
    active: bool,
}

#[derive(Debug, Deserialize)]
struct ProductsResponse {
    #[serde(default)]
    products: Vec<BillingProduct>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionsResponse {
    #[serde(default)]
    subscriptions: Vec<BillingSubscription>,
}

#[async_trait]
impl BillingGateway for HttpBillingGateway {
    async fn has_entitlement(&self, account: &AccountIdentity, flag: &str) -> AppResult<bool> {
        let path = format!("accounts/{}/entitlements/{flag}", account.account_id());
        Ok(self
            .get_json::<EntitlementResponse>(path.as_str())
            .await?
            .is_some_and(|response| response.active))
    }

    async fn list_products(&self) -> AppResult<Vec<BillingProduct>> {
        Ok(self
            .get_json::<ProductsResponse>("products")
            .await?
            .map(|response| response.products)
            .unwrap_or_default())
    }

    async fn list_active_subscriptions(
        &self,
        account: &AccountIdentity,
    ) -> AppResult<Vec<BillingSubscription>> {
        let path = format!(
            "accounts/{}/subscriptions?status=active",
            account.account_id()
        );
        Ok(self
            .get_json::<SubscriptionsResponse>(path.as_str())
            .await?
            .map(|response| response.subscriptions)
            .unwrap_or_default())
    }
}
