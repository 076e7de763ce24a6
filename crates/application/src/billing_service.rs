use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use formwell_core::{AccountIdentity, AppResult};

/// Purchasable plan as listed by the billing provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingProduct {
    /// Provider product id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Marketing description.
    #[serde(default)]
    pub description: Option<String>,
    /// Price in minor currency units.
    #[serde(default)]
    pub unit_amount: Option<i64>,
    /// ISO currency code.
    #[serde(default)]
    pub currency: Option<String>,
    /// Billing interval such as `month`.
    #[serde(default)]
    pub interval: Option<String>,
}

/// Active subscription of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingSubscription {
    /// Provider subscription id.
    pub id: String,
    /// Subscribed product id.
    pub product_id: String,
    /// Provider status label.
    pub status: String,
}

/// Port for the external billing provider.
#[async_trait]
pub trait BillingGateway: Send + Sync {
    /// Returns whether the account currently holds the named entitlement flag.
    async fn has_entitlement(&self, account: &AccountIdentity, flag: &str) -> AppResult<bool>;

    /// Lists purchasable products.
    async fn list_products(&self) -> AppResult<Vec<BillingProduct>>;

    /// Lists the account's active subscriptions.
    async fn list_active_subscriptions(
        &self,
        account: &AccountIdentity,
    ) -> AppResult<Vec<BillingSubscription>>;
}

/// Products plus the plan the account is on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingOverview {
    /// Purchasable products.
    pub products: Vec<BillingProduct>,
    /// Product of the first active subscription.
    pub current_product_id: Option<String>,
}

/// Application service backing the pricing page.
#[derive(Clone)]
pub struct BillingService {
    gateway: Arc<dyn BillingGateway>,
}

impl BillingService {
    /// Creates a billing service.
    #[must_use]
    pub fn new(gateway: Arc<dyn BillingGateway>) -> Self {
        Self { gateway }
    }

    /// Loads the product catalogue and the caller's current product.
    ///
    /// A failed product listing is an error; a failed subscription lookup
    /// only hides the current-plan marker.
    pub async fn pricing(&self, actor: &AccountIdentity) -> AppResult<PricingOverview> {
        let products = self.gateway.list_products().await?;

        let current_product_id = match self.gateway.list_active_subscriptions(actor).await {
            Ok(subscriptions) => subscriptions
                .into_iter()
                .next()
                .map(|subscription| subscription.product_id),
            Err(error) => {
                warn!(
                    error = %error,
                    account_id = %actor.account_id(),
                    "failed to load active subscriptions"
                );
                None
            }
        };

        Ok(PricingOverview {
            products,
            current_product_id,
        })
    }
}
