use std::collections::HashSet;

use async_trait::async_trait;

use formwell_application::{BillingGateway, BillingProduct, BillingSubscription};
use formwell_core::{AccountId, AccountIdentity, AppResult};
use formwell_domain::PRO_ENTITLEMENT;

/// Product id of the paid plan in the static catalogue.
pub const STATIC_PRO_PRODUCT_ID: &str = "formwell_pro";

/// Billing gateway with a fixed list of paying accounts.
///
/// Used for local development and self-hosted installs without a billing
/// provider.
#[derive(Debug, Clone, Default)]
pub struct StaticBillingGateway {
    pro_accounts: HashSet<AccountId>,
}

impl StaticBillingGateway {
    /// Creates a gateway granting the paid plan to `pro_accounts`.
    #[must_use]
    pub fn new(pro_accounts: impl IntoIterator<Item = AccountId>) -> Self {
        Self {
            pro_accounts: pro_accounts.into_iter().collect(),
        }
    }

    fn is_pro(&self, account: &AccountIdentity) -> bool {
        self.pro_accounts.contains(&account.account_id())
    }
}

#[async_trait]
impl BillingGateway for StaticBillingGateway {
    async fn has_entitlement(&self, account: &AccountIdentity, flag: &str) -> AppResult<bool> {
        Ok(flag == PRO_ENTITLEMENT && self.is_pro(account))
    }

    async fn list_products(&self) -> AppResult<Vec<BillingProduct>> {
        Ok(vec![BillingProduct {
            id: STATIC_PRO_PRODUCT_ID.to_owned(),
            name: "Pro".to_owned(),
            description: Some(
                "Unlimited forms, unlimited submissions and email notifications".to_owned(),
            ),
            unit_amount: Some(900),
            currency: Some("gbp".to_owned()),
            interval: Some("month".to_owned()),
        }])
    }

    async fn list_active_subscriptions(
        &self,
        account: &AccountIdentity,
    ) -> AppResult<Vec<BillingSubscription>> {
        if !self.is_pro(account) {
            return Ok(Vec::new());
        }

        Ok(vec![BillingSubscription {
            id: format!("static_{}", account.account_id()),
            product_id: STATIC_PRO_PRODUCT_ID.to_owned(),
            status: "active".to_owned(),
        }])
    }
}
