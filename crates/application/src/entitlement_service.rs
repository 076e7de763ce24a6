use std::sync::Arc;

use tracing::warn;

use formwell_core::AccountIdentity;
use formwell_domain::{EntitlementSnapshot, PRO_ENTITLEMENT};

use crate::billing_service::BillingGateway;

/// Resolves plan limits from the billing provider.
///
/// Every call asks the provider again; snapshots are never cached.
#[derive(Clone)]
pub struct EntitlementService {
    gateway: Arc<dyn BillingGateway>,
}

impl EntitlementService {
    /// Creates an entitlement resolver.
    #[must_use]
    pub fn new(gateway: Arc<dyn BillingGateway>) -> Self {
        Self { gateway }
    }

    /// Returns the account's current limits.
    ///
    /// Lookup failures resolve to the free tier, never to unlimited.
    pub async fn resolve_limits(&self, account: &AccountIdentity) -> EntitlementSnapshot {
        match self.gateway.has_entitlement(account, PRO_ENTITLEMENT).await {
            Ok(true) => EntitlementSnapshot::pro(),
            Ok(false) => EntitlementSnapshot::free_tier(),
            Err(error) => {
                warn!(
                    error = %error,
                    account_id = %account.account_id(),
                    "entitlement lookup failed, applying free tier limits"
                );
                EntitlementSnapshot::free_tier()
            }
        }
    }
}
