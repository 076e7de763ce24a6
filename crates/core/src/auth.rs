use serde::{Deserialize, Serialize};

use crate::AccountId;

/// Authenticated account identity forwarded by the gateway.
///
/// Every owner-scoped operation takes this explicitly; nothing reads an
/// ambient session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountIdentity {
    account_id: AccountId,
    email: Option<String>,
}

impl AccountIdentity {
    /// Creates an account identity.
    #[must_use]
    pub fn new(account_id: AccountId, email: Option<String>) -> Self {
        Self {
            account_id,
            email: email.filter(|value| !value.trim().is_empty()),
        }
    }

    /// Returns the account identifier.
    #[must_use]
    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    /// Returns the account email, if the gateway forwarded one.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}
