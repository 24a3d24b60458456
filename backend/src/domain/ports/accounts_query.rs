//! Driving port for reading the signed-in account.

use async_trait::async_trait;

use crate::domain::{AccountId, Error};

use super::AccountProfile;

/// Domain use-case port for account lookups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountsQuery: Send + Sync {
    /// Account and mechanic profile for `account_id`.
    ///
    /// Returns `unauthorized` if the account no longer exists, since callers
    /// only know the id from a session.
    async fn profile(&self, account_id: &AccountId) -> Result<AccountProfile, Error>;
}
