//! Port abstraction for account persistence adapters and their errors.

use async_trait::async_trait;

use crate::domain::{Account, AccountId, Mechanic};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by account repository adapters.
    pub enum AccountRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "account repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "account repository query failed: {message}",
        /// A unique field already belongs to another account or mechanic.
        Duplicate { field: String } => "{field} is already registered",
    }
}

/// Account row plus the mechanic profile registered with it.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    pub account: Account,
    pub mechanic: Option<Mechanic>,
}

/// Storage for accounts and the mechanic profile created alongside them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Insert an account and, for mechanic accounts, its profile.
    ///
    /// Both rows are written in one transaction. Unique violations on
    /// username, email, or mechanic phone surface as
    /// [`AccountRepositoryError::Duplicate`] naming the offending field.
    async fn create(&self, new_account: &NewAccount) -> Result<(), AccountRepositoryError>;

    /// Fetch an account by identifier.
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountRepositoryError>;

    /// Fetch an account by exact username.
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Account>, AccountRepositoryError>;
}
