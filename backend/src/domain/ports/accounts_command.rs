//! Driving port for account registration.
//!
//! Registration accepts raw form values; the implementation validates every
//! field through [`crate::domain::validation`] before anything is written.

use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::domain::{Account, AccountRole, Error, Mechanic};

/// Mechanic-specific registration fields.
#[derive(Debug, Clone, PartialEq)]
pub struct MechanicRegistration {
    pub service_centre_name: String,
    pub phone: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub specialization: Option<String>,
}

/// Raw registration form.
#[derive(Clone)]
pub struct RegisterAccountRequest {
    pub username: String,
    pub email: String,
    pub password: Zeroizing<String>,
    pub password_confirmation: Zeroizing<String>,
    pub role: AccountRole,
    /// Required when `role` is [`AccountRole::Mechanic`], rejected otherwise.
    pub mechanic: Option<MechanicRegistration>,
}

impl std::fmt::Debug for RegisterAccountRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterAccountRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("mechanic", &self.mechanic)
            .finish_non_exhaustive()
    }
}

/// An account together with its mechanic profile, if it has one.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountProfile {
    pub account: Account,
    pub mechanic: Option<Mechanic>,
}

/// Domain use-case port for creating accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountsCommand: Send + Sync {
    /// Validate the form, hash the password and store the account.
    ///
    /// # Errors
    ///
    /// - `invalid_request` with `{ field, code }` details for any rule
    ///   violation.
    /// - `conflict` when username, email or phone is already registered.
    async fn register(&self, request: RegisterAccountRequest) -> Result<AccountProfile, Error>;
}
