//! Driving port for login.
//!
//! Inbound adapters call it to authenticate credentials without knowing the
//! backing store or hashing scheme.

use async_trait::async_trait;

use crate::domain::{AuthenticatedAccount, Error, LoginCredentials};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated principal.
    ///
    /// Unknown usernames and wrong passwords are indistinguishable
    /// `unauthorized` errors.
    async fn authenticate(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthenticatedAccount, Error>;
}
