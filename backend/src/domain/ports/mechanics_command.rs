//! Driving port for a mechanic managing their own profile.

use async_trait::async_trait;

use crate::domain::{AccountId, Error, Mechanic};

/// New address for a mechanic, optionally with explicit coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateLocationRequest {
    pub account_id: AccountId,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Domain use-case port for mechanic self-service.
///
/// Every operation resolves the mechanic from the acting account; requester
/// accounts receive `forbidden`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MechanicsCommand: Send + Sync {
    /// Start or stop taking work.
    async fn set_availability(
        &self,
        account_id: &AccountId,
        available: bool,
    ) -> Result<Mechanic, Error>;

    /// Replace the address, geocoding it when no coordinates are supplied.
    async fn update_location(&self, request: UpdateLocationRequest) -> Result<Mechanic, Error>;
}
