//! Port abstraction for the mechanic directory.

use async_trait::async_trait;

use crate::domain::{AccountId, Coordinates, Location, Mechanic, MechanicId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by mechanic repository adapters.
    pub enum MechanicRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "mechanic repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "mechanic repository query failed: {message}",
    }
}

/// Read and update access to mechanic profiles.
///
/// Profiles are created with their account through
/// [`super::AccountRepository::create`] and never deleted.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MechanicRepository: Send + Sync {
    /// Fetch a profile by identifier.
    async fn find_by_id(&self, id: &MechanicId)
    -> Result<Option<Mechanic>, MechanicRepositoryError>;

    /// Fetch the profile owned by an account.
    async fn find_by_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Option<Mechanic>, MechanicRepositoryError>;

    /// Approved, available and located profiles in registration order.
    async fn list_searchable(&self) -> Result<Vec<Mechanic>, MechanicRepositoryError>;

    /// Set the availability flag, returning the updated profile.
    async fn set_availability(
        &self,
        id: &MechanicId,
        available: bool,
    ) -> Result<Option<Mechanic>, MechanicRepositoryError>;

    /// Replace the address and coordinates, returning the updated profile.
    async fn update_location(
        &self,
        id: &MechanicId,
        address: &Location,
        coordinates: Option<Coordinates>,
    ) -> Result<Option<Mechanic>, MechanicRepositoryError>;
}
