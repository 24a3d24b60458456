//! Port abstraction for service request persistence.

use async_trait::async_trait;

use crate::domain::{
    AccountId, MechanicId, RequestChange, ServiceRequest, ServiceRequestId, UpdateGuard,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by service request repository adapters.
    pub enum ServiceRequestRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "service request repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "service request repository query failed: {message}",
    }
}

/// Storage for service requests.
///
/// # Transitions
///
/// [`ServiceRequestRepository::transition`] is the only way status and
/// mechanic change after insertion. Implementations must apply it
/// atomically: the write happens only if the stored `(status, mechanic)`
/// still equals the guard, and `None` is returned otherwise.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ServiceRequestRepository: Send + Sync {
    /// Insert a freshly submitted request.
    async fn insert(&self, request: &ServiceRequest) -> Result<(), ServiceRequestRepositoryError>;

    /// Fetch a request by identifier.
    async fn find_by_id(
        &self,
        id: &ServiceRequestId,
    ) -> Result<Option<ServiceRequest>, ServiceRequestRepositoryError>;

    /// Requests submitted by an account, newest first.
    async fn list_by_requester(
        &self,
        requester_id: &AccountId,
    ) -> Result<Vec<ServiceRequest>, ServiceRequestRepositoryError>;

    /// Requests selected for or assigned to a mechanic, newest first.
    async fn list_by_mechanic(
        &self,
        mechanic_id: &MechanicId,
    ) -> Result<Vec<ServiceRequest>, ServiceRequestRepositoryError>;

    /// Pending requests with no mechanic selected, newest first.
    async fn list_open(&self) -> Result<Vec<ServiceRequest>, ServiceRequestRepositoryError>;

    /// Compare-and-swap the `(status, mechanic)` pair.
    ///
    /// Returns the updated request, or `None` when the request is missing or
    /// its stored state no longer matches `guard`.
    async fn transition(
        &self,
        id: &ServiceRequestId,
        guard: &UpdateGuard,
        change: &RequestChange,
    ) -> Result<Option<ServiceRequest>, ServiceRequestRepositoryError>;
}
