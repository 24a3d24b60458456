//! Driving port for submitting service requests and moving them through
//! their lifecycle.

use async_trait::async_trait;

use crate::domain::{AccountId, Error, MechanicId, ServiceRequest, ServiceRequestId};

/// Raw submission form.
///
/// Enumerations arrive as strings so an unknown value is reported as a
/// field error alongside the other validation rules.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitServiceRequest {
    pub requester_id: AccountId,
    pub vehicle_type: String,
    pub vehicle_brand: String,
    pub vehicle_model: String,
    pub vehicle_year: i32,
    pub vehicle_number: String,
    pub owner_name: String,
    pub phone: String,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub service_type: String,
}

/// Domain use-case port for request mutations.
///
/// Lifecycle operations return the updated request. Authorization failures
/// are `forbidden`; wrong status or a lost race is `conflict`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ServiceRequestsCommand: Send + Sync {
    /// Validate and store a new Pending request.
    async fn submit(&self, request: SubmitServiceRequest) -> Result<ServiceRequest, Error>;

    /// Owner picks a mechanic; the request stays Pending.
    async fn select(
        &self,
        actor: &AccountId,
        id: &ServiceRequestId,
        mechanic_id: &MechanicId,
    ) -> Result<ServiceRequest, Error>;

    /// Mechanic accepts the request.
    async fn accept(&self, actor: &AccountId, id: &ServiceRequestId)
    -> Result<ServiceRequest, Error>;

    /// Selected mechanic declines, reopening the request.
    async fn decline(
        &self,
        actor: &AccountId,
        id: &ServiceRequestId,
    ) -> Result<ServiceRequest, Error>;

    /// Assigned mechanic completes the request.
    async fn complete(
        &self,
        actor: &AccountId,
        id: &ServiceRequestId,
    ) -> Result<ServiceRequest, Error>;

    /// Owner cancels the request.
    async fn cancel(&self, actor: &AccountId, id: &ServiceRequestId)
    -> Result<ServiceRequest, Error>;
}
