//! Driving port for reading service requests.

use async_trait::async_trait;

use crate::domain::{
    AccountId, Error, Feedback, Mechanic, RatingSummary, SearchRadius, ServiceRequest,
    ServiceRequestId,
};

use super::MechanicMatch;

/// One row of a requester's history.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestHistoryEntry {
    pub request: ServiceRequest,
    pub mechanic: Option<Mechanic>,
    pub can_give_feedback: bool,
    pub feedback: Option<Feedback>,
}

/// Open request as seen by a mechanic, with distance when both are located.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenRequest {
    pub request: ServiceRequest,
    pub distance_km: Option<f64>,
}

/// Work queue and rating for the signed-in mechanic.
#[derive(Debug, Clone, PartialEq)]
pub struct MechanicDashboard {
    pub mechanic: Mechanic,
    pub rating: RatingSummary,
    /// Pending requests whose owner selected this mechanic.
    pub selected: Vec<ServiceRequest>,
    /// Pending requests nobody has been selected for, nearest first.
    pub open: Vec<OpenRequest>,
    pub accepted: Vec<ServiceRequest>,
    pub completed: Vec<ServiceRequest>,
}

/// Domain use-case port for request reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ServiceRequestsQuery: Send + Sync {
    /// Requests submitted by `actor`, newest first.
    async fn history(&self, actor: &AccountId) -> Result<Vec<RequestHistoryEntry>, Error>;

    /// One request, visible to its owner, its selected or assigned mechanic,
    /// and any approved mechanic while it is open.
    async fn detail(&self, actor: &AccountId, id: &ServiceRequestId)
    -> Result<ServiceRequest, Error>;

    /// Mechanics near the request's stored coordinates. Owner only.
    async fn nearby_mechanics(
        &self,
        actor: &AccountId,
        id: &ServiceRequestId,
        radius: SearchRadius,
    ) -> Result<Vec<MechanicMatch>, Error>;

    /// Dashboard for the mechanic behind `actor`.
    async fn dashboard(&self, actor: &AccountId) -> Result<MechanicDashboard, Error>;
}
