//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data`, so they depend only on the
//! driving ports and stay testable with mocks.

use std::sync::Arc;

use crate::domain::{Error, SearchRadius};
use crate::domain::ports::{
    AccountsCommand, AccountsQuery, FeedbackCommand, LoginService, MechanicsCommand,
    MechanicsQuery, ServiceRequestsCommand, ServiceRequestsQuery,
};

/// Parameter object bundling the port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub accounts: Arc<dyn AccountsCommand>,
    pub accounts_query: Arc<dyn AccountsQuery>,
    pub mechanics: Arc<dyn MechanicsCommand>,
    pub mechanics_query: Arc<dyn MechanicsQuery>,
    pub service_requests: Arc<dyn ServiceRequestsCommand>,
    pub service_requests_query: Arc<dyn ServiceRequestsQuery>,
    pub feedback: Arc<dyn FeedbackCommand>,
    pub default_radius: SearchRadius,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub accounts: Arc<dyn AccountsCommand>,
    pub accounts_query: Arc<dyn AccountsQuery>,
    pub mechanics: Arc<dyn MechanicsCommand>,
    pub mechanics_query: Arc<dyn MechanicsQuery>,
    pub service_requests: Arc<dyn ServiceRequestsCommand>,
    pub service_requests_query: Arc<dyn ServiceRequestsQuery>,
    pub feedback: Arc<dyn FeedbackCommand>,
    /// Radius used when a search omits `radiusKm`.
    pub default_radius: SearchRadius,
}

impl HttpState {
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            login,
            accounts,
            accounts_query,
            mechanics,
            mechanics_query,
            service_requests,
            service_requests_query,
            feedback,
            default_radius,
        } = ports;
        Self {
            login,
            accounts,
            accounts_query,
            mechanics,
            mechanics_query,
            service_requests,
            service_requests_query,
            feedback,
            default_radius,
        }
    }

    /// Resolve an optional client radius against the configured default.
    pub fn radius_or_default(&self, radius_km: Option<f64>) -> Result<SearchRadius, Error> {
        radius_km
            .map(SearchRadius::new)
            .transpose()
            .map(|radius| radius.unwrap_or(self.default_radius))
            .map_err(Into::into)
    }
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}
