//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`Geocoder`], [`PasswordHasher`]) are
//! implemented by outbound adapters. Driving ports (`*Command`, `*Query`,
//! [`LoginService`]) are implemented by domain services and consumed by the
//! HTTP adapter.

mod macros;
pub(crate) use macros::define_port_error;

mod account_repository;
mod accounts_command;
mod accounts_query;
mod feedback_command;
mod feedback_repository;
mod geocoder;
mod login_service;
mod mechanic_repository;
mod mechanics_command;
mod mechanics_query;
mod password_hasher;
mod service_request_repository;
mod service_requests_command;
mod service_requests_query;

#[cfg(test)]
pub use account_repository::MockAccountRepository;
pub use account_repository::{AccountRepository, AccountRepositoryError, NewAccount};
#[cfg(test)]
pub use accounts_command::MockAccountsCommand;
pub use accounts_command::{
    AccountProfile, AccountsCommand, MechanicRegistration, RegisterAccountRequest,
};
#[cfg(test)]
pub use accounts_query::MockAccountsQuery;
pub use accounts_query::AccountsQuery;
#[cfg(test)]
pub use feedback_command::MockFeedbackCommand;
pub use feedback_command::{FeedbackCommand, SubmitFeedbackRequest};
#[cfg(test)]
pub use feedback_repository::MockFeedbackRepository;
pub use feedback_repository::{FeedbackRepository, FeedbackRepositoryError};
#[cfg(test)]
pub use geocoder::MockGeocoder;
pub use geocoder::{DisabledGeocoder, Geocoder, GeocoderError};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
#[cfg(test)]
pub use mechanic_repository::MockMechanicRepository;
pub use mechanic_repository::{MechanicRepository, MechanicRepositoryError};
#[cfg(test)]
pub use mechanics_command::MockMechanicsCommand;
pub use mechanics_command::{MechanicsCommand, UpdateLocationRequest};
#[cfg(test)]
pub use mechanics_query::MockMechanicsQuery;
pub use mechanics_query::{MechanicDetail, MechanicMatch, MechanicsQuery};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHasher, PasswordHasherError};
#[cfg(test)]
pub use service_request_repository::MockServiceRequestRepository;
pub use service_request_repository::{ServiceRequestRepository, ServiceRequestRepositoryError};
#[cfg(test)]
pub use service_requests_command::MockServiceRequestsCommand;
pub use service_requests_command::{ServiceRequestsCommand, SubmitServiceRequest};
#[cfg(test)]
pub use service_requests_query::MockServiceRequestsQuery;
pub use service_requests_query::{
    MechanicDashboard, OpenRequest, RequestHistoryEntry, ServiceRequestsQuery,
};
