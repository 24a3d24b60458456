//! Domain primitives, aggregates and services.
//!
//! Purpose: define the strongly typed roadside-assistance model shared by the
//! HTTP and persistence adapters, plus the services that implement the
//! driving ports in [`ports`].
//!
//! Public surface:
//! - [`distance_km`] and [`find_nearby`]: great-circle distance and
//!   proximity ranking.
//! - [`ServiceRequest`]: request record and its lifecycle planning.
//! - [`Feedback`] and [`RatingTotals`]: the feedback ledger and aggregation.
//! - [`Error`] and [`ErrorCode`]: transport-agnostic failures.

pub mod account;
pub mod account_service;
pub mod auth;
pub mod error;
pub mod feedback;
pub mod feedback_service;
pub mod geo;
pub mod identifiers;
pub mod mechanic;
pub mod mechanic_service;
pub mod ports;
pub mod proximity;
pub mod service_request;
pub mod service_request_service;
mod service_support;
#[cfg(test)]
mod service_test_support;
pub mod trace_id;
pub mod validation;

pub use self::account::{Account, AccountRole, PasswordHash, UnknownRoleError};
pub use self::account_service::AccountService;
pub use self::auth::{AuthenticatedAccount, LoginCredentials, LoginValidationError};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::feedback::{
    COMMENT_MAX, Feedback, FeedbackComment, FeedbackPolicy, FeedbackValidationError, RATING_MAX,
    RATING_MIN, Rating, RatingSummary, RatingTotals, average_rating,
};
pub use self::feedback_service::FeedbackService;
pub use self::geo::{
    Coordinates, DEFAULT_SEARCH_RADIUS_KM, EARTH_RADIUS_KM, GeoValidationError,
    MAX_SEARCH_RADIUS_KM, SearchRadius, distance_km,
};
pub use self::identifiers::{AccountId, FeedbackId, IdentifierError, MechanicId, ServiceRequestId};
pub use self::mechanic::Mechanic;
pub use self::mechanic_service::MechanicService;
pub use self::proximity::{NearbyMechanic, find_nearby};
pub use self::service_request::{
    LifecycleAction, LifecycleError, RequestChange, ServiceRequest, ServiceRequestStatus,
    ServiceType, Transition, UnknownVariantError, UpdateGuard, VehicleDescriptor, VehicleType,
};
pub use self::service_request_service::ServiceRequestService;
pub use self::trace_id::TraceId;
pub use self::validation::{
    EmailAddress, Location, NewPassword, OwnerName, PhoneNumber, ServiceCentreName,
    Specialization, Username, ValidationError, VehicleBrand, VehicleModel, VehicleNumber,
    VehicleYear, field_error,
};
