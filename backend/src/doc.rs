//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: every `/api/v1` handler plus the health probes
//! - **Schemas**: request and response bodies, and the mirrors of the domain
//!   error types ([`ErrorSchema`], [`ErrorCodeSchema`])
//! - **Security**: Session cookie authentication scheme
//!
//! The generated specification is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::accounts::{
    LoginRequest, LoginResponse, MechanicRegistrationBody, RegisterAccountBody,
};
use crate::inbound::http::dto::{
    AccountResponse, DashboardResponse, FeedbackResponse, HistoryEntryResponse,
    MechanicDetailResponse, MechanicMatchResponse, MechanicResponse, OpenRequestResponse,
    RatingResponse, ServiceRequestResponse,
};
use crate::inbound::http::feedback::FeedbackBody;
use crate::inbound::http::mechanics::{AvailabilityBody, LocationBody};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::service_requests::{SelectMechanicBody, SubmitServiceRequestBody};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Roadside assistance API",
        description = "Accounts, mechanic search, service request lifecycle and feedback."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::accounts::register,
        crate::inbound::http::accounts::login,
        crate::inbound::http::accounts::logout,
        crate::inbound::http::accounts::me,
        crate::inbound::http::mechanics::nearby,
        crate::inbound::http::mechanics::detail,
        crate::inbound::http::mechanics::set_availability,
        crate::inbound::http::mechanics::update_location,
        crate::inbound::http::mechanics::dashboard,
        crate::inbound::http::service_requests::submit,
        crate::inbound::http::service_requests::history,
        crate::inbound::http::service_requests::detail,
        crate::inbound::http::service_requests::nearby_mechanics,
        crate::inbound::http::service_requests::select,
        crate::inbound::http::service_requests::accept,
        crate::inbound::http::service_requests::decline,
        crate::inbound::http::service_requests::complete,
        crate::inbound::http::service_requests::cancel,
        crate::inbound::http::feedback::submit,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        RegisterAccountBody,
        MechanicRegistrationBody,
        LoginRequest,
        LoginResponse,
        AccountResponse,
        MechanicResponse,
        RatingResponse,
        MechanicMatchResponse,
        MechanicDetailResponse,
        AvailabilityBody,
        LocationBody,
        SubmitServiceRequestBody,
        SelectMechanicBody,
        ServiceRequestResponse,
        HistoryEntryResponse,
        OpenRequestResponse,
        DashboardResponse,
        FeedbackBody,
        FeedbackResponse,
    )),
    tags(
        (name = "accounts", description = "Registration and session management"),
        (name = "mechanics", description = "Mechanic search, profile upkeep and dashboard"),
        (name = "service-requests", description = "Service request submission and lifecycle"),
        (name = "feedback", description = "Ratings for completed requests"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
