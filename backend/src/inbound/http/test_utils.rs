//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{
    Service, ServiceFactory, ServiceRequest as ActixServiceRequest, ServiceResponse,
};
use actix_web::{App, HttpResponse, test as actix_test, web};
use chrono::{DateTime, TimeZone, Utc};

use crate::domain::ports::{
    MockAccountsCommand, MockAccountsQuery, MockFeedbackCommand, MockLoginService,
    MockMechanicsCommand, MockMechanicsQuery, MockServiceRequestsCommand,
    MockServiceRequestsQuery,
};
use crate::domain::{
    Account, AccountId, AccountRole, Coordinates, EmailAddress, Error, Location, Mechanic,
    MechanicId, OwnerName, PasswordHash, PhoneNumber, SearchRadius, ServiceCentreName,
    ServiceRequest, ServiceRequestId, ServiceRequestStatus, ServiceType, Username, VehicleBrand,
    VehicleDescriptor, VehicleModel, VehicleNumber, VehicleType, VehicleYear,
};

use super::error::{json_error_handler, path_error_handler, query_error_handler};
use super::session::SessionContext;
use super::state::{HttpState, HttpStatePorts};
use super::{ApiResult, configure_api};

/// Session middleware with a throwaway key and an insecure `session` cookie.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Extract the `session` cookie set by a response.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie set")
}

async fn sign_in_as(session: SessionContext, id: web::Path<String>) -> ApiResult<HttpResponse> {
    let account_id = AccountId::new(id.as_str())
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    session.persist_account(&account_id)?;
    Ok(HttpResponse::NoContent().finish())
}

/// The full `/api/v1` surface over `state`, plus a `/test/sign-in/{id}` shortcut.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ActixServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .wrap(test_session_middleware())
        .route("/test/sign-in/{id}", web::post().to(sign_in_as))
        .service(web::scope("/api/v1").configure(configure_api))
}

/// Establish a session for `account_id` and return its cookie.
pub async fn sign_in(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    account_id: AccountId,
) -> Cookie<'static> {
    let request = actix_test::TestRequest::post()
        .uri(&format!("/test/sign-in/{account_id}"))
        .to_request();
    let response = actix_test::call_service(app, request).await;
    assert!(response.status().is_success(), "test sign-in failed");
    session_cookie(&response)
}

/// Mock doubles for every driving port; unset expectations panic.
#[derive(Default)]
pub struct MockPorts {
    pub login: MockLoginService,
    pub accounts: MockAccountsCommand,
    pub accounts_query: MockAccountsQuery,
    pub mechanics: MockMechanicsCommand,
    pub mechanics_query: MockMechanicsQuery,
    pub service_requests: MockServiceRequestsCommand,
    pub service_requests_query: MockServiceRequestsQuery,
    pub feedback: MockFeedbackCommand,
}

impl MockPorts {
    pub fn into_state(self) -> HttpState {
        HttpState::new(HttpStatePorts {
            login: Arc::new(self.login),
            accounts: Arc::new(self.accounts),
            accounts_query: Arc::new(self.accounts_query),
            mechanics: Arc::new(self.mechanics),
            mechanics_query: Arc::new(self.mechanics_query),
            service_requests: Arc::new(self.service_requests),
            service_requests_query: Arc::new(self.service_requests_query),
            feedback: Arc::new(self.feedback),
            default_radius: SearchRadius::default(),
        })
    }
}

pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

pub fn account_fixture(role: AccountRole) -> Account {
    Account {
        id: AccountId::random(),
        username: Username::parse("asha_rao").expect("username"),
        email: EmailAddress::parse("asha@example.com").expect("email"),
        role,
        password_hash: PasswordHash::new("$argon2id$v=19$m=8,t=1,p=1$c2FsdHNhbHQ$aGFzaA"),
        created_at: fixed_time(),
    }
}

pub fn mechanic_fixture(account_id: AccountId) -> Mechanic {
    Mechanic {
        id: MechanicId::random(),
        account_id,
        service_centre_name: ServiceCentreName::parse("Speedy Motors").expect("centre name"),
        phone: PhoneNumber::parse("9876543210").expect("phone"),
        address: Location::parse("14 Residency Road, Bengaluru").expect("address"),
        coordinates: Some(Coordinates::new(12.9716, 77.5946).expect("coordinates")),
        specialization: None,
        approved: true,
        available: true,
        created_at: fixed_time(),
    }
}

pub fn request_fixture(requester_id: AccountId, status: ServiceRequestStatus) -> ServiceRequest {
    ServiceRequest {
        id: ServiceRequestId::random(),
        requester_id,
        vehicle: VehicleDescriptor {
            vehicle_type: VehicleType::Car,
            brand: VehicleBrand::parse("Maruti").expect("brand"),
            model: VehicleModel::parse("Swift").expect("model"),
            year: VehicleYear::parse(2019, 2026).expect("year"),
            number: VehicleNumber::parse("KA 01 AB 1234").expect("number"),
        },
        owner_name: OwnerName::parse("Asha Rao").expect("owner"),
        phone: PhoneNumber::parse("9123456780").expect("phone"),
        location: Location::parse("12 MG Road, Bengaluru").expect("location"),
        coordinates: Some(Coordinates::new(12.9750, 77.6060).expect("coordinates")),
        service_type: ServiceType::Towing,
        status,
        mechanic_id: None,
        created_at: fixed_time(),
    }
}
