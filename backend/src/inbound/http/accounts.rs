//! Account and session handlers.
//!
//! ```text
//! POST /api/v1/accounts {"username":"ravi_tow","email":"ravi@example.com",...}
//! POST /api/v1/login {"username":"ravi_tow","password":"Str0ng!pass"}
//! POST /api/v1/logout
//! GET  /api/v1/accounts/me
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use zeroize::Zeroizing;

use crate::domain::ports::{MechanicRegistration, RegisterAccountRequest};
use crate::domain::{AccountRole, Error, LoginCredentials, UnknownRoleError, field_error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::dto::AccountResponse;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Workshop details supplied when registering a mechanic account.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MechanicRegistrationBody {
    #[schema(example = "Speedy Motors")]
    pub service_centre_name: String,
    #[schema(example = "9876543210")]
    pub phone: String,
    #[schema(example = "14 Residency Road, Bengaluru")]
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub specialization: Option<String>,
}

impl From<MechanicRegistrationBody> for MechanicRegistration {
    fn from(value: MechanicRegistrationBody) -> Self {
        Self {
            service_centre_name: value.service_centre_name,
            phone: value.phone,
            address: value.address,
            latitude: value.latitude,
            longitude: value.longitude,
            specialization: value.specialization,
        }
    }
}

/// Request body for `POST /api/v1/accounts`.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAccountBody {
    #[schema(example = "ravi_tow")]
    pub username: String,
    #[schema(example = "ravi@example.com")]
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    /// `requester` or `mechanic`.
    #[schema(example = "mechanic")]
    pub role: String,
    /// Required when `role` is `mechanic`.
    pub mechanic: Option<MechanicRegistrationBody>,
}

impl TryFrom<RegisterAccountBody> for RegisterAccountRequest {
    type Error = Error;

    fn try_from(value: RegisterAccountBody) -> Result<Self, Self::Error> {
        let role = value
            .role
            .parse::<AccountRole>()
            .map_err(|err: UnknownRoleError| field_error("role", "invalid_role", err.to_string()))?;
        Ok(Self {
            username: value.username,
            email: value.email,
            password: Zeroizing::new(value.password),
            password_confirmation: Zeroizing::new(value.password_confirmation),
            role,
            mechanic: value.mechanic.map(MechanicRegistration::from),
        })
    }
}

/// Request body for `POST /api/v1/login`.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Principal established by a successful login.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[schema(value_type = String, format = "uuid")]
    pub account_id: String,
    #[schema(example = "requester")]
    pub role: String,
}

/// Register a requester or mechanic account.
#[utoipa::path(
    post,
    path = "/api/v1/accounts",
    request_body = RegisterAccountBody,
    responses(
        (status = 201, description = "Account created", body = AccountResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Username, email or phone already registered", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "registerAccount",
    security([])
)]
#[post("/accounts")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterAccountBody>,
) -> ApiResult<HttpResponse> {
    let request = RegisterAccountRequest::try_from(payload.into_inner())?;
    let profile = state.accounts.register(request).await?;
    Ok(HttpResponse::Created().json(AccountResponse::from(&profile)))
}

/// Authenticate and establish a session cookie.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = LoginResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<LoginResponse>> {
    let LoginRequest { username, password } = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(&username, &password)?;
    let principal = state.login.authenticate(&credentials).await?;
    session.persist_account(&principal.account_id)?;
    info!(account_id = %principal.account_id, role = %principal.role, "account logged in");
    Ok(web::Json(LoginResponse {
        account_id: principal.account_id.to_string(),
        role: principal.role.as_str().to_owned(),
    }))
}

/// End the current session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["accounts"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.purge();
    HttpResponse::NoContent().finish()
}

/// Current account with its mechanic profile, if any.
#[utoipa::path(
    get,
    path = "/api/v1/accounts/me",
    responses(
        (status = 200, description = "Current account", body = AccountResponse),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "Account no longer exists", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "currentAccount"
)]
#[get("/accounts/me")]
pub async fn me(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<AccountResponse>> {
    let account_id = session.require_account_id()?;
    let profile = state.accounts_query.profile(&account_id).await?;
    Ok(web::Json(AccountResponse::from(&profile)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::AccountProfile;
    use crate::domain::{AccountId, AuthenticatedAccount};
    use crate::inbound::http::test_utils::{
        MockPorts, account_fixture, mechanic_fixture, session_cookie, sign_in, test_app,
    };
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use mockall::predicate::always;
    use rstest::rstest;
    use serde_json::{Value, json};

    fn mechanic_body() -> Value {
        json!({
            "username": "ravi_tow",
            "email": "ravi@example.com",
            "password": "Str0ng!pass",
            "passwordConfirmation": "Str0ng!pass",
            "role": "mechanic",
            "mechanic": {
                "serviceCentreName": "Speedy Motors",
                "phone": "98765 43210",
                "address": "14 Residency Road, Bengaluru"
            }
        })
    }

    #[actix_web::test]
    async fn register_returns_created_profile() {
        let account = account_fixture(AccountRole::Mechanic);
        let mechanic = mechanic_fixture(account.id);
        let profile = AccountProfile {
            account,
            mechanic: Some(mechanic),
        };
        let mut ports = MockPorts::default();
        let returned = profile.clone();
        ports
            .accounts
            .expect_register()
            .withf(|request| {
                request.role == AccountRole::Mechanic
                    && request.password.as_str() == "Str0ng!pass"
                    && request
                        .mechanic
                        .as_ref()
                        .is_some_and(|m| m.phone == "98765 43210")
            })
            .times(1)
            .return_once(move |_| Ok(returned));
        let app = actix_test::init_service(test_app(ports.into_state())).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/accounts")
            .set_json(mechanic_body())
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["role"], "mechanic");
        assert_eq!(body["mechanic"]["serviceCentreName"], "Speedy Motors");
    }

    #[actix_web::test]
    async fn register_rejects_unknown_role_before_calling_the_service() {
        let mut ports = MockPorts::default();
        ports.accounts.expect_register().never();
        let app = actix_test::init_service(test_app(ports.into_state())).await;

        let mut body = mechanic_body();
        body["role"] = json!("admin");
        let request = actix_test::TestRequest::post()
            .uri("/api/v1/accounts")
            .set_json(body)
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["details"]["field"], "role");
        assert_eq!(body["details"]["code"], "invalid_role");
    }

    #[actix_web::test]
    async fn register_surfaces_duplicates_as_conflict() {
        let mut ports = MockPorts::default();
        ports
            .accounts
            .expect_register()
            .return_once(|_| Err(Error::conflict("username already registered")));
        let app = actix_test::init_service(test_app(ports.into_state())).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/accounts")
            .set_json(mechanic_body())
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[rstest]
    #[case("   ", "Str0ng!pass", "username")]
    #[case("ravi_tow", "", "password")]
    #[actix_web::test]
    async fn login_validates_before_authenticating(
        #[case] username: &str,
        #[case] password: &str,
        #[case] field: &str,
    ) {
        let mut ports = MockPorts::default();
        ports.login.expect_authenticate().never();
        let app = actix_test::init_service(test_app(ports.into_state())).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(LoginRequest {
                username: username.to_owned(),
                password: password.to_owned(),
            })
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["details"]["field"], field);
    }

    #[actix_web::test]
    async fn login_then_me_returns_the_profile() {
        let account = account_fixture(AccountRole::Requester);
        let account_id = account.id;
        let profile = AccountProfile {
            account,
            mechanic: None,
        };
        let mut ports = MockPorts::default();
        ports
            .login
            .expect_authenticate()
            .with(always())
            .return_once(move |_| {
                Ok(AuthenticatedAccount {
                    account_id,
                    role: AccountRole::Requester,
                })
            });
        ports
            .accounts_query
            .expect_profile()
            .withf(move |id| *id == account_id)
            .return_once(move |_| Ok(profile));
        let app = actix_test::init_service(test_app(ports.into_state())).await;

        let login_req = actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(LoginRequest {
                username: "asha_rao".to_owned(),
                password: "Str0ng!pass".to_owned(),
            })
            .to_request();
        let response = actix_test::call_service(&app, login_req).await;
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = session_cookie(&response);

        let me_req = actix_test::TestRequest::get()
            .uri("/api/v1/accounts/me")
            .cookie(cookie)
            .to_request();
        let response = actix_test::call_service(&app, me_req).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["id"], account_id.to_string());
        assert_eq!(body["mechanic"], Value::Null);
    }

    #[actix_web::test]
    async fn me_requires_a_session() {
        let app = actix_test::init_service(test_app(MockPorts::default().into_state())).await;

        let request = actix_test::TestRequest::get()
            .uri("/api/v1/accounts/me")
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn logout_clears_the_session() {
        let app = actix_test::init_service(test_app(MockPorts::default().into_state())).await;
        let cookie = sign_in(&app, AccountId::random()).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/logout")
            .cookie(cookie)
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(session_cookie(&response).value(), "");
    }
}
