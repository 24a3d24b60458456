//! Mechanic directory and self-service handlers.
//!
//! ```text
//! GET /api/v1/mechanics/nearby?lat=12.97&lon=77.59&radiusKm=25
//! GET /api/v1/mechanics/{id}
//! PUT /api/v1/mechanics/me/availability {"available":false}
//! PUT /api/v1/mechanics/me/location {"address":"14 Residency Road, Bengaluru"}
//! GET /api/v1/mechanics/me/dashboard
//! ```

use actix_web::{get, put, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::UpdateLocationRequest;
use crate::domain::MechanicId;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::dto::{
    DashboardResponse, MechanicDetailResponse, MechanicMatchResponse, MechanicResponse,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id, required_origin};

/// Query string for an ad-hoc proximity search.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct NearbyQuery {
    /// Origin latitude in degrees.
    pub lat: Option<f64>,
    /// Origin longitude in degrees.
    pub lon: Option<f64>,
    /// Search radius; the server default applies when omitted.
    pub radius_km: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityBody {
    pub available: bool,
}

/// New workshop address; coordinates are geocoded when omitted.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationBody {
    #[schema(example = "14 Residency Road, Bengaluru")]
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Approved, available mechanics within the radius, nearest first.
#[utoipa::path(
    get,
    path = "/api/v1/mechanics/nearby",
    params(NearbyQuery),
    responses(
        (status = 200, description = "Matches ordered by distance", body = [MechanicMatchResponse]),
        (status = 400, description = "Missing or invalid origin or radius", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema)
    ),
    tags = ["mechanics"],
    operation_id = "nearbyMechanics"
)]
#[get("/mechanics/nearby")]
pub async fn nearby(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<NearbyQuery>,
) -> ApiResult<web::Json<Vec<MechanicMatchResponse>>> {
    session.require_account_id()?;
    let NearbyQuery {
        lat,
        lon,
        radius_km,
    } = query.into_inner();
    let origin = required_origin(lat, lon)?;
    let radius = state.radius_or_default(radius_km)?;
    let matches = state.mechanics_query.nearby(origin, radius).await?;
    Ok(web::Json(
        matches.iter().map(MechanicMatchResponse::from).collect(),
    ))
}

/// Mechanic profile with rating summary and received feedback.
#[utoipa::path(
    get,
    path = "/api/v1/mechanics/{id}",
    params(("id" = String, Path, description = "Mechanic id")),
    responses(
        (status = 200, description = "Mechanic detail", body = MechanicDetailResponse),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "Unknown mechanic", body = ErrorSchema)
    ),
    tags = ["mechanics"],
    operation_id = "mechanicDetail"
)]
#[get("/mechanics/{id}")]
pub async fn detail(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<MechanicDetailResponse>> {
    session.require_account_id()?;
    let id: MechanicId = parse_id(&path.into_inner(), FieldName::new("id"))?;
    let mechanic_detail = state.mechanics_query.detail(&id).await?;
    Ok(web::Json(MechanicDetailResponse::from(&mechanic_detail)))
}

/// Toggle whether the signed-in mechanic takes new requests.
#[utoipa::path(
    put,
    path = "/api/v1/mechanics/me/availability",
    request_body = AvailabilityBody,
    responses(
        (status = 200, description = "Updated profile", body = MechanicResponse),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Account has no mechanic profile", body = ErrorSchema)
    ),
    tags = ["mechanics"],
    operation_id = "setAvailability"
)]
#[put("/mechanics/me/availability")]
pub async fn set_availability(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<AvailabilityBody>,
) -> ApiResult<web::Json<MechanicResponse>> {
    let account_id = session.require_account_id()?;
    let mechanic = state
        .mechanics
        .set_availability(&account_id, payload.available)
        .await?;
    Ok(web::Json(MechanicResponse::from(&mechanic)))
}

/// Move the signed-in mechanic's workshop.
#[utoipa::path(
    put,
    path = "/api/v1/mechanics/me/location",
    request_body = LocationBody,
    responses(
        (status = 200, description = "Updated profile", body = MechanicResponse),
        (status = 400, description = "Invalid address or coordinates", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Account has no mechanic profile", body = ErrorSchema)
    ),
    tags = ["mechanics"],
    operation_id = "updateLocation"
)]
#[put("/mechanics/me/location")]
pub async fn update_location(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LocationBody>,
) -> ApiResult<web::Json<MechanicResponse>> {
    let account_id = session.require_account_id()?;
    let LocationBody {
        address,
        latitude,
        longitude,
    } = payload.into_inner();
    let mechanic = state
        .mechanics
        .update_location(UpdateLocationRequest {
            account_id,
            address,
            latitude,
            longitude,
        })
        .await?;
    Ok(web::Json(MechanicResponse::from(&mechanic)))
}

/// Selected, open, accepted and completed work plus the mechanic's rating.
#[utoipa::path(
    get,
    path = "/api/v1/mechanics/me/dashboard",
    responses(
        (status = 200, description = "Dashboard", body = DashboardResponse),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Account has no mechanic profile", body = ErrorSchema)
    ),
    tags = ["mechanics"],
    operation_id = "mechanicDashboard"
)]
#[get("/mechanics/me/dashboard")]
pub async fn dashboard(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<DashboardResponse>> {
    let account_id = session.require_account_id()?;
    let summary = state.service_requests_query.dashboard(&account_id).await?;
    Ok(web::Json(DashboardResponse::from(&summary)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MechanicDashboard, MechanicDetail, MechanicMatch, OpenRequest};
    use crate::domain::{AccountId, Error, RatingSummary, ServiceRequestStatus};
    use crate::inbound::http::test_utils::{
        MockPorts, mechanic_fixture, request_fixture, sign_in, test_app,
    };
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn nearby_uses_default_radius_and_keeps_order() {
        let near = mechanic_fixture(AccountId::random());
        let far = mechanic_fixture(AccountId::random());
        let matches = vec![
            MechanicMatch {
                mechanic: near.clone(),
                distance_km: 1.2,
                rating: RatingSummary {
                    average: 4.5,
                    count: 2,
                },
            },
            MechanicMatch {
                mechanic: far,
                distance_km: 8.4,
                rating: RatingSummary::default(),
            },
        ];
        let mut ports = MockPorts::default();
        ports
            .mechanics_query
            .expect_nearby()
            .withf(|origin, radius| origin.latitude() == 12.97 && radius.km() == 50.0)
            .return_once(move |_, _| Ok(matches));
        let app = actix_test::init_service(test_app(ports.into_state())).await;
        let cookie = sign_in(&app, AccountId::random()).await;

        let request = actix_test::TestRequest::get()
            .uri("/api/v1/mechanics/nearby?lat=12.97&lon=77.59")
            .cookie(cookie)
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Vec<Value> = actix_test::read_body_json(response).await;
        assert_eq!(body.len(), 2);
        assert_eq!(body[0]["mechanic"]["id"], near.id.to_string());
        assert_eq!(body[0]["rating"]["average"], 4.5);
    }

    #[rstest]
    #[case::missing_longitude("lat=12.97", "lon")]
    #[case::negative_radius("lat=12.97&lon=77.59&radiusKm=-5", "radiusKm")]
    #[actix_web::test]
    async fn nearby_rejects_bad_queries(#[case] query: &str, #[case] field: &str) {
        let app = actix_test::init_service(test_app(MockPorts::default().into_state())).await;
        let cookie = sign_in(&app, AccountId::random()).await;

        let request = actix_test::TestRequest::get()
            .uri(&format!("/api/v1/mechanics/nearby?{query}"))
            .cookie(cookie)
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["details"]["field"], field);
    }

    #[actix_web::test]
    async fn detail_rejects_malformed_ids() {
        let app = actix_test::init_service(test_app(MockPorts::default().into_state())).await;
        let cookie = sign_in(&app, AccountId::random()).await;

        let request = actix_test::TestRequest::get()
            .uri("/api/v1/mechanics/not-a-uuid")
            .cookie(cookie)
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["details"]["code"], "invalid_uuid");
    }

    #[actix_web::test]
    async fn detail_returns_feedback_and_rating() {
        let mechanic = mechanic_fixture(AccountId::random());
        let id = mechanic.id;
        let mut ports = MockPorts::default();
        ports
            .mechanics_query
            .expect_detail()
            .withf(move |requested| *requested == id)
            .return_once(move |_| {
                Ok(MechanicDetail {
                    mechanic,
                    rating: RatingSummary {
                        average: 4.0,
                        count: 3,
                    },
                    feedback: Vec::new(),
                })
            });
        let app = actix_test::init_service(test_app(ports.into_state())).await;
        let cookie = sign_in(&app, AccountId::random()).await;

        let request = actix_test::TestRequest::get()
            .uri(&format!("/api/v1/mechanics/{id}"))
            .cookie(cookie)
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["rating"], json!({"average": 4.0, "count": 3}));
        assert_eq!(body["feedback"], json!([]));
    }

    #[actix_web::test]
    async fn availability_is_forwarded_for_the_session_account() {
        let account_id = AccountId::random();
        let mut mechanic = mechanic_fixture(account_id);
        mechanic.available = false;
        let mut ports = MockPorts::default();
        ports
            .mechanics
            .expect_set_availability()
            .withf(move |id, available| *id == account_id && !*available)
            .return_once(move |_, _| Ok(mechanic));
        let app = actix_test::init_service(test_app(ports.into_state())).await;
        let cookie = sign_in(&app, account_id).await;

        let request = actix_test::TestRequest::put()
            .uri("/api/v1/mechanics/me/availability")
            .cookie(cookie)
            .set_json(AvailabilityBody { available: false })
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["available"], false);
    }

    #[actix_web::test]
    async fn requester_cannot_update_location() {
        let mut ports = MockPorts::default();
        ports
            .mechanics
            .expect_update_location()
            .return_once(|_| Err(Error::forbidden("account has no mechanic profile")));
        let app = actix_test::init_service(test_app(ports.into_state())).await;
        let cookie = sign_in(&app, AccountId::random()).await;

        let request = actix_test::TestRequest::put()
            .uri("/api/v1/mechanics/me/location")
            .cookie(cookie)
            .set_json(json!({"address": "22 Brigade Road, Bengaluru"}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn dashboard_groups_requests() {
        let account_id = AccountId::random();
        let mechanic = mechanic_fixture(account_id);
        let open = request_fixture(AccountId::random(), ServiceRequestStatus::Pending);
        let accepted = request_fixture(AccountId::random(), ServiceRequestStatus::Accepted);
        let stored_dashboard = MechanicDashboard {
            mechanic,
            rating: RatingSummary::default(),
            selected: Vec::new(),
            open: vec![OpenRequest {
                request: open,
                distance_km: Some(0.8),
            }],
            accepted: vec![accepted],
            completed: Vec::new(),
        };
        let mut ports = MockPorts::default();
        ports
            .service_requests_query
            .expect_dashboard()
            .return_once(move |_| Ok(stored_dashboard));
        let app = actix_test::init_service(test_app(ports.into_state())).await;
        let cookie = sign_in(&app, account_id).await;

        let request = actix_test::TestRequest::get()
            .uri("/api/v1/mechanics/me/dashboard")
            .cookie(cookie)
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["open"][0]["distanceKm"], 0.8);
        assert_eq!(body["accepted"][0]["status"], "accepted");
        assert_eq!(body["selected"], json!([]));
    }
}
