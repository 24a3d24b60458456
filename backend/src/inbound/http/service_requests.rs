//! Service request handlers: submission, history and lifecycle actions.
//!
//! ```text
//! POST /api/v1/service-requests {"vehicleType":"car",...}
//! GET  /api/v1/service-requests
//! GET  /api/v1/service-requests/{id}
//! GET  /api/v1/service-requests/{id}/nearby-mechanics?radiusKm=25
//! POST /api/v1/service-requests/{id}/select {"mechanicId":"..."}
//! POST /api/v1/service-requests/{id}/{accept|decline|complete|cancel}
//! ```
//!
//! Lifecycle actions answer `409 Conflict` when the request is no longer in
//! the state the action needs, including when a concurrent update won.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::SubmitServiceRequest;
use crate::domain::{AccountId, Error, MechanicId, ServiceRequest, ServiceRequestId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::dto::{
    HistoryEntryResponse, MechanicMatchResponse, ServiceRequestResponse,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

/// Request body for `POST /api/v1/service-requests`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitServiceRequestBody {
    /// `car` or `bike`.
    #[schema(example = "car")]
    pub vehicle_type: String,
    #[schema(example = "Maruti")]
    pub vehicle_brand: String,
    #[schema(example = "Swift")]
    pub vehicle_model: String,
    #[schema(example = 2019)]
    pub vehicle_year: i32,
    #[schema(example = "KA 01 AB 1234")]
    pub vehicle_number: String,
    #[schema(example = "Asha Rao")]
    pub owner_name: String,
    #[schema(example = "9123456780")]
    pub phone: String,
    #[schema(example = "12 MG Road, Bengaluru")]
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// `towing`, `fuel`, `battery`, `tire` or `other`.
    #[schema(example = "towing")]
    pub service_type: String,
}

impl SubmitServiceRequestBody {
    fn into_command(self, requester_id: AccountId) -> SubmitServiceRequest {
        SubmitServiceRequest {
            requester_id,
            vehicle_type: self.vehicle_type,
            vehicle_brand: self.vehicle_brand,
            vehicle_model: self.vehicle_model,
            vehicle_year: self.vehicle_year,
            vehicle_number: self.vehicle_number,
            owner_name: self.owner_name,
            phone: self.phone,
            location: self.location,
            latitude: self.latitude,
            longitude: self.longitude,
            service_type: self.service_type,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectMechanicBody {
    #[schema(value_type = String, format = "uuid")]
    pub mechanic_id: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct RadiusQuery {
    /// Search radius; the server default applies when omitted.
    pub radius_km: Option<f64>,
}

fn request_id(path: web::Path<String>) -> Result<ServiceRequestId, Error> {
    parse_id(&path.into_inner(), FieldName::new("id"))
}

fn respond(request: &ServiceRequest) -> web::Json<ServiceRequestResponse> {
    web::Json(ServiceRequestResponse::from(request))
}

/// Submit a roadside assistance request.
#[utoipa::path(
    post,
    path = "/api/v1/service-requests",
    request_body = SubmitServiceRequestBody,
    responses(
        (status = 201, description = "Request created in pending state", body = ServiceRequestResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Mechanic accounts cannot submit requests", body = ErrorSchema)
    ),
    tags = ["service-requests"],
    operation_id = "submitServiceRequest"
)]
#[post("/service-requests")]
pub async fn submit(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SubmitServiceRequestBody>,
) -> ApiResult<HttpResponse> {
    let requester_id = session.require_account_id()?;
    let created = state
        .service_requests
        .submit(payload.into_inner().into_command(requester_id))
        .await?;
    info!(request_id = %created.id, %requester_id, "service request submitted");
    Ok(HttpResponse::Created().json(ServiceRequestResponse::from(&created)))
}

/// The requester's own requests, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/service-requests",
    responses(
        (status = 200, description = "Request history", body = [HistoryEntryResponse]),
        (status = 401, description = "Login required", body = ErrorSchema)
    ),
    tags = ["service-requests"],
    operation_id = "serviceRequestHistory"
)]
#[get("/service-requests")]
pub async fn history(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<HistoryEntryResponse>>> {
    let account_id = session.require_account_id()?;
    let entries = state.service_requests_query.history(&account_id).await?;
    Ok(web::Json(
        entries.iter().map(HistoryEntryResponse::from).collect(),
    ))
}

/// A single request visible to its owner or a related mechanic.
#[utoipa::path(
    get,
    path = "/api/v1/service-requests/{id}",
    params(("id" = String, Path, description = "Service request id")),
    responses(
        (status = 200, description = "Service request", body = ServiceRequestResponse),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Not visible to this account", body = ErrorSchema),
        (status = 404, description = "Unknown request", body = ErrorSchema)
    ),
    tags = ["service-requests"],
    operation_id = "serviceRequestDetail"
)]
#[get("/service-requests/{id}")]
pub async fn detail(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<ServiceRequestResponse>> {
    let actor = session.require_account_id()?;
    let id = request_id(path)?;
    let request = state.service_requests_query.detail(&actor, &id).await?;
    Ok(respond(&request))
}

/// Mechanics near the request's own coordinates.
#[utoipa::path(
    get,
    path = "/api/v1/service-requests/{id}/nearby-mechanics",
    params(("id" = String, Path, description = "Service request id"), RadiusQuery),
    responses(
        (status = 200, description = "Matches ordered by distance", body = [MechanicMatchResponse]),
        (status = 400, description = "Request has no coordinates or radius is invalid", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Not the request owner", body = ErrorSchema),
        (status = 404, description = "Unknown request", body = ErrorSchema)
    ),
    tags = ["service-requests"],
    operation_id = "serviceRequestNearbyMechanics"
)]
#[get("/service-requests/{id}/nearby-mechanics")]
pub async fn nearby_mechanics(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    query: web::Query<RadiusQuery>,
) -> ApiResult<web::Json<Vec<MechanicMatchResponse>>> {
    let actor = session.require_account_id()?;
    let id = request_id(path)?;
    let radius = state.radius_or_default(query.radius_km)?;
    let matches = state
        .service_requests_query
        .nearby_mechanics(&actor, &id, radius)
        .await?;
    Ok(web::Json(
        matches.iter().map(MechanicMatchResponse::from).collect(),
    ))
}

/// Owner picks a mechanic for a pending request.
#[utoipa::path(
    post,
    path = "/api/v1/service-requests/{id}/select",
    params(("id" = String, Path, description = "Service request id")),
    request_body = SelectMechanicBody,
    responses(
        (status = 200, description = "Mechanic selected", body = ServiceRequestResponse),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 403, description = "Not the request owner", body = ErrorSchema),
        (status = 404, description = "Unknown request or mechanic", body = ErrorSchema),
        (status = 409, description = "Request not pending or mechanic unavailable", body = ErrorSchema)
    ),
    tags = ["service-requests"],
    operation_id = "selectMechanic"
)]
#[post("/service-requests/{id}/select")]
pub async fn select(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<SelectMechanicBody>,
) -> ApiResult<web::Json<ServiceRequestResponse>> {
    let actor = session.require_account_id()?;
    let id = request_id(path)?;
    let mechanic_id: MechanicId = parse_id(&payload.mechanic_id, FieldName::new("mechanicId"))?;
    let updated = state
        .service_requests
        .select(&actor, &id, &mechanic_id)
        .await?;
    Ok(respond(&updated))
}

/// Selected mechanic accepts the job.
#[utoipa::path(
    post,
    path = "/api/v1/service-requests/{id}/accept",
    params(("id" = String, Path, description = "Service request id")),
    responses(
        (status = 200, description = "Request accepted", body = ServiceRequestResponse),
        (status = 403, description = "Not the selected mechanic", body = ErrorSchema),
        (status = 404, description = "Unknown request", body = ErrorSchema),
        (status = 409, description = "Request is not pending", body = ErrorSchema)
    ),
    tags = ["service-requests"],
    operation_id = "acceptServiceRequest"
)]
#[post("/service-requests/{id}/accept")]
pub async fn accept(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<ServiceRequestResponse>> {
    let actor = session.require_account_id()?;
    let id = request_id(path)?;
    let updated = state.service_requests.accept(&actor, &id).await?;
    Ok(respond(&updated))
}

/// Selected mechanic turns the job down; the request reopens.
#[utoipa::path(
    post,
    path = "/api/v1/service-requests/{id}/decline",
    params(("id" = String, Path, description = "Service request id")),
    responses(
        (status = 200, description = "Request reopened", body = ServiceRequestResponse),
        (status = 403, description = "Not the selected mechanic", body = ErrorSchema),
        (status = 404, description = "Unknown request", body = ErrorSchema),
        (status = 409, description = "Request is not pending", body = ErrorSchema)
    ),
    tags = ["service-requests"],
    operation_id = "declineServiceRequest"
)]
#[post("/service-requests/{id}/decline")]
pub async fn decline(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<ServiceRequestResponse>> {
    let actor = session.require_account_id()?;
    let id = request_id(path)?;
    let updated = state.service_requests.decline(&actor, &id).await?;
    Ok(respond(&updated))
}

/// Assigned mechanic marks the job done.
#[utoipa::path(
    post,
    path = "/api/v1/service-requests/{id}/complete",
    params(("id" = String, Path, description = "Service request id")),
    responses(
        (status = 200, description = "Request completed", body = ServiceRequestResponse),
        (status = 403, description = "Not the assigned mechanic", body = ErrorSchema),
        (status = 404, description = "Unknown request", body = ErrorSchema),
        (status = 409, description = "Request is not accepted", body = ErrorSchema)
    ),
    tags = ["service-requests"],
    operation_id = "completeServiceRequest"
)]
#[post("/service-requests/{id}/complete")]
pub async fn complete(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<ServiceRequestResponse>> {
    let actor = session.require_account_id()?;
    let id = request_id(path)?;
    let updated = state.service_requests.complete(&actor, &id).await?;
    Ok(respond(&updated))
}

/// Owner withdraws a pending or accepted request.
#[utoipa::path(
    post,
    path = "/api/v1/service-requests/{id}/cancel",
    params(("id" = String, Path, description = "Service request id")),
    responses(
        (status = 200, description = "Request cancelled", body = ServiceRequestResponse),
        (status = 403, description = "Not the request owner", body = ErrorSchema),
        (status = 404, description = "Unknown request", body = ErrorSchema),
        (status = 409, description = "Request already finished", body = ErrorSchema)
    ),
    tags = ["service-requests"],
    operation_id = "cancelServiceRequest"
)]
#[post("/service-requests/{id}/cancel")]
pub async fn cancel(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<ServiceRequestResponse>> {
    let actor = session.require_account_id()?;
    let id = request_id(path)?;
    let updated = state.service_requests.cancel(&actor, &id).await?;
    Ok(respond(&updated))
}

#[cfg(test)]
#[path = "service_requests_tests.rs"]
mod tests;
