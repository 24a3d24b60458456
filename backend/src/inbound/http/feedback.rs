//! Feedback handler.
//!
//! ```text
//! POST /api/v1/service-requests/{id}/feedback {"rating":5,"comment":"Quick tow"}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::SubmitFeedbackRequest;
use crate::domain::ServiceRequestId;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::dto::FeedbackResponse;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackBody {
    #[schema(minimum = 1, maximum = 5, example = 5)]
    pub rating: i64,
    #[schema(max_length = 1000, example = "Arrived in twenty minutes")]
    pub comment: Option<String>,
}

/// Rate the mechanic who completed the caller's request.
///
/// A first rating answers `201 Created`. Under the overwrite policy a repeat
/// rating replaces the earlier one and answers `200 OK`; under the reject
/// policy it answers `409 Conflict`.
#[utoipa::path(
    post,
    path = "/api/v1/service-requests/{id}/feedback",
    params(("id" = String, Path, description = "Service request id")),
    request_body = FeedbackBody,
    responses(
        (status = 201, description = "Feedback recorded", body = FeedbackResponse),
        (status = 200, description = "Earlier feedback replaced", body = FeedbackResponse),
        (status = 400, description = "Rating or comment invalid", body = ErrorSchema),
        (status = 403, description = "Not the request owner", body = ErrorSchema),
        (status = 404, description = "Unknown request", body = ErrorSchema),
        (status = 409, description = "Request not completed or already rated", body = ErrorSchema)
    ),
    tags = ["feedback"],
    operation_id = "submitFeedback"
)]
#[post("/service-requests/{id}/feedback")]
pub async fn submit(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<FeedbackBody>,
) -> ApiResult<HttpResponse> {
    let author_id = session.require_account_id()?;
    let service_request_id: ServiceRequestId = parse_id(&path.into_inner(), FieldName::new("id"))?;
    let FeedbackBody { rating, comment } = payload.into_inner();
    let feedback = state
        .feedback
        .submit(SubmitFeedbackRequest {
            author_id,
            service_request_id,
            rating,
            comment,
        })
        .await?;
    let body = FeedbackResponse::from(&feedback);
    if feedback.updated_at > feedback.created_at {
        Ok(HttpResponse::Ok().json(body))
    } else {
        Ok(HttpResponse::Created().json(body))
    }
}
