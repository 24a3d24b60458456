//! Helpers shared by the domain services.
//!
//! Repository errors are logged here once and mapped to domain errors:
//! connection failures become `service_unavailable`, query failures become
//! `internal_error`.

use std::collections::HashMap;

use serde_json::json;
use tracing::{error, warn};

use crate::domain::ports::{
    AccountRepositoryError, FeedbackRepository, FeedbackRepositoryError, Geocoder,
    MechanicMatch, MechanicRepository, MechanicRepositoryError, ServiceRequestRepositoryError,
};
use crate::domain::{
    AccountId, Coordinates, Error, LifecycleError, Location, Mechanic, MechanicId, RatingTotals,
    SearchRadius, ServiceRequest, find_nearby,
};

pub(crate) fn map_account_error(err: AccountRepositoryError) -> Error {
    match err {
        AccountRepositoryError::Connection { message } => {
            error!(%message, "account repository unavailable");
            Error::service_unavailable(format!("account repository unavailable: {message}"))
        }
        AccountRepositoryError::Query { message } => {
            error!(%message, "account repository query failed");
            Error::internal(format!("account repository error: {message}"))
        }
        AccountRepositoryError::Duplicate { field } => {
            warn!(%field, "registration rejected for duplicate value");
            Error::conflict(format!("{field} is already registered")).with_details(json!({
                "field": field,
                "code": "duplicate",
            }))
        }
    }
}

pub(crate) fn map_mechanic_error(err: MechanicRepositoryError) -> Error {
    match err {
        MechanicRepositoryError::Connection { message } => {
            error!(%message, "mechanic repository unavailable");
            Error::service_unavailable(format!("mechanic repository unavailable: {message}"))
        }
        MechanicRepositoryError::Query { message } => {
            error!(%message, "mechanic repository query failed");
            Error::internal(format!("mechanic repository error: {message}"))
        }
    }
}

pub(crate) fn map_request_error(err: ServiceRequestRepositoryError) -> Error {
    match err {
        ServiceRequestRepositoryError::Connection { message } => {
            error!(%message, "service request repository unavailable");
            Error::service_unavailable(format!(
                "service request repository unavailable: {message}"
            ))
        }
        ServiceRequestRepositoryError::Query { message } => {
            error!(%message, "service request repository query failed");
            Error::internal(format!("service request repository error: {message}"))
        }
    }
}

pub(crate) fn map_feedback_error(err: FeedbackRepositoryError) -> Error {
    match err {
        FeedbackRepositoryError::Connection { message } => {
            error!(%message, "feedback repository unavailable");
            Error::service_unavailable(format!("feedback repository unavailable: {message}"))
        }
        FeedbackRepositoryError::Query { message } => {
            error!(%message, "feedback repository query failed");
            Error::internal(format!("feedback repository error: {message}"))
        }
        FeedbackRepositoryError::Duplicate { message } => {
            warn!(%message, "duplicate feedback rejected");
            Error::conflict("feedback was already submitted for this request")
        }
    }
}

/// Map a refused lifecycle step, logging it at `warn`.
pub(crate) fn lifecycle_error(request: &ServiceRequest, actor: &AccountId, err: LifecycleError) -> Error {
    warn!(
        request_id = %request.id,
        actor = %actor,
        status = %request.status,
        reason = %err,
        "service request operation refused"
    );
    if err.is_forbidden() {
        Error::forbidden(err.to_string())
    } else {
        Error::conflict(err.to_string()).with_details(json!({
            "status": request.status.as_str(),
        }))
    }
}

/// Mechanic profile behind `account_id`, or `forbidden` for other accounts.
pub(crate) async fn require_mechanic<M>(mechanics: &M, account_id: &AccountId) -> Result<Mechanic, Error>
where
    M: MechanicRepository + ?Sized,
{
    mechanics
        .find_by_account(account_id)
        .await
        .map_err(map_mechanic_error)?
        .ok_or_else(|| {
            warn!(actor = %account_id, "mechanic-only operation attempted by non-mechanic");
            Error::forbidden("only mechanic accounts may do this")
        })
}

/// Explicit coordinates if both halves were supplied, else a best-effort
/// geocode of `location`.
///
/// Out-of-range explicit coordinates are a validation error. Geocoder
/// failures are logged and yield `None`.
pub(crate) async fn resolve_coordinates(
    geocoder: &dyn Geocoder,
    latitude: Option<f64>,
    longitude: Option<f64>,
    location: &Location,
) -> Result<Option<Coordinates>, Error> {
    if let Some(coordinates) = Coordinates::from_optional(latitude, longitude)? {
        return Ok(Some(coordinates));
    }
    match geocoder.geocode(location.as_str()).await {
        Ok(Some(coordinates)) => Ok(Some(coordinates)),
        Ok(None) => {
            warn!(location = %location, "geocoder found no match; storing without coordinates");
            Ok(None)
        }
        Err(err) => {
            warn!(location = %location, error = %err, "geocoding failed; storing without coordinates");
            Ok(None)
        }
    }
}

/// Rating totals for `ids`, skipping the lookup when there are none.
pub(crate) async fn rating_totals<F>(
    feedback: &F,
    ids: &[MechanicId],
) -> Result<HashMap<MechanicId, RatingTotals>, Error>
where
    F: FeedbackRepository + ?Sized,
{
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    feedback.rating_totals(ids).await.map_err(map_feedback_error)
}

/// Proximity search over the current directory, enriched with ratings.
pub(crate) async fn rank_mechanics<M, F>(
    mechanics: &M,
    feedback: &F,
    origin: Coordinates,
    radius: SearchRadius,
) -> Result<Vec<MechanicMatch>, Error>
where
    M: MechanicRepository + ?Sized,
    F: FeedbackRepository + ?Sized,
{
    let candidates = mechanics.list_searchable().await.map_err(map_mechanic_error)?;
    let nearby = find_nearby(origin, radius, candidates);
    let ids: Vec<MechanicId> = nearby.iter().map(|hit| hit.mechanic.id).collect();
    let totals = rating_totals(feedback, &ids).await?;
    Ok(nearby
        .into_iter()
        .map(|hit| MechanicMatch {
            rating: totals
                .get(&hit.mechanic.id)
                .copied()
                .unwrap_or_default()
                .summary(),
            mechanic: hit.mechanic,
            distance_km: hit.distance_km,
        })
        .collect())
}
