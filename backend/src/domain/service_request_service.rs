//! Service request submission, lifecycle and reads.
//!
//! Lifecycle operations load the request, let [`ServiceRequest`] plan the
//! transition, then hand the plan to the repository's compare-and-swap. A
//! plan that no longer matches storage means another actor won the race and
//! surfaces as `conflict`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Datelike;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    FeedbackRepository, Geocoder, MechanicDashboard, MechanicMatch, MechanicRepository,
    OpenRequest, RequestHistoryEntry, ServiceRequestRepository, ServiceRequestsCommand,
    ServiceRequestsQuery, SubmitServiceRequest,
};
use crate::domain::service_support::{
    lifecycle_error, map_feedback_error, map_mechanic_error, map_request_error, rank_mechanics,
    rating_totals, require_mechanic, resolve_coordinates,
};
use crate::domain::{
    AccountId, Error, FeedbackPolicy, LifecycleError, Location, Mechanic, MechanicId, OwnerName,
    PhoneNumber, SearchRadius, ServiceRequest, ServiceRequestId, ServiceRequestStatus,
    ServiceType, Transition, VehicleBrand, VehicleDescriptor, VehicleModel, VehicleNumber,
    VehicleType, VehicleYear, distance_km, field_error,
};

/// Service implementing [`ServiceRequestsCommand`] and
/// [`ServiceRequestsQuery`].
#[derive(Clone)]
pub struct ServiceRequestService<R, M, F> {
    requests: Arc<R>,
    mechanics: Arc<M>,
    feedback: Arc<F>,
    geocoder: Arc<dyn Geocoder>,
    clock: Arc<dyn Clock>,
    feedback_policy: FeedbackPolicy,
}

impl<R, M, F> ServiceRequestService<R, M, F> {
    /// Create a new service over the given repositories.
    pub fn new(
        requests: Arc<R>,
        mechanics: Arc<M>,
        feedback: Arc<F>,
        geocoder: Arc<dyn Geocoder>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            requests,
            mechanics,
            feedback,
            geocoder,
            clock,
            feedback_policy: FeedbackPolicy::default(),
        }
    }

    /// Report feedback eligibility as the feedback ledger will enforce it.
    pub fn with_feedback_policy(mut self, policy: FeedbackPolicy) -> Self {
        self.feedback_policy = policy;
        self
    }
}

impl<R, M, F> ServiceRequestService<R, M, F>
where
    R: ServiceRequestRepository,
    M: MechanicRepository,
    F: FeedbackRepository,
{
    async fn load(&self, id: &ServiceRequestId) -> Result<ServiceRequest, Error> {
        self.requests
            .find_by_id(id)
            .await
            .map_err(map_request_error)?
            .ok_or_else(|| Error::not_found(format!("service request {id} not found")))
    }

    async fn find_mechanic(&self, id: &MechanicId) -> Result<Option<Mechanic>, Error> {
        self.mechanics.find_by_id(id).await.map_err(map_mechanic_error)
    }

    async fn apply(
        &self,
        request: &ServiceRequest,
        actor: &AccountId,
        plan: Result<Transition, LifecycleError>,
    ) -> Result<ServiceRequest, Error> {
        let transition = plan.map_err(|err| lifecycle_error(request, actor, err))?;
        let updated = self
            .requests
            .transition(&request.id, &transition.guard, &transition.change)
            .await
            .map_err(map_request_error)?;
        let Some(updated) = updated else {
            warn!(
                request_id = %request.id,
                actor = %actor,
                action = %transition.action,
                "service request changed concurrently"
            );
            return Err(Error::conflict(
                "service request was modified concurrently; reload and retry",
            ));
        };
        info!(
            request_id = %updated.id,
            action = %transition.action,
            status = %updated.status,
            mechanic_id = ?updated.mechanic_id,
            "service request transitioned"
        );
        Ok(updated)
    }

    fn validate_submission(
        &self,
        form: &SubmitServiceRequest,
    ) -> Result<(VehicleDescriptor, OwnerName, PhoneNumber, Location, ServiceType), Error> {
        let vehicle_type: VehicleType = form.vehicle_type.trim().parse().map_err(|_| {
            field_error(
                "vehicleType",
                "unknown_vehicle_type",
                format!("unknown vehicle type: {}", form.vehicle_type),
            )
        })?;
        let vehicle = VehicleDescriptor {
            vehicle_type,
            brand: VehicleBrand::parse(&form.vehicle_brand)?,
            model: VehicleModel::parse(&form.vehicle_model)?,
            year: VehicleYear::parse(form.vehicle_year, self.clock.utc().year())?,
            number: VehicleNumber::parse(&form.vehicle_number)?,
        };
        let owner_name = OwnerName::parse(&form.owner_name)?;
        let phone = PhoneNumber::parse(&form.phone)?;
        let location = Location::parse(&form.location)?;
        let service_type: ServiceType = form.service_type.trim().parse().map_err(|_| {
            field_error(
                "serviceType",
                "unknown_service_type",
                format!("unknown service type: {}", form.service_type),
            )
        })?;
        Ok((vehicle, owner_name, phone, location, service_type))
    }

    async fn can_view(&self, actor: &AccountId, request: &ServiceRequest) -> Result<bool, Error> {
        if request.is_owned_by(*actor) {
            return Ok(true);
        }
        let mechanic = self
            .mechanics
            .find_by_account(actor)
            .await
            .map_err(map_mechanic_error)?;
        Ok(mechanic.is_some_and(|mechanic| {
            request.mechanic_id == Some(mechanic.id) || (request.is_open() && mechanic.approved)
        }))
    }
}

#[async_trait]
impl<R, M, F> ServiceRequestsCommand for ServiceRequestService<R, M, F>
where
    R: ServiceRequestRepository,
    M: MechanicRepository,
    F: FeedbackRepository,
{
    async fn submit(&self, form: SubmitServiceRequest) -> Result<ServiceRequest, Error> {
        let is_mechanic = self
            .mechanics
            .find_by_account(&form.requester_id)
            .await
            .map_err(map_mechanic_error)?
            .is_some();
        if is_mechanic {
            warn!(actor = %form.requester_id, "mechanic account tried to submit a request");
            return Err(Error::forbidden(
                "mechanic accounts cannot submit service requests",
            ));
        }

        let (vehicle, owner_name, phone, location, service_type) =
            self.validate_submission(&form)?;
        let coordinates =
            resolve_coordinates(self.geocoder.as_ref(), form.latitude, form.longitude, &location)
                .await?;

        let request = ServiceRequest {
            id: ServiceRequestId::random(),
            requester_id: form.requester_id,
            vehicle,
            owner_name,
            phone,
            location,
            coordinates,
            service_type,
            status: ServiceRequestStatus::Pending,
            mechanic_id: None,
            created_at: self.clock.utc(),
        };
        self.requests
            .insert(&request)
            .await
            .map_err(map_request_error)?;
        info!(
            request_id = %request.id,
            service_type = %request.service_type,
            located = request.coordinates.is_some(),
            "service request submitted"
        );
        Ok(request)
    }

    async fn select(
        &self,
        actor: &AccountId,
        id: &ServiceRequestId,
        mechanic_id: &MechanicId,
    ) -> Result<ServiceRequest, Error> {
        let request = self.load(id).await?;
        let mechanic = self
            .find_mechanic(mechanic_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("mechanic {mechanic_id} not found")))?;
        let plan = request.plan_select(*actor, &mechanic);
        self.apply(&request, actor, plan).await
    }

    async fn accept(
        &self,
        actor: &AccountId,
        id: &ServiceRequestId,
    ) -> Result<ServiceRequest, Error> {
        let request = self.load(id).await?;
        let mechanic = require_mechanic(self.mechanics.as_ref(), actor).await?;
        let plan = request.plan_accept(&mechanic);
        self.apply(&request, actor, plan).await
    }

    async fn decline(
        &self,
        actor: &AccountId,
        id: &ServiceRequestId,
    ) -> Result<ServiceRequest, Error> {
        let request = self.load(id).await?;
        let mechanic = require_mechanic(self.mechanics.as_ref(), actor).await?;
        let plan = request.plan_decline(&mechanic);
        self.apply(&request, actor, plan).await
    }

    async fn complete(
        &self,
        actor: &AccountId,
        id: &ServiceRequestId,
    ) -> Result<ServiceRequest, Error> {
        let request = self.load(id).await?;
        let mechanic = require_mechanic(self.mechanics.as_ref(), actor).await?;
        let plan = request.plan_complete(&mechanic);
        self.apply(&request, actor, plan).await
    }

    async fn cancel(
        &self,
        actor: &AccountId,
        id: &ServiceRequestId,
    ) -> Result<ServiceRequest, Error> {
        let request = self.load(id).await?;
        let plan = request.plan_cancel(*actor);
        self.apply(&request, actor, plan).await
    }
}

#[async_trait]
impl<R, M, F> ServiceRequestsQuery for ServiceRequestService<R, M, F>
where
    R: ServiceRequestRepository,
    M: MechanicRepository,
    F: FeedbackRepository,
{
    async fn history(&self, actor: &AccountId) -> Result<Vec<RequestHistoryEntry>, Error> {
        let requests = self
            .requests
            .list_by_requester(actor)
            .await
            .map_err(map_request_error)?;

        let mut mechanics: HashMap<MechanicId, Option<Mechanic>> = HashMap::new();
        let mut entries = Vec::with_capacity(requests.len());
        for request in requests {
            let mechanic = match request.mechanic_id {
                Some(mechanic_id) => {
                    if !mechanics.contains_key(&mechanic_id) {
                        let found = self.find_mechanic(&mechanic_id).await?;
                        mechanics.insert(mechanic_id, found);
                    }
                    mechanics.get(&mechanic_id).cloned().flatten()
                }
                None => None,
            };
            let rateable = request.can_give_feedback();
            let feedback = if rateable {
                self.feedback
                    .find_for_request(actor, &request.id)
                    .await
                    .map_err(map_feedback_error)?
            } else {
                None
            };
            let can_give_feedback = rateable
                && (self.feedback_policy == FeedbackPolicy::Overwrite || feedback.is_none());
            entries.push(RequestHistoryEntry {
                request,
                mechanic,
                can_give_feedback,
                feedback,
            });
        }
        Ok(entries)
    }

    async fn detail(
        &self,
        actor: &AccountId,
        id: &ServiceRequestId,
    ) -> Result<ServiceRequest, Error> {
        let request = self.load(id).await?;
        if !self.can_view(actor, &request).await? {
            warn!(request_id = %request.id, actor = %actor, "service request read refused");
            return Err(Error::forbidden("you cannot view this service request"));
        }
        Ok(request)
    }

    async fn nearby_mechanics(
        &self,
        actor: &AccountId,
        id: &ServiceRequestId,
        radius: SearchRadius,
    ) -> Result<Vec<MechanicMatch>, Error> {
        let request = self.load(id).await?;
        if !request.is_owned_by(*actor) {
            warn!(request_id = %request.id, actor = %actor, "nearby search refused");
            return Err(Error::forbidden("only the requester may search for mechanics"));
        }
        let Some(origin) = request.coordinates else {
            return Err(field_error(
                "coordinates",
                "missing_origin",
                "service request has no coordinates to search from",
            ));
        };
        rank_mechanics(
            self.mechanics.as_ref(),
            self.feedback.as_ref(),
            origin,
            radius,
        )
        .await
    }

    async fn dashboard(&self, actor: &AccountId) -> Result<MechanicDashboard, Error> {
        let mechanic = require_mechanic(self.mechanics.as_ref(), actor).await?;
        let assigned = self
            .requests
            .list_by_mechanic(&mechanic.id)
            .await
            .map_err(map_request_error)?;

        let mut selected = Vec::new();
        let mut accepted = Vec::new();
        let mut completed = Vec::new();
        for request in assigned {
            match request.status {
                ServiceRequestStatus::Pending => selected.push(request),
                ServiceRequestStatus::Accepted => accepted.push(request),
                ServiceRequestStatus::Completed => completed.push(request),
                ServiceRequestStatus::Cancelled => {}
            }
        }

        let open = if mechanic.approved {
            let mut open: Vec<OpenRequest> = self
                .requests
                .list_open()
                .await
                .map_err(map_request_error)?
                .into_iter()
                .map(|request| OpenRequest {
                    distance_km: distance_km(mechanic.coordinates, request.coordinates),
                    request,
                })
                .collect();
            // Located requests first, nearest first; the rest keep newest-first order.
            open.sort_by(|left, right| match (left.distance_km, right.distance_km) {
                (Some(l), Some(r)) => l.total_cmp(&r),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            });
            open
        } else {
            Vec::new()
        };

        let rating = rating_totals(self.feedback.as_ref(), &[mechanic.id])
            .await?
            .get(&mechanic.id)
            .copied()
            .unwrap_or_default()
            .summary();

        Ok(MechanicDashboard {
            mechanic,
            rating,
            selected,
            open,
            accepted,
            completed,
        })
    }
}

#[cfg(test)]
#[path = "service_request_service_tests.rs"]
mod tests;
