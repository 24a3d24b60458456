//! Mechanic directory reads and mechanic self-service.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{
    FeedbackRepository, Geocoder, MechanicDetail, MechanicMatch, MechanicRepository,
    MechanicsCommand, MechanicsQuery, UpdateLocationRequest,
};
use crate::domain::service_support::{
    map_feedback_error, map_mechanic_error, rank_mechanics, require_mechanic, resolve_coordinates,
};
use crate::domain::{
    AccountId, Coordinates, Error, Location, Mechanic, MechanicId, RatingTotals, SearchRadius,
};

/// Service implementing [`MechanicsQuery`] and [`MechanicsCommand`].
#[derive(Clone)]
pub struct MechanicService<M, F> {
    mechanics: Arc<M>,
    feedback: Arc<F>,
    geocoder: Arc<dyn Geocoder>,
}

impl<M, F> MechanicService<M, F> {
    /// Create a new service over the given repositories.
    pub fn new(mechanics: Arc<M>, feedback: Arc<F>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self {
            mechanics,
            feedback,
            geocoder,
        }
    }
}

fn vanished(id: &MechanicId) -> Error {
    Error::not_found(format!("mechanic {id} not found"))
}

#[async_trait]
impl<M, F> MechanicsQuery for MechanicService<M, F>
where
    M: MechanicRepository,
    F: FeedbackRepository,
{
    async fn nearby(
        &self,
        origin: Coordinates,
        radius: SearchRadius,
    ) -> Result<Vec<MechanicMatch>, Error> {
        rank_mechanics(
            self.mechanics.as_ref(),
            self.feedback.as_ref(),
            origin,
            radius,
        )
        .await
    }

    async fn detail(&self, id: &MechanicId) -> Result<MechanicDetail, Error> {
        let mechanic = self
            .mechanics
            .find_by_id(id)
            .await
            .map_err(map_mechanic_error)?
            .ok_or_else(|| vanished(id))?;
        let feedback = self
            .feedback
            .list_for_mechanic(id)
            .await
            .map_err(map_feedback_error)?;
        let rating = RatingTotals::from_ratings(feedback.iter().map(|record| record.rating)).summary();
        Ok(MechanicDetail {
            mechanic,
            rating,
            feedback,
        })
    }
}

#[async_trait]
impl<M, F> MechanicsCommand for MechanicService<M, F>
where
    M: MechanicRepository,
    F: FeedbackRepository,
{
    async fn set_availability(
        &self,
        account_id: &AccountId,
        available: bool,
    ) -> Result<Mechanic, Error> {
        let mechanic = require_mechanic(self.mechanics.as_ref(), account_id).await?;
        let updated = self
            .mechanics
            .set_availability(&mechanic.id, available)
            .await
            .map_err(map_mechanic_error)?
            .ok_or_else(|| vanished(&mechanic.id))?;
        info!(mechanic_id = %updated.id, available, "mechanic availability changed");
        Ok(updated)
    }

    async fn update_location(&self, request: UpdateLocationRequest) -> Result<Mechanic, Error> {
        let mechanic = require_mechanic(self.mechanics.as_ref(), &request.account_id).await?;
        let address = Location::parse(&request.address)?;
        let coordinates = resolve_coordinates(
            self.geocoder.as_ref(),
            request.latitude,
            request.longitude,
            &address,
        )
        .await?;
        let updated = self
            .mechanics
            .update_location(&mechanic.id, &address, coordinates)
            .await
            .map_err(map_mechanic_error)?
            .ok_or_else(|| vanished(&mechanic.id))?;
        info!(
            mechanic_id = %updated.id,
            located = updated.coordinates.is_some(),
            "mechanic location updated"
        );
        Ok(updated)
    }
}

#[cfg(test)]
#[path = "mechanic_service_tests.rs"]
mod tests;
