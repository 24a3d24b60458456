//! Driving port for browsing the mechanic directory.

use async_trait::async_trait;

use crate::domain::{Coordinates, Error, Feedback, Mechanic, MechanicId, RatingSummary, SearchRadius};

/// Proximity search hit enriched with the mechanic's rating.
#[derive(Debug, Clone, PartialEq)]
pub struct MechanicMatch {
    pub mechanic: Mechanic,
    pub distance_km: f64,
    pub rating: RatingSummary,
}

/// Public mechanic profile with the feedback behind its rating.
#[derive(Debug, Clone, PartialEq)]
pub struct MechanicDetail {
    pub mechanic: Mechanic,
    pub rating: RatingSummary,
    pub feedback: Vec<Feedback>,
}

/// Domain use-case port for directory reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MechanicsQuery: Send + Sync {
    /// Eligible mechanics within `radius` of `origin`, nearest first.
    async fn nearby(
        &self,
        origin: Coordinates,
        radius: SearchRadius,
    ) -> Result<Vec<MechanicMatch>, Error>;

    /// Profile, rating and feedback for one mechanic.
    async fn detail(&self, id: &MechanicId) -> Result<MechanicDetail, Error>;
}
