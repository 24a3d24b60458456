//! Proximity search over the mechanic directory.

use crate::domain::{Coordinates, Mechanic, SearchRadius, distance_km};

/// A mechanic within the search radius and its distance from the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyMechanic {
    pub mechanic: Mechanic,
    pub distance_km: f64,
}

/// Rank `candidates` by great-circle distance from `origin`.
///
/// Candidates that are unapproved, unavailable or unlocated are dropped even
/// when the caller already filtered them. Survivors within `radius` are
/// returned nearest first; equal distances keep their input order.
///
/// # Examples
/// ```
/// use roadside::domain::{Coordinates, SearchRadius, find_nearby};
///
/// let origin = Coordinates::new(12.97, 77.59).expect("origin");
/// assert!(find_nearby(origin, SearchRadius::default(), Vec::new()).is_empty());
/// ```
pub fn find_nearby(
    origin: Coordinates,
    radius: SearchRadius,
    candidates: impl IntoIterator<Item = Mechanic>,
) -> Vec<NearbyMechanic> {
    let mut nearby: Vec<NearbyMechanic> = candidates
        .into_iter()
        .filter(Mechanic::is_searchable)
        .filter_map(|mechanic| {
            let distance = distance_km(Some(origin), mechanic.coordinates)?;
            (distance <= radius.km()).then_some(NearbyMechanic {
                mechanic,
                distance_km: distance,
            })
        })
        .collect();
    nearby.sort_by(|left, right| left.distance_km.total_cmp(&right.distance_km));
    nearby
}
