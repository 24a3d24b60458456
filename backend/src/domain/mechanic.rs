//! Mechanic directory records.

use chrono::{DateTime, Utc};

use crate::domain::{
    AccountId, Coordinates, Location, MechanicId, PhoneNumber, ServiceCentreName, Specialization,
};

/// A mechanic's public profile.
///
/// ## Invariants
/// - Exactly one profile exists per mechanic account.
/// - `phone` is unique across mechanics.
/// - Proximity search only ever returns profiles for which
///   [`Mechanic::is_searchable`] holds.
#[derive(Debug, Clone, PartialEq)]
pub struct Mechanic {
    pub id: MechanicId,
    pub account_id: AccountId,
    pub service_centre_name: ServiceCentreName,
    pub phone: PhoneNumber,
    pub address: Location,
    pub coordinates: Option<Coordinates>,
    pub specialization: Option<Specialization>,
    pub approved: bool,
    pub available: bool,
    pub created_at: DateTime<Utc>,
}

impl Mechanic {
    /// Approved and currently taking work.
    pub fn is_selectable(&self) -> bool {
        self.approved && self.available
    }

    /// Selectable and located, so it can appear in proximity results.
    pub fn is_searchable(&self) -> bool {
        self.is_selectable() && self.coordinates.is_some()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Builders shared by tests across the domain and adapters.

    use super::*;
    use chrono::TimeZone;

    /// Approved, available mechanic at the given point.
    pub(crate) fn mechanic_at(latitude: f64, longitude: f64) -> Mechanic {
        Mechanic {
            id: MechanicId::random(),
            account_id: AccountId::random(),
            service_centre_name: ServiceCentreName::parse("Ravi Auto Works")
                .expect("fixture name"),
            phone: PhoneNumber::parse("9876543210").expect("fixture phone"),
            address: Location::parse("12 MG Road, Bengaluru").expect("fixture address"),
            coordinates: Some(Coordinates::new(latitude, longitude).expect("fixture point")),
            specialization: None,
            approved: true,
            available: true,
            created_at: Utc
                .with_ymd_and_hms(2026, 1, 1, 9, 0, 0)
                .single()
                .expect("fixture timestamp"),
        }
    }
}
