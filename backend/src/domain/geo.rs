//! Geographic primitives and the great-circle distance function.
//!
//! Coordinates are WGS84 decimal degrees. Stored values keep six decimal
//! places, matching the precision mechanics and requests are persisted with.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{Error, field_error};

/// Mean Earth radius in kilometres used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Default proximity search radius in kilometres.
pub const DEFAULT_SEARCH_RADIUS_KM: f64 = 50.0;

/// Upper bound accepted for caller-supplied search radii.
///
/// Half the Earth's circumference; larger radii match every point anyway.
pub const MAX_SEARCH_RADIUS_KM: f64 = std::f64::consts::PI * EARTH_RADIUS_KM;

const COORDINATE_SCALE: f64 = 1_000_000.0;

/// Validation errors raised by [`Coordinates::new`] and [`SearchRadius::new`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeoValidationError {
    LatitudeOutOfRange { value: f64 },
    LongitudeOutOfRange { value: f64 },
    RadiusNotPositive { value: f64 },
    RadiusTooLarge { max: f64 },
}

impl fmt::Display for GeoValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LatitudeOutOfRange { value } => {
                write!(f, "latitude {value} must be within [-90, 90]")
            }
            Self::LongitudeOutOfRange { value } => {
                write!(f, "longitude {value} must be within [-180, 180]")
            }
            Self::RadiusNotPositive { value } => {
                write!(f, "search radius {value} must be a positive number of kilometres")
            }
            Self::RadiusTooLarge { max } => {
                write!(f, "search radius must be at most {max} kilometres")
            }
        }
    }
}

impl std::error::Error for GeoValidationError {}

impl GeoValidationError {
    /// Request field the violation belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::LatitudeOutOfRange { .. } => "latitude",
            Self::LongitudeOutOfRange { .. } => "longitude",
            Self::RadiusNotPositive { .. } | Self::RadiusTooLarge { .. } => "radiusKm",
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::LatitudeOutOfRange { .. } => "latitude_out_of_range",
            Self::LongitudeOutOfRange { .. } => "longitude_out_of_range",
            Self::RadiusNotPositive { .. } => "radius_not_positive",
            Self::RadiusTooLarge { .. } => "radius_too_large",
        }
    }
}

impl From<GeoValidationError> for Error {
    fn from(value: GeoValidationError) -> Self {
        field_error(value.field(), value.code(), value.to_string())
    }
}

/// Validated latitude/longitude pair.
///
/// ## Invariants
/// - `latitude` is finite and within `[-90, 90]`.
/// - `longitude` is finite and within `[-180, 180]`.
/// - Both components are rounded to six decimal places.
///
/// # Examples
/// ```
/// use roadside::domain::Coordinates;
///
/// let point = Coordinates::new(12.971_598_7, 77.594_566_3).expect("valid point");
/// assert_eq!(point.latitude(), 12.971_599);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CoordinatesDto", into = "CoordinatesDto")]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Validate and construct a coordinate pair.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoValidationError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoValidationError::LatitudeOutOfRange { value: latitude });
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoValidationError::LongitudeOutOfRange { value: longitude });
        }
        Ok(Self {
            latitude: round_coordinate(latitude),
            longitude: round_coordinate(longitude),
        })
    }

    /// Build coordinates from an optional pair where both halves must be set.
    ///
    /// Returns `Ok(None)` when either component is missing.
    pub fn from_optional(
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Result<Option<Self>, GeoValidationError> {
        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => Self::new(latitude, longitude).map(Some),
            _ => Ok(None),
        }
    }

    /// Latitude in decimal degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in decimal degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

fn round_coordinate(value: f64) -> f64 {
    (value * COORDINATE_SCALE).round() / COORDINATE_SCALE
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct CoordinatesDto {
    latitude: f64,
    longitude: f64,
}

impl From<Coordinates> for CoordinatesDto {
    fn from(value: Coordinates) -> Self {
        Self {
            latitude: value.latitude,
            longitude: value.longitude,
        }
    }
}

impl TryFrom<CoordinatesDto> for Coordinates {
    type Error = GeoValidationError;

    fn try_from(value: CoordinatesDto) -> Result<Self, Self::Error> {
        Self::new(value.latitude, value.longitude)
    }
}

/// Great-circle distance in kilometres between two optional points.
///
/// Returns `None` when either point is missing; that is a valid "cannot
/// compute" outcome rather than an error.
///
/// # Examples
/// ```
/// use roadside::domain::{Coordinates, distance_km};
///
/// let origin = Coordinates::new(0.0, 0.0).ok();
/// let east = Coordinates::new(0.0, 1.0).ok();
/// let km = distance_km(origin, east).expect("both points present");
/// assert!((km - 111.19).abs() < 0.5);
/// assert!(distance_km(origin, None).is_none());
/// ```
pub fn distance_km(origin: Option<Coordinates>, destination: Option<Coordinates>) -> Option<f64> {
    let (origin, destination) = origin.zip(destination)?;
    Some(haversine_km(origin, destination))
}

fn haversine_km(origin: Coordinates, destination: Coordinates) -> f64 {
    let lat1 = origin.latitude.to_radians();
    let lat2 = destination.latitude.to_radians();
    let delta_lat = (destination.latitude - origin.latitude).to_radians();
    let delta_lon = (destination.longitude - origin.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push `a` fractionally outside [0, 1] near antipodes.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Positive search radius in kilometres.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct SearchRadius(f64);

impl SearchRadius {
    /// Validate a caller-supplied radius.
    pub fn new(km: f64) -> Result<Self, GeoValidationError> {
        if !km.is_finite() || km <= 0.0 {
            return Err(GeoValidationError::RadiusNotPositive { value: km });
        }
        if km > MAX_SEARCH_RADIUS_KM {
            return Err(GeoValidationError::RadiusTooLarge {
                max: MAX_SEARCH_RADIUS_KM,
            });
        }
        Ok(Self(km))
    }

    /// Radius in kilometres.
    pub fn km(self) -> f64 {
        self.0
    }
}

impl Default for SearchRadius {
    fn default() -> Self {
        Self(DEFAULT_SEARCH_RADIUS_KM)
    }
}
