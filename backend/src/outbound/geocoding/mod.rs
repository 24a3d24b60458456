//! Geocoding adapters implementing [`crate::domain::ports::Geocoder`].

mod nominatim;

pub use nominatim::{GeocodeSleeper, NominatimGeocoder, NominatimIdentity, TokioSleeper};
