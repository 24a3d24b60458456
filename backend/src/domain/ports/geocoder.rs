//! Driven port for resolving free-text locations to coordinates.

use async_trait::async_trait;

use crate::domain::Coordinates;

use super::define_port_error;

define_port_error! {
    /// Errors raised by geocoding adapters.
    pub enum GeocoderError {
        /// Network transport failed.
        Transport { message: String } => "geocoder transport failed: {message}",
        /// The upstream call timed out.
        Timeout { message: String } => "geocoder request timed out: {message}",
        /// The upstream service throttled the caller.
        RateLimited { message: String } => "geocoder rate limited the request: {message}",
        /// The upstream payload could not be understood.
        InvalidResponse { message: String } => "geocoder returned an invalid response: {message}",
    }
}

/// Best-effort geocoding.
///
/// `Ok(None)` means the service found nothing. Callers treat errors the
/// same way after logging them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve `query` to the best matching point.
    async fn geocode(&self, query: &str) -> Result<Option<Coordinates>, GeocoderError>;
}

/// Geocoder used when lookups are disabled; never resolves anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledGeocoder;

#[async_trait]
impl Geocoder for DisabledGeocoder {
    async fn geocode(&self, _query: &str) -> Result<Option<Coordinates>, GeocoderError> {
        Ok(None)
    }
}
