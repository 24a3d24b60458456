//! Reqwest-backed Nominatim geocoder.
//!
//! Nominatim's public usage policy allows one request per second from an
//! identified client. The adapter serialises calls through a throttle that
//! keeps at least [`MIN_INTERVAL`] between them. Transport failures,
//! timeouts and throttling are retried up to [`MAX_RETRIES`] times with
//! [`ERROR_BACKOFF`] between attempts; an unreadable payload fails at once.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::domain::Coordinates;
use crate::domain::ports::{Geocoder, GeocoderError};

const MIN_INTERVAL: Duration = Duration::from_secs(1);
const MAX_RETRIES: u32 = 2;
const ERROR_BACKOFF: Duration = Duration::from_secs(2);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_USER_AGENT: &str = "roadmech_app";

/// Async sleep used between throttled and retried calls.
#[async_trait]
pub trait GeocodeSleeper: Send + Sync {
    /// Wait for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Tokio-based sleeper.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl GeocodeSleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Identity sent with every Nominatim request.
pub struct NominatimIdentity {
    /// HTTP user-agent; Nominatim rejects anonymous clients.
    pub user_agent: String,
}

impl Default for NominatimIdentity {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PlaceDto {
    lat: String,
    lon: String,
}

/// Geocoder that queries one Nominatim search endpoint.
pub struct NominatimGeocoder {
    client: Client,
    endpoint: Url,
    user_agent: String,
    sleeper: Arc<dyn GeocodeSleeper>,
    last_call: Mutex<Option<Instant>>,
}

impl NominatimGeocoder {
    /// Build a geocoder for `endpoint` with the given identity.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, identity: NominatimIdentity) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint,
            user_agent: identity.user_agent,
            sleeper: Arc::new(TokioSleeper),
            last_call: Mutex::new(None),
        })
    }

    /// Replace the sleeper used for throttling and backoff.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn GeocodeSleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    async fn throttled_call(&self, query: &str) -> Result<Option<Coordinates>, GeocoderError> {
        let mut last_call = self.last_call.lock().await;
        let wait = throttle_delay(*last_call, Instant::now(), MIN_INTERVAL);
        if !wait.is_zero() {
            self.sleeper.sleep(wait).await;
        }
        *last_call = Some(Instant::now());
        drop(last_call);
        self.call(query).await
    }

    async fn call(&self, query: &str) -> Result<Option<Coordinates>, GeocoderError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .header(reqwest::header::USER_AGENT, self.user_agent.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status));
        }
        parse_first_hit(body.as_ref())
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, query: &str) -> Result<Option<Coordinates>, GeocoderError> {
        let mut attempt = 0;
        loop {
            match self.throttled_call(query).await {
                Ok(found) => {
                    debug!(query, found = found.is_some(), "geocode lookup finished");
                    return Ok(found);
                }
                Err(err) if attempt < MAX_RETRIES && is_retryable(&err) => {
                    attempt += 1;
                    warn!(query, attempt, error = %err, "geocode lookup failed; retrying");
                    self.sleeper.sleep(ERROR_BACKOFF).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

fn is_retryable(error: &GeocoderError) -> bool {
    match error {
        GeocoderError::Transport { .. }
        | GeocoderError::Timeout { .. }
        | GeocoderError::RateLimited { .. } => true,
        GeocoderError::InvalidResponse { .. } => false,
    }
}

/// Time left before the next call may start.
fn throttle_delay(last_call: Option<Instant>, now: Instant, interval: Duration) -> Duration {
    last_call.map_or(Duration::ZERO, |last| {
        interval.saturating_sub(now.saturating_duration_since(last))
    })
}

fn parse_first_hit(body: &[u8]) -> Result<Option<Coordinates>, GeocoderError> {
    let places: Vec<PlaceDto> = serde_json::from_slice(body).map_err(|error| {
        GeocoderError::invalid_response(format!("invalid Nominatim JSON payload: {error}"))
    })?;
    let Some(place) = places.into_iter().next() else {
        return Ok(None);
    };
    let latitude = parse_degrees(&place.lat, "lat")?;
    let longitude = parse_degrees(&place.lon, "lon")?;
    Coordinates::new(latitude, longitude)
        .map(Some)
        .map_err(|error| GeocoderError::invalid_response(error.to_string()))
}

fn parse_degrees(raw: &str, field: &str) -> Result<f64, GeocoderError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| GeocoderError::invalid_response(format!("{field} is not a number: {raw}")))
}

fn map_transport_error(error: reqwest::Error) -> GeocoderError {
    if error.is_timeout() {
        GeocoderError::timeout(error.to_string())
    } else {
        GeocoderError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode) -> GeocoderError {
    let message = format!("status {}", status.as_u16());
    match status {
        StatusCode::TOO_MANY_REQUESTS => GeocoderError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            GeocoderError::timeout(message)
        }
        _ => GeocoderError::transport(message),
    }
}
