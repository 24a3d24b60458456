//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::cookie::{Key, SameSite};
use roadside::domain::FeedbackPolicy;
use roadside::domain::SearchRadius;
use roadside::domain::ports::{DisabledGeocoder, Geocoder};
use roadside::outbound::persistence::DbPool;

/// Domain behaviour toggles applied when the services are built.
#[derive(Debug, Clone, Copy)]
pub struct ServicePolicy {
    pub(crate) default_radius: SearchRadius,
    pub(crate) auto_approve_mechanics: bool,
    pub(crate) feedback_policy: FeedbackPolicy,
}

impl ServicePolicy {
    #[must_use]
    pub fn new(
        default_radius: SearchRadius,
        auto_approve_mechanics: bool,
        feedback_policy: FeedbackPolicy,
    ) -> Self {
        Self {
            default_radius,
            auto_approve_mechanics,
            feedback_policy,
        }
    }
}

impl Default for ServicePolicy {
    fn default() -> Self {
        Self::new(SearchRadius::default(), true, FeedbackPolicy::default())
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) geocoder: Arc<dyn Geocoder>,
    pub(crate) policy: ServicePolicy,
}

impl ServerConfig {
    /// Construct a server configuration using application preferences.
    ///
    /// Without further calls the server keeps its data in memory and does
    /// not geocode addresses.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
            geocoder: Arc::new(DisabledGeocoder),
            policy: ServicePolicy::default(),
        }
    }

    /// Attach a database connection pool for the Diesel repositories.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Resolve free-text addresses with `geocoder`.
    #[must_use]
    pub fn with_geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = geocoder;
        self
    }

    /// Replace the domain behaviour toggles.
    #[must_use]
    pub fn with_policy(mut self, policy: ServicePolicy) -> Self {
        self.policy = policy;
        self
    }
}
