//! Application configuration loaded via OrthoConfig.
//!
//! Every field can be set from the command line, a configuration file or a
//! `ROADSIDE_`-prefixed environment variable. Optional fields fall back to
//! the defaults below through accessor methods.

use std::net::SocketAddr;
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::{DEFAULT_SEARCH_RADIUS_KM, FeedbackPolicy, GeoValidationError, SearchRadius};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_GEOCODER_ENDPOINT: &str = "https://nominatim.openstreetmap.org/search";
const DEFAULT_GEOCODER_USER_AGENT: &str = "roadmech_app";
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";

/// Configuration values read at startup.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ROADSIDE")]
pub struct AppSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string. In-memory storage is used when absent.
    pub database_url: Option<String>,
    /// Search radius applied when a request omits `radiusKm`.
    pub default_radius_km: Option<f64>,
    /// Approve mechanic profiles at registration time.
    #[ortho_config(default = true)]
    pub auto_approve_mechanics: bool,
    /// `overwrite` or `reject` repeated feedback from the same author.
    pub feedback_policy: Option<String>,
    /// Resolve free-text addresses through Nominatim.
    #[ortho_config(default = false)]
    pub geocoder_enabled: bool,
    /// Nominatim search endpoint.
    pub geocoder_endpoint: Option<String>,
    /// User-agent sent to Nominatim.
    pub geocoder_user_agent: Option<String>,
    /// File holding the session signing key material.
    pub session_key_file: Option<PathBuf>,
    /// Mark session cookies `Secure`.
    #[ortho_config(default = true)]
    pub session_cookie_secure: bool,
    /// Permit a random session key when the key file is missing.
    #[ortho_config(default = false)]
    pub session_allow_ephemeral: bool,
}

/// A configured value that cannot be used.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address '{value}': {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("invalid default radius: {source}")]
    Radius {
        #[source]
        source: GeoValidationError,
    },
    #[error("invalid feedback policy: {message}")]
    FeedbackPolicy { message: String },
    #[error("invalid geocoder endpoint '{value}': {source}")]
    GeocoderEndpoint {
        value: String,
        #[source]
        source: url::ParseError,
    },
}

impl AppSettings {
    /// Return the bind address, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// Return the default search radius, falling back to 50 km.
    pub fn default_radius(&self) -> Result<SearchRadius, SettingsError> {
        SearchRadius::new(self.default_radius_km.unwrap_or(DEFAULT_SEARCH_RADIUS_KM))
            .map_err(|source| SettingsError::Radius { source })
    }

    /// Return the feedback policy, falling back to overwrite.
    pub fn feedback_policy(&self) -> Result<FeedbackPolicy, SettingsError> {
        self.feedback_policy
            .as_deref()
            .map_or(Ok(FeedbackPolicy::default()), str::parse)
            .map_err(|message| SettingsError::FeedbackPolicy { message })
    }

    /// Return the Nominatim endpoint, falling back to the public instance.
    pub fn geocoder_endpoint(&self) -> Result<Url, SettingsError> {
        let value = self
            .geocoder_endpoint
            .as_deref()
            .unwrap_or(DEFAULT_GEOCODER_ENDPOINT);
        Url::parse(value).map_err(|source| SettingsError::GeocoderEndpoint {
            value: value.to_owned(),
            source,
        })
    }

    /// Return the geocoder user-agent, falling back to `roadmech_app`.
    pub fn geocoder_user_agent(&self) -> &str {
        self.geocoder_user_agent
            .as_deref()
            .unwrap_or(DEFAULT_GEOCODER_USER_AGENT)
    }

    /// Return the session key path, falling back to the mounted secret.
    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for application configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 11] = [
        "ROADSIDE_BIND_ADDR",
        "ROADSIDE_DATABASE_URL",
        "ROADSIDE_DEFAULT_RADIUS_KM",
        "ROADSIDE_AUTO_APPROVE_MECHANICS",
        "ROADSIDE_FEEDBACK_POLICY",
        "ROADSIDE_GEOCODER_ENABLED",
        "ROADSIDE_GEOCODER_ENDPOINT",
        "ROADSIDE_GEOCODER_USER_AGENT",
        "ROADSIDE_SESSION_KEY_FILE",
        "ROADSIDE_SESSION_COOKIE_SECURE",
        "ROADSIDE_SESSION_ALLOW_EPHEMERAL",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("roadside")]).expect("config should load")
    }

    fn cleared_except(overrides: &[(&'static str, &str)]) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(cleared_except(&[]));

        let settings = load_from_empty_args();

        assert_eq!(
            settings.bind_addr().expect("bind addr"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("literal")
        );
        assert!(settings.database_url.is_none());
        assert_eq!(settings.default_radius().expect("radius").km(), 50.0);
        assert!(settings.auto_approve_mechanics);
        assert_eq!(
            settings.feedback_policy().expect("policy"),
            FeedbackPolicy::Overwrite
        );
        assert!(!settings.geocoder_enabled);
        assert_eq!(
            settings.geocoder_endpoint().expect("endpoint").as_str(),
            DEFAULT_GEOCODER_ENDPOINT
        );
        assert_eq!(settings.geocoder_user_agent(), "roadmech_app");
        assert_eq!(
            settings.session_key_file(),
            PathBuf::from(DEFAULT_SESSION_KEY_FILE)
        );
        assert!(settings.session_cookie_secure);
        assert!(!settings.session_allow_ephemeral);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(cleared_except(&[
            ("ROADSIDE_BIND_ADDR", "127.0.0.1:9000"),
            ("ROADSIDE_DATABASE_URL", "postgres://localhost/roadside"),
            ("ROADSIDE_DEFAULT_RADIUS_KM", "12.5"),
            ("ROADSIDE_AUTO_APPROVE_MECHANICS", "false"),
            ("ROADSIDE_FEEDBACK_POLICY", "reject"),
            ("ROADSIDE_GEOCODER_ENABLED", "true"),
            ("ROADSIDE_GEOCODER_USER_AGENT", "roadside-test"),
            ("ROADSIDE_SESSION_KEY_FILE", "/tmp/roadside_key"),
        ]));

        let settings = load_from_empty_args();

        assert_eq!(settings.bind_addr().expect("bind addr").port(), 9000);
        assert_eq!(
            settings.database_url.as_deref(),
            Some("postgres://localhost/roadside")
        );
        assert_eq!(settings.default_radius().expect("radius").km(), 12.5);
        assert!(!settings.auto_approve_mechanics);
        assert_eq!(
            settings.feedback_policy().expect("policy"),
            FeedbackPolicy::Reject
        );
        assert!(settings.geocoder_enabled);
        assert_eq!(settings.geocoder_user_agent(), "roadside-test");
        assert_eq!(
            settings.session_key_file(),
            PathBuf::from("/tmp/roadside_key")
        );
    }

    #[rstest]
    #[case::bad_addr("ROADSIDE_BIND_ADDR", "not-an-address")]
    #[case::bad_radius("ROADSIDE_DEFAULT_RADIUS_KM", "-3")]
    #[case::bad_policy("ROADSIDE_FEEDBACK_POLICY", "append")]
    #[case::bad_endpoint("ROADSIDE_GEOCODER_ENDPOINT", "nominatim")]
    fn unusable_values_are_reported(#[case] name: &'static str, #[case] value: &str) {
        let _guard = lock_env(cleared_except(&[(name, value)]));

        let settings = load_from_empty_args();
        let outcome = match name {
            "ROADSIDE_BIND_ADDR" => settings.bind_addr().map(drop),
            "ROADSIDE_DEFAULT_RADIUS_KM" => settings.default_radius().map(drop),
            "ROADSIDE_FEEDBACK_POLICY" => settings.feedback_policy().map(drop),
            _ => settings.geocoder_endpoint().map(drop),
        };

        assert!(outcome.is_err(), "{name}={value} should be rejected");
    }
}
