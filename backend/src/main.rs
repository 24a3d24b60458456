//! Backend entry-point: loads settings, prepares storage and serves the REST
//! API with its OpenAPI docs.

mod server;

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use roadside::domain::ports::Geocoder;
use roadside::inbound::http::health::HealthState;
use roadside::inbound::http::session_config::{BuildMode, SessionToggles, session_settings};
use roadside::outbound::geocoding::{NominatimGeocoder, NominatimIdentity};
use roadside::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use roadside::settings::AppSettings;
use server::{ServerConfig, ServicePolicy, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|err| eyre!("failed to load settings: {err}"))?;
    let config = server_config(&settings).await?;

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    let handle = server.handle();
    info!(bind_addr = %settings.bind_addr()?, "server listening");

    let shutdown_state = health_state.clone();
    actix_web::rt::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested; draining");
            shutdown_state.mark_draining();
            handle.stop(true).await;
        }
    });

    server.await.wrap_err("HTTP server failed")
}

async fn server_config(settings: &AppSettings) -> Result<ServerConfig> {
    let session = session_settings(
        SessionToggles {
            key_file: &settings.session_key_file(),
            cookie_secure: settings.session_cookie_secure,
            allow_ephemeral: settings.session_allow_ephemeral,
        },
        BuildMode::from_debug_assertions(),
    )?;
    let policy = ServicePolicy::new(
        settings.default_radius()?,
        settings.auto_approve_mechanics,
        settings.feedback_policy()?,
    );

    let mut config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        settings.bind_addr()?,
    )
    .with_policy(policy);

    if settings.geocoder_enabled {
        let geocoder: Arc<dyn Geocoder> = Arc::new(
            NominatimGeocoder::new(
                settings.geocoder_endpoint()?,
                NominatimIdentity {
                    user_agent: settings.geocoder_user_agent().to_owned(),
                },
            )
            .wrap_err("failed to build geocoder client")?,
        );
        config = config.with_geocoder(geocoder);
    }

    if let Some(database_url) = settings.database_url.as_deref() {
        let applied = run_pending_migrations(database_url).await?;
        info!(count = applied.len(), "database migrations applied");
        let pool = DbPool::new(PoolConfig::new(database_url)).await?;
        config = config.with_db_pool(pool);
    }

    Ok(config)
}
