//! Builders wiring repositories into the domain services behind the HTTP
//! state ports.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};

use roadside::domain::ports::{
    AccountRepository, FeedbackRepository, Geocoder, MechanicRepository, PasswordHasher,
    ServiceRequestRepository,
};
use roadside::domain::{AccountService, FeedbackService, MechanicService, ServiceRequestService};
use roadside::inbound::http::state::{HttpState, HttpStatePorts};
use roadside::outbound::memory::InMemoryStore;
use roadside::outbound::persistence::{
    DieselAccountRepository, DieselFeedbackRepository, DieselMechanicRepository,
    DieselServiceRequestRepository,
};
use roadside::outbound::security::Argon2PasswordHasher;
use tracing::info;

use super::ServerConfig;
use super::config::ServicePolicy;

/// One repository per aggregate, shared by every service that needs it.
struct Repositories<A, M, R, F> {
    accounts: Arc<A>,
    mechanics: Arc<M>,
    requests: Arc<R>,
    feedback: Arc<F>,
}

fn build_ports<A, M, R, F>(
    repos: Repositories<A, M, R, F>,
    geocoder: Arc<dyn Geocoder>,
    policy: ServicePolicy,
) -> HttpStatePorts
where
    A: AccountRepository + 'static,
    M: MechanicRepository + 'static,
    R: ServiceRequestRepository + 'static,
    F: FeedbackRepository + 'static,
{
    let Repositories {
        accounts,
        mechanics,
        requests,
        feedback,
    } = repos;
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher::new());

    let account_service = Arc::new(
        AccountService::new(
            accounts,
            Arc::clone(&mechanics),
            hasher,
            Arc::clone(&geocoder),
            Arc::clone(&clock),
        )
        .with_auto_approve_mechanics(policy.auto_approve_mechanics),
    );
    let mechanic_service = Arc::new(MechanicService::new(
        Arc::clone(&mechanics),
        Arc::clone(&feedback),
        Arc::clone(&geocoder),
    ));
    let request_service = Arc::new(
        ServiceRequestService::new(
            Arc::clone(&requests),
            mechanics,
            Arc::clone(&feedback),
            geocoder,
            Arc::clone(&clock),
        )
        .with_feedback_policy(policy.feedback_policy),
    );
    let feedback_service = Arc::new(
        FeedbackService::new(requests, feedback, clock).with_policy(policy.feedback_policy),
    );

    HttpStatePorts {
        login: account_service.clone(),
        accounts: account_service.clone(),
        accounts_query: account_service,
        mechanics: mechanic_service.clone(),
        mechanics_query: mechanic_service,
        service_requests: request_service.clone(),
        service_requests_query: request_service,
        feedback: feedback_service,
        default_radius: policy.default_radius,
    }
}

/// Build the HTTP state over PostgreSQL when a pool is configured, otherwise
/// over a fresh in-memory store.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let geocoder = Arc::clone(&config.geocoder);
    let ports = match &config.db_pool {
        Some(pool) => {
            info!("using PostgreSQL storage");
            build_ports(
                Repositories {
                    accounts: Arc::new(DieselAccountRepository::new(pool.clone())),
                    mechanics: Arc::new(DieselMechanicRepository::new(pool.clone())),
                    requests: Arc::new(DieselServiceRequestRepository::new(pool.clone())),
                    feedback: Arc::new(DieselFeedbackRepository::new(pool.clone())),
                },
                geocoder,
                config.policy,
            )
        }
        None => {
            info!("no database configured; using in-memory storage");
            let store = Arc::new(InMemoryStore::new());
            build_ports(
                Repositories {
                    accounts: Arc::clone(&store),
                    mechanics: Arc::clone(&store),
                    requests: Arc::clone(&store),
                    feedback: store,
                },
                geocoder,
                config.policy,
            )
        }
    };
    web::Data::new(HttpState::new(ports))
}
