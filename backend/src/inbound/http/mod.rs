//! HTTP inbound adapter exposing the REST API under `/api/v1`.

pub mod accounts;
pub mod dto;
pub mod error;
pub mod feedback;
pub mod health;
pub mod mechanics;
pub mod schemas;
pub mod service_requests;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

use actix_web::web;

pub use error::ApiResult;

/// Register every `/api/v1` handler on `cfg`.
///
/// Fixed mechanic paths are registered before `/mechanics/{id}` so that
/// `nearby` is never parsed as an id.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(accounts::register)
        .service(accounts::login)
        .service(accounts::logout)
        .service(accounts::me)
        .service(mechanics::nearby)
        .service(mechanics::set_availability)
        .service(mechanics::update_location)
        .service(mechanics::dashboard)
        .service(mechanics::detail)
        .service(service_requests::submit)
        .service(service_requests::history)
        .service(service_requests::detail)
        .service(service_requests::nearby_mechanics)
        .service(service_requests::select)
        .service(service_requests::accept)
        .service(service_requests::decline)
        .service(service_requests::complete)
        .service(service_requests::cancel)
        .service(feedback::submit);
}
