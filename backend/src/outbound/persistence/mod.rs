//! PostgreSQL repositories built on Diesel, `diesel-async` and `bb8`.
//!
//! Repositories only translate between rows and domain types. Row structs
//! (`models`) and table definitions (`schema`) stay private to this module.
//!
//! ```ignore
//! use roadside::outbound::persistence::{DbPool, DieselServiceRequestRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/roadside")).await?;
//! let requests = DieselServiceRequestRepository::new(pool);
//! ```

mod diesel_account_repository;
mod diesel_feedback_repository;
mod diesel_mechanic_repository;
mod diesel_service_request_repository;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_account_repository::DieselAccountRepository;
pub use diesel_feedback_repository::DieselFeedbackRepository;
pub use diesel_mechanic_repository::DieselMechanicRepository;
pub use diesel_service_request_repository::DieselServiceRequestRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
