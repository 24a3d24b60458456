//! Outbound adapters implementing the driven ports.
//!
//! - **memory**: mutex-guarded tables used when no database is configured
//! - **persistence**: PostgreSQL repositories on Diesel
//! - **geocoding**: Nominatim lookups with client-side rate limiting
//! - **security**: Argon2id password hashing
//!
//! Adapters translate between domain types and infrastructure
//! representations and hold no business rules.

pub mod geocoding;
pub mod memory;
pub mod persistence;
pub mod security;
