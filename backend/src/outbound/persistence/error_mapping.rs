//! Classification of pool and Diesel failures shared by the repositories.
//!
//! Each repository turns a [`StoreFailure`] into its own port error, so the
//! decision of what counts as a connection problem lives in one place.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Storage failure reduced to the cases the ports distinguish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StoreFailure {
    /// The database could not be reached or dropped the connection.
    Connection(String),
    /// A unique constraint rejected the write.
    UniqueViolation { constraint: Option<String> },
    /// Any other query failure.
    Query(String),
}

impl From<PoolError> for StoreFailure {
    fn from(error: PoolError) -> Self {
        Self::Connection(error.to_string())
    }
}

impl From<DieselError> for StoreFailure {
    fn from(error: DieselError) -> Self {
        match error {
            DieselError::DatabaseError(kind, info) => {
                debug!(?kind, message = info.message(), "database rejected statement");
                match kind {
                    DatabaseErrorKind::UniqueViolation => Self::UniqueViolation {
                        constraint: info.constraint_name().map(str::to_owned),
                    },
                    DatabaseErrorKind::ClosedConnection => {
                        Self::Connection("database connection closed".to_owned())
                    }
                    _ => Self::Query("database error".to_owned()),
                }
            }
            DieselError::NotFound => Self::Query("record not found".to_owned()),
            DieselError::QueryBuilderError(_) => Self::Query("query could not be built".to_owned()),
            other => {
                debug!(error = %other, "diesel operation failed");
                Self::Query("database error".to_owned())
            }
        }
    }
}

impl StoreFailure {
    /// Message for variants that carry no constraint.
    pub(crate) fn message(&self) -> String {
        match self {
            Self::Connection(message) | Self::Query(message) => message.clone(),
            Self::UniqueViolation { constraint } => format!(
                "unique constraint {} violated",
                constraint.as_deref().unwrap_or("(unnamed)")
            ),
        }
    }
}
