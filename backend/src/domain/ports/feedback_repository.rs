//! Port abstraction for the feedback ledger.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::{AccountId, Feedback, MechanicId, RatingTotals, ServiceRequestId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by feedback repository adapters.
    pub enum FeedbackRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "feedback repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "feedback repository query failed: {message}",
        /// The author already rated this request.
        Duplicate { message: String } => "feedback already exists: {message}",
    }
}

/// Storage and aggregation for feedback records.
///
/// At most one record exists per `(author, service request)` pair.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    /// Insert a new record, failing with
    /// [`FeedbackRepositoryError::Duplicate`] if the pair is taken.
    async fn insert(&self, feedback: &Feedback) -> Result<(), FeedbackRepositoryError>;

    /// Insert or overwrite the record for the pair.
    ///
    /// An existing record keeps its identifier and `created_at`; rating,
    /// comment and `updated_at` are replaced. Returns the stored record.
    async fn upsert(&self, feedback: &Feedback) -> Result<Feedback, FeedbackRepositoryError>;

    /// Record left by `author_id` on a request, if any.
    async fn find_for_request(
        &self,
        author_id: &AccountId,
        service_request_id: &ServiceRequestId,
    ) -> Result<Option<Feedback>, FeedbackRepositoryError>;

    /// All records about a mechanic, newest first.
    async fn list_for_mechanic(
        &self,
        mechanic_id: &MechanicId,
    ) -> Result<Vec<Feedback>, FeedbackRepositoryError>;

    /// Rating sum and count per mechanic.
    ///
    /// Mechanics without feedback are absent from the map.
    async fn rating_totals(
        &self,
        mechanic_ids: &[MechanicId],
    ) -> Result<HashMap<MechanicId, RatingTotals>, FeedbackRepositoryError>;
}
