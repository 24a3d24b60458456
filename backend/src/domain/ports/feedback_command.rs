//! Driving port for rating completed service requests.

use async_trait::async_trait;

use crate::domain::{AccountId, Error, Feedback, ServiceRequestId};

/// Raw feedback form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitFeedbackRequest {
    pub author_id: AccountId,
    pub service_request_id: ServiceRequestId,
    pub rating: i64,
    pub comment: Option<String>,
}

/// Domain use-case port for the feedback ledger.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedbackCommand: Send + Sync {
    /// Record the author's rating of a completed request.
    ///
    /// # Errors
    ///
    /// - `invalid_request` for a rating outside 1..=5 or an overlong comment.
    /// - `not_found` when the request does not exist.
    /// - `forbidden` when the author does not own the request.
    /// - `conflict` when the request is not Completed, or when it was already
    ///   rated and the deployment rejects resubmission.
    async fn submit(&self, request: SubmitFeedbackRequest) -> Result<Feedback, Error>;
}
