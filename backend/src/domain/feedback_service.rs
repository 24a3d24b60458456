//! Feedback submission for completed service requests.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    FeedbackCommand, FeedbackRepository, ServiceRequestRepository, SubmitFeedbackRequest,
};
use crate::domain::service_support::{map_feedback_error, map_request_error};
use crate::domain::{Error, Feedback, FeedbackComment, FeedbackId, FeedbackPolicy, Rating};

/// Service implementing [`FeedbackCommand`].
#[derive(Clone)]
pub struct FeedbackService<R, F> {
    requests: Arc<R>,
    feedback: Arc<F>,
    clock: Arc<dyn Clock>,
    policy: FeedbackPolicy,
}

impl<R, F> FeedbackService<R, F> {
    /// Create a service that overwrites repeat submissions.
    pub fn new(requests: Arc<R>, feedback: Arc<F>, clock: Arc<dyn Clock>) -> Self {
        Self {
            requests,
            feedback,
            clock,
            policy: FeedbackPolicy::default(),
        }
    }

    /// Choose how repeat submissions for the same request are handled.
    #[must_use]
    pub fn with_policy(mut self, policy: FeedbackPolicy) -> Self {
        self.policy = policy;
        self
    }
}

#[async_trait]
impl<R, F> FeedbackCommand for FeedbackService<R, F>
where
    R: ServiceRequestRepository,
    F: FeedbackRepository,
{
    async fn submit(&self, form: SubmitFeedbackRequest) -> Result<Feedback, Error> {
        let rating = Rating::new(form.rating)?;
        let comment = FeedbackComment::parse(form.comment.as_deref())?;

        let request = self
            .requests
            .find_by_id(&form.service_request_id)
            .await
            .map_err(map_request_error)?
            .ok_or_else(|| {
                Error::not_found(format!(
                    "service request {} not found",
                    form.service_request_id
                ))
            })?;
        if !request.is_owned_by(form.author_id) {
            warn!(request_id = %request.id, actor = %form.author_id, "feedback by non-owner refused");
            return Err(Error::forbidden("only the requester may rate this request"));
        }
        let Some(mechanic_id) = request.mechanic_id.filter(|_| request.can_give_feedback()) else {
            return Err(Error::conflict(format!(
                "feedback needs a completed request; this one is {}",
                request.status
            )));
        };

        let now = self.clock.utc();
        let record = Feedback {
            id: FeedbackId::random(),
            author_id: form.author_id,
            mechanic_id,
            service_request_id: request.id,
            rating,
            comment,
            created_at: now,
            updated_at: now,
        };
        let stored = match self.policy {
            FeedbackPolicy::Overwrite => self
                .feedback
                .upsert(&record)
                .await
                .map_err(map_feedback_error)?,
            FeedbackPolicy::Reject => {
                self.feedback
                    .insert(&record)
                    .await
                    .map_err(map_feedback_error)?;
                record
            }
        };
        info!(
            feedback_id = %stored.id,
            request_id = %stored.service_request_id,
            mechanic_id = %stored.mechanic_id,
            rating = stored.rating.value(),
            "feedback recorded"
        );
        Ok(stored)
    }
}

#[cfg(test)]
#[path = "feedback_service_tests.rs"]
mod tests;
