//! PostgreSQL-backed `FeedbackRepository`.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::dsl::{count, sum};
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{FeedbackRepository, FeedbackRepositoryError};
use crate::domain::{AccountId, Feedback, MechanicId, RatingTotals, ServiceRequestId};

use super::error_mapping::StoreFailure;
use super::models::{FeedbackRow, NewFeedbackRow};
use super::pool::DbPool;
use super::schema::feedback;

/// Diesel-backed feedback ledger.
#[derive(Clone)]
pub struct DieselFeedbackRepository {
    pool: DbPool,
}

impl DieselFeedbackRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: impl Into<StoreFailure>) -> FeedbackRepositoryError {
    match failure.into() {
        StoreFailure::Connection(message) => FeedbackRepositoryError::connection(message),
        failure @ StoreFailure::UniqueViolation { .. } => {
            FeedbackRepositoryError::duplicate(failure.message())
        }
        StoreFailure::Query(message) => FeedbackRepositoryError::query(message),
    }
}

fn decode(row: FeedbackRow) -> Result<Feedback, FeedbackRepositoryError> {
    Feedback::try_from(row).map_err(|err| FeedbackRepositoryError::query(err.to_string()))
}

/// Fold `(mechanic, sum, count)` aggregate rows into the port's map.
fn totals_from_rows(
    rows: Vec<(Uuid, Option<i64>, i64)>,
) -> Result<HashMap<MechanicId, RatingTotals>, FeedbackRepositoryError> {
    rows.into_iter()
        .map(|(mechanic_id, rating_sum, rating_count)| {
            let sum = u64::try_from(rating_sum.unwrap_or_default()).map_err(|_| {
                FeedbackRepositoryError::query(format!("negative rating sum for {mechanic_id}"))
            })?;
            let count = u64::try_from(rating_count).map_err(|_| {
                FeedbackRepositoryError::query(format!("negative rating count for {mechanic_id}"))
            })?;
            Ok((MechanicId::from_uuid(mechanic_id), RatingTotals { sum, count }))
        })
        .collect()
}

#[async_trait]
impl FeedbackRepository for DieselFeedbackRepository {
    async fn insert(&self, record: &Feedback) -> Result<(), FeedbackRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;
        diesel::insert_into(feedback::table)
            .values(NewFeedbackRow::from(record))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_failure)
    }

    async fn upsert(&self, record: &Feedback) -> Result<Feedback, FeedbackRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;
        let row = diesel::insert_into(feedback::table)
            .values(NewFeedbackRow::from(record))
            .on_conflict((feedback::author_id, feedback::service_request_id))
            .do_update()
            .set((
                feedback::rating.eq(excluded(feedback::rating)),
                feedback::comment.eq(excluded(feedback::comment)),
                feedback::updated_at.eq(excluded(feedback::updated_at)),
            ))
            .returning(FeedbackRow::as_returning())
            .get_result::<FeedbackRow>(&mut conn)
            .await
            .map_err(map_failure)?;
        decode(row)
    }

    async fn find_for_request(
        &self,
        author_id: &AccountId,
        service_request_id: &ServiceRequestId,
    ) -> Result<Option<Feedback>, FeedbackRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;
        feedback::table
            .filter(feedback::author_id.eq(author_id.as_uuid()))
            .filter(feedback::service_request_id.eq(service_request_id.as_uuid()))
            .select(FeedbackRow::as_select())
            .first::<FeedbackRow>(&mut conn)
            .await
            .optional()
            .map_err(map_failure)?
            .map(decode)
            .transpose()
    }

    async fn list_for_mechanic(
        &self,
        mechanic_id: &MechanicId,
    ) -> Result<Vec<Feedback>, FeedbackRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;
        let rows: Vec<FeedbackRow> = feedback::table
            .filter(feedback::mechanic_id.eq(mechanic_id.as_uuid()))
            .order((feedback::created_at.desc(), feedback::id.desc()))
            .select(FeedbackRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_failure)?;
        rows.into_iter().map(decode).collect()
    }

    async fn rating_totals(
        &self,
        mechanic_ids: &[MechanicId],
    ) -> Result<HashMap<MechanicId, RatingTotals>, FeedbackRepositoryError> {
        if mechanic_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let ids: Vec<Uuid> = mechanic_ids.iter().copied().map(Uuid::from).collect();
        let mut conn = self.pool.get().await.map_err(map_failure)?;
        let rows: Vec<(Uuid, Option<i64>, i64)> = feedback::table
            .filter(feedback::mechanic_id.eq_any(ids))
            .group_by(feedback::mechanic_id)
            .select((
                feedback::mechanic_id,
                sum(feedback::rating),
                count(feedback::id),
            ))
            .load(&mut conn)
            .await
            .map_err(map_failure)?;
        totals_from_rows(rows)
    }
}
