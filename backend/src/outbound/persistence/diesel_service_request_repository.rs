//! PostgreSQL-backed `ServiceRequestRepository`.
//!
//! Lifecycle transitions compile to a single conditional update:
//!
//! ```sql
//! UPDATE service_requests SET status = $4, mechanic_id = $5
//! WHERE id = $1 AND status = $2 AND mechanic_id IS NOT DISTINCT FROM $3
//! RETURNING *
//! ```
//!
//! so two concurrent writers observing the same state cannot both succeed.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{ServiceRequestRepository, ServiceRequestRepositoryError};
use crate::domain::{
    AccountId, MechanicId, RequestChange, ServiceRequest, ServiceRequestId, ServiceRequestStatus,
    UpdateGuard,
};

use super::error_mapping::StoreFailure;
use super::models::{NewServiceRequestRow, ServiceRequestRow};
use super::pool::DbPool;
use super::schema::service_requests;

/// Diesel-backed request storage.
#[derive(Clone)]
pub struct DieselServiceRequestRepository {
    pool: DbPool,
}

impl DieselServiceRequestRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: impl Into<StoreFailure>) -> ServiceRequestRepositoryError {
    match failure.into() {
        StoreFailure::Connection(message) => ServiceRequestRepositoryError::connection(message),
        other => ServiceRequestRepositoryError::query(other.message()),
    }
}

fn decode_all(
    rows: Vec<ServiceRequestRow>,
) -> Result<Vec<ServiceRequest>, ServiceRequestRepositoryError> {
    rows.into_iter().map(decode).collect()
}

fn decode(row: ServiceRequestRow) -> Result<ServiceRequest, ServiceRequestRepositoryError> {
    ServiceRequest::try_from(row)
        .map_err(|err| ServiceRequestRepositoryError::query(err.to_string()))
}

#[async_trait]
impl ServiceRequestRepository for DieselServiceRequestRepository {
    async fn insert(&self, request: &ServiceRequest) -> Result<(), ServiceRequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;
        diesel::insert_into(service_requests::table)
            .values(NewServiceRequestRow::from(request))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_failure)
    }

    async fn find_by_id(
        &self,
        id: &ServiceRequestId,
    ) -> Result<Option<ServiceRequest>, ServiceRequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;
        service_requests::table
            .find(id.as_uuid())
            .select(ServiceRequestRow::as_select())
            .first::<ServiceRequestRow>(&mut conn)
            .await
            .optional()
            .map_err(map_failure)?
            .map(decode)
            .transpose()
    }

    async fn list_by_requester(
        &self,
        requester_id: &AccountId,
    ) -> Result<Vec<ServiceRequest>, ServiceRequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;
        let rows = service_requests::table
            .filter(service_requests::requester_id.eq(requester_id.as_uuid()))
            .order((
                service_requests::created_at.desc(),
                service_requests::id.desc(),
            ))
            .select(ServiceRequestRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_failure)?;
        decode_all(rows)
    }

    async fn list_by_mechanic(
        &self,
        mechanic_id: &MechanicId,
    ) -> Result<Vec<ServiceRequest>, ServiceRequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;
        let rows = service_requests::table
            .filter(service_requests::mechanic_id.eq(mechanic_id.as_uuid()))
            .order((
                service_requests::created_at.desc(),
                service_requests::id.desc(),
            ))
            .select(ServiceRequestRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_failure)?;
        decode_all(rows)
    }

    async fn list_open(&self) -> Result<Vec<ServiceRequest>, ServiceRequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;
        let rows = service_requests::table
            .filter(service_requests::status.eq(ServiceRequestStatus::Pending.as_str()))
            .filter(service_requests::mechanic_id.is_null())
            .order((
                service_requests::created_at.desc(),
                service_requests::id.desc(),
            ))
            .select(ServiceRequestRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_failure)?;
        decode_all(rows)
    }

    async fn transition(
        &self,
        id: &ServiceRequestId,
        guard: &UpdateGuard,
        change: &RequestChange,
    ) -> Result<Option<ServiceRequest>, ServiceRequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;
        let expected_mechanic = guard.mechanic_id.map(Uuid::from);
        let target = service_requests::table
            .filter(service_requests::id.eq(id.as_uuid()))
            .filter(service_requests::status.eq(guard.status.as_str()))
            .filter(service_requests::mechanic_id.is_not_distinct_from(expected_mechanic));
        diesel::update(target)
            .set((
                service_requests::status.eq(change.status.as_str()),
                service_requests::mechanic_id.eq(change.mechanic_id.map(Uuid::from)),
            ))
            .returning(ServiceRequestRow::as_returning())
            .get_result::<ServiceRequestRow>(&mut conn)
            .await
            .optional()
            .map_err(map_failure)?
            .map(decode)
            .transpose()
    }
}
