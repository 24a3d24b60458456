//! PostgreSQL-backed `MechanicRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{MechanicRepository, MechanicRepositoryError};
use crate::domain::{AccountId, Coordinates, Location, Mechanic, MechanicId};

use super::error_mapping::StoreFailure;
use super::models::{MechanicLocationUpdate, MechanicRow};
use super::pool::DbPool;
use super::schema::mechanics;

/// Diesel-backed mechanic directory.
#[derive(Clone)]
pub struct DieselMechanicRepository {
    pool: DbPool,
}

impl DieselMechanicRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: impl Into<StoreFailure>) -> MechanicRepositoryError {
    match failure.into() {
        StoreFailure::Connection(message) => MechanicRepositoryError::connection(message),
        other => MechanicRepositoryError::query(other.message()),
    }
}

fn decode(row: MechanicRow) -> Result<Mechanic, MechanicRepositoryError> {
    Mechanic::try_from(row).map_err(|err| MechanicRepositoryError::query(err.to_string()))
}

#[async_trait]
impl MechanicRepository for DieselMechanicRepository {
    async fn find_by_id(
        &self,
        id: &MechanicId,
    ) -> Result<Option<Mechanic>, MechanicRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;
        mechanics::table
            .find(id.as_uuid())
            .select(MechanicRow::as_select())
            .first::<MechanicRow>(&mut conn)
            .await
            .optional()
            .map_err(map_failure)?
            .map(decode)
            .transpose()
    }

    async fn find_by_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Option<Mechanic>, MechanicRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;
        mechanics::table
            .filter(mechanics::account_id.eq(account_id.as_uuid()))
            .select(MechanicRow::as_select())
            .first::<MechanicRow>(&mut conn)
            .await
            .optional()
            .map_err(map_failure)?
            .map(decode)
            .transpose()
    }

    async fn list_searchable(&self) -> Result<Vec<Mechanic>, MechanicRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;
        let rows: Vec<MechanicRow> = mechanics::table
            .filter(mechanics::approved.eq(true))
            .filter(mechanics::available.eq(true))
            .filter(mechanics::latitude.is_not_null())
            .filter(mechanics::longitude.is_not_null())
            .order((mechanics::created_at.asc(), mechanics::id.asc()))
            .select(MechanicRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_failure)?;
        rows.into_iter().map(decode).collect()
    }

    async fn set_availability(
        &self,
        id: &MechanicId,
        available: bool,
    ) -> Result<Option<Mechanic>, MechanicRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;
        diesel::update(mechanics::table.find(id.as_uuid()))
            .set(mechanics::available.eq(available))
            .returning(MechanicRow::as_returning())
            .get_result::<MechanicRow>(&mut conn)
            .await
            .optional()
            .map_err(map_failure)?
            .map(decode)
            .transpose()
    }

    async fn update_location(
        &self,
        id: &MechanicId,
        address: &Location,
        coordinates: Option<Coordinates>,
    ) -> Result<Option<Mechanic>, MechanicRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;
        let changes = MechanicLocationUpdate {
            address: address.as_str(),
            latitude: coordinates.map(|point| point.latitude()),
            longitude: coordinates.map(|point| point.longitude()),
        };
        diesel::update(mechanics::table.find(id.as_uuid()))
            .set(&changes)
            .returning(MechanicRow::as_returning())
            .get_result::<MechanicRow>(&mut conn)
            .await
            .optional()
            .map_err(map_failure)?
            .map(decode)
            .transpose()
    }
}
