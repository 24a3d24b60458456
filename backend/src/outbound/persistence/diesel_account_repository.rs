//! PostgreSQL-backed `AccountRepository`.
//!
//! Mechanic accounts are written together with their profile in one
//! transaction; unique violations are translated back into the field the
//! user has to change.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;

use crate::domain::ports::{AccountRepository, AccountRepositoryError, NewAccount};
use crate::domain::{Account, AccountId};

use super::error_mapping::StoreFailure;
use super::models::{AccountRow, NewAccountRow, NewMechanicRow};
use super::pool::DbPool;
use super::schema::{accounts, mechanics};

/// Diesel-backed account storage.
#[derive(Clone)]
pub struct DieselAccountRepository {
    pool: DbPool,
}

impl DieselAccountRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Field reported to the user for a violated unique constraint.
fn duplicate_field(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("accounts_username_key") => "username",
        Some("accounts_email_key") => "email",
        Some("mechanics_phone_key") => "phone",
        _ => "account",
    }
}

fn map_failure(failure: impl Into<StoreFailure>) -> AccountRepositoryError {
    match failure.into() {
        StoreFailure::Connection(message) => AccountRepositoryError::connection(message),
        StoreFailure::UniqueViolation { constraint } => {
            AccountRepositoryError::duplicate(duplicate_field(constraint.as_deref()))
        }
        StoreFailure::Query(message) => AccountRepositoryError::query(message),
    }
}

fn decode(row: AccountRow) -> Result<Account, AccountRepositoryError> {
    Account::try_from(row).map_err(|err| AccountRepositoryError::query(err.to_string()))
}

#[async_trait]
impl AccountRepository for DieselAccountRepository {
    async fn create(&self, new_account: &NewAccount) -> Result<(), AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;
        let account_row = NewAccountRow::from(&new_account.account);
        let mechanic_row = new_account.mechanic.as_ref().map(NewMechanicRow::from);

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                diesel::insert_into(accounts::table)
                    .values(&account_row)
                    .execute(conn)
                    .await?;
                if let Some(row) = &mechanic_row {
                    diesel::insert_into(mechanics::table)
                        .values(row)
                        .execute(conn)
                        .await?;
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_failure)
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;
        let row = accounts::table
            .find(id.as_uuid())
            .select(AccountRow::as_select())
            .first::<AccountRow>(&mut conn)
            .await
            .optional()
            .map_err(map_failure)?;
        row.map(decode).transpose()
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Account>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_failure)?;
        let row = accounts::table
            .filter(accounts::username.eq(username))
            .select(AccountRow::as_select())
            .first::<AccountRow>(&mut conn)
            .await
            .optional()
            .map_err(map_failure)?;
        row.map(decode).transpose()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Some("accounts_username_key"), "username")]
    #[case(Some("accounts_email_key"), "email")]
    #[case(Some("mechanics_phone_key"), "phone")]
    #[case(Some("mechanics_account_id_key"), "account")]
    #[case(None, "account")]
    fn unique_violations_name_the_offending_field(
        #[case] constraint: Option<&str>,
        #[case] field: &str,
    ) {
        let err = map_failure(StoreFailure::UniqueViolation {
            constraint: constraint.map(str::to_owned),
        });
        assert_eq!(err, AccountRepositoryError::duplicate(field));
    }

    #[test]
    fn closed_connections_are_reported_as_unavailable() {
        let err = map_failure(StoreFailure::Connection("closed".to_owned()));
        assert!(matches!(err, AccountRepositoryError::Connection { .. }));
    }
}
