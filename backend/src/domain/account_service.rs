//! Account registration, login and profile lookup.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    AccountProfile, AccountRepository, AccountsCommand, AccountsQuery, Geocoder, LoginService,
    MechanicRegistration, MechanicRepository, NewAccount, PasswordHasher, PasswordHasherError,
    RegisterAccountRequest,
};
use crate::domain::service_support::{map_account_error, map_mechanic_error, resolve_coordinates};
use crate::domain::{
    Account, AccountId, AccountRole, AuthenticatedAccount, EmailAddress, Error, Location,
    LoginCredentials, Mechanic, MechanicId, NewPassword, PhoneNumber, ServiceCentreName,
    Specialization, Username, field_error,
};

/// Service implementing [`AccountsCommand`], [`AccountsQuery`] and
/// [`LoginService`].
#[derive(Clone)]
pub struct AccountService<A, M> {
    accounts: Arc<A>,
    mechanics: Arc<M>,
    hasher: Arc<dyn PasswordHasher>,
    geocoder: Arc<dyn Geocoder>,
    clock: Arc<dyn Clock>,
    auto_approve_mechanics: bool,
}

impl<A, M> AccountService<A, M> {
    /// Create a service that auto-approves new mechanics.
    pub fn new(
        accounts: Arc<A>,
        mechanics: Arc<M>,
        hasher: Arc<dyn PasswordHasher>,
        geocoder: Arc<dyn Geocoder>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            accounts,
            mechanics,
            hasher,
            geocoder,
            clock,
            auto_approve_mechanics: true,
        }
    }

    /// Choose whether new mechanic profiles start approved.
    #[must_use]
    pub fn with_auto_approve_mechanics(mut self, auto_approve: bool) -> Self {
        self.auto_approve_mechanics = auto_approve;
        self
    }
}

fn map_hasher_error(err: PasswordHasherError) -> Error {
    Error::internal(format!("password hashing failed: {err}"))
}

impl<A, M> AccountService<A, M>
where
    A: AccountRepository,
    M: MechanicRepository,
{
    async fn build_mechanic(
        &self,
        account_id: AccountId,
        form: &MechanicRegistration,
    ) -> Result<Mechanic, Error> {
        let service_centre_name = ServiceCentreName::parse(&form.service_centre_name)?;
        let phone = PhoneNumber::parse(&form.phone)?;
        let address = Location::parse(&form.address)?;
        let specialization = form
            .specialization
            .as_deref()
            .map(Specialization::parse)
            .transpose()?
            .flatten();
        let coordinates =
            resolve_coordinates(self.geocoder.as_ref(), form.latitude, form.longitude, &address)
                .await?;

        Ok(Mechanic {
            id: MechanicId::random(),
            account_id,
            service_centre_name,
            phone,
            address,
            coordinates,
            specialization,
            approved: self.auto_approve_mechanics,
            available: true,
            created_at: self.clock.utc(),
        })
    }
}

#[async_trait]
impl<A, M> AccountsCommand for AccountService<A, M>
where
    A: AccountRepository,
    M: MechanicRepository,
{
    async fn register(&self, request: RegisterAccountRequest) -> Result<AccountProfile, Error> {
        let username = Username::parse(&request.username)?;
        let email = EmailAddress::parse(&request.email)?;
        let password = NewPassword::parse(&request.password, &request.password_confirmation)?;

        let account_id = AccountId::random();
        let mechanic = match (request.role, request.mechanic.as_ref()) {
            (AccountRole::Mechanic, Some(form)) => Some(self.build_mechanic(account_id, form).await?),
            (AccountRole::Mechanic, None) => {
                return Err(field_error(
                    "mechanic",
                    "mechanic_profile_required",
                    "mechanic accounts need service centre details",
                ));
            }
            (AccountRole::Requester, Some(_)) => {
                return Err(field_error(
                    "mechanic",
                    "unexpected_mechanic_profile",
                    "requester accounts cannot carry mechanic details",
                ));
            }
            (AccountRole::Requester, None) => None,
        };

        let password_hash = self
            .hasher
            .hash(password.expose())
            .map_err(map_hasher_error)?;
        let account = Account {
            id: account_id,
            username,
            email,
            role: request.role,
            password_hash,
            created_at: self.clock.utc(),
        };
        let new_account = NewAccount { account, mechanic };
        self.accounts
            .create(&new_account)
            .await
            .map_err(map_account_error)?;

        info!(
            account_id = %new_account.account.id,
            role = %new_account.account.role,
            located = new_account
                .mechanic
                .as_ref()
                .is_some_and(|mechanic| mechanic.coordinates.is_some()),
            "account registered"
        );
        Ok(AccountProfile {
            account: new_account.account,
            mechanic: new_account.mechanic,
        })
    }
}

#[async_trait]
impl<A, M> LoginService for AccountService<A, M>
where
    A: AccountRepository,
    M: MechanicRepository,
{
    async fn authenticate(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthenticatedAccount, Error> {
        let account = self
            .accounts
            .find_by_username(credentials.username())
            .await
            .map_err(map_account_error)?;
        let Some(account) = account else {
            warn!("login rejected for unknown username");
            return Err(Error::unauthorized("invalid credentials"));
        };
        let verified = self
            .hasher
            .verify(credentials.password(), &account.password_hash)
            .map_err(map_hasher_error)?;
        if !verified {
            warn!(account_id = %account.id, "login rejected for wrong password");
            return Err(Error::unauthorized("invalid credentials"));
        }
        Ok(AuthenticatedAccount {
            account_id: account.id,
            role: account.role,
        })
    }
}

#[async_trait]
impl<A, M> AccountsQuery for AccountService<A, M>
where
    A: AccountRepository,
    M: MechanicRepository,
{
    async fn profile(&self, account_id: &AccountId) -> Result<AccountProfile, Error> {
        let account = self
            .accounts
            .find_by_id(account_id)
            .await
            .map_err(map_account_error)?
            .ok_or_else(|| Error::unauthorized("account no longer exists"))?;
        let mechanic = if account.is_mechanic() {
            self.mechanics
                .find_by_account(account_id)
                .await
                .map_err(map_mechanic_error)?
        } else {
            None
        };
        Ok(AccountProfile { account, mechanic })
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
