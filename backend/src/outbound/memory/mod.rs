//! In-process repositories backed by a shared, mutex-guarded store.
//!
//! [`InMemoryStore`] implements every repository port over one set of tables,
//! so creating an account and its mechanic profile is a single critical
//! section, and a lifecycle transition compares and writes under the same
//! lock. The server falls back to it when no database is configured; tests
//! use it for end-to-end flows.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{
    AccountRepository, AccountRepositoryError, FeedbackRepository, FeedbackRepositoryError,
    MechanicRepository, MechanicRepositoryError, NewAccount, ServiceRequestRepository,
    ServiceRequestRepositoryError,
};
use crate::domain::{
    Account, AccountId, Coordinates, Feedback, Location, Mechanic, MechanicId, RatingTotals,
    RequestChange, ServiceRequest, ServiceRequestId, ServiceRequestStatus, UpdateGuard,
};

#[derive(Debug, Default)]
struct Tables {
    accounts: Vec<Account>,
    mechanics: Vec<Mechanic>,
    requests: Vec<ServiceRequest>,
    feedback: Vec<Feedback>,
}

/// Shared in-memory tables. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, String> {
        self.tables
            .lock()
            .map_err(|_| "in-memory store lock poisoned".to_owned())
    }
}

fn newest_first<'a, T: 'a, K: Ord>(
    rows: impl DoubleEndedIterator<Item = &'a T>,
    key: impl Fn(&T) -> K,
) -> Vec<T>
where
    T: Clone,
{
    let mut out: Vec<T> = rows.rev().cloned().collect();
    out.sort_by_key(|row| std::cmp::Reverse(key(row)));
    out
}

#[async_trait]
impl AccountRepository for InMemoryStore {
    async fn create(&self, new_account: &NewAccount) -> Result<(), AccountRepositoryError> {
        let mut tables = self.lock().map_err(AccountRepositoryError::query)?;
        let account = &new_account.account;
        if tables
            .accounts
            .iter()
            .any(|existing| existing.username == account.username)
        {
            return Err(AccountRepositoryError::duplicate("username"));
        }
        if tables
            .accounts
            .iter()
            .any(|existing| existing.email == account.email)
        {
            return Err(AccountRepositoryError::duplicate("email"));
        }
        if let Some(mechanic) = &new_account.mechanic {
            if tables
                .mechanics
                .iter()
                .any(|existing| existing.phone == mechanic.phone)
            {
                return Err(AccountRepositoryError::duplicate("phone"));
            }
            tables.mechanics.push(mechanic.clone());
        }
        tables.accounts.push(account.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountRepositoryError> {
        let tables = self.lock().map_err(AccountRepositoryError::query)?;
        Ok(tables.accounts.iter().find(|a| a.id == *id).cloned())
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Account>, AccountRepositoryError> {
        let tables = self.lock().map_err(AccountRepositoryError::query)?;
        Ok(tables
            .accounts
            .iter()
            .find(|a| a.username.as_str() == username)
            .cloned())
    }
}

impl Tables {
    fn mechanic_mut(&mut self, id: &MechanicId) -> Option<&mut Mechanic> {
        self.mechanics.iter_mut().find(|m| m.id == *id)
    }
}

#[async_trait]
impl MechanicRepository for InMemoryStore {
    async fn find_by_id(
        &self,
        id: &MechanicId,
    ) -> Result<Option<Mechanic>, MechanicRepositoryError> {
        let tables = self.lock().map_err(MechanicRepositoryError::query)?;
        Ok(tables.mechanics.iter().find(|m| m.id == *id).cloned())
    }

    async fn find_by_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Option<Mechanic>, MechanicRepositoryError> {
        let tables = self.lock().map_err(MechanicRepositoryError::query)?;
        Ok(tables
            .mechanics
            .iter()
            .find(|m| m.account_id == *account_id)
            .cloned())
    }

    async fn list_searchable(&self) -> Result<Vec<Mechanic>, MechanicRepositoryError> {
        let tables = self.lock().map_err(MechanicRepositoryError::query)?;
        Ok(tables
            .mechanics
            .iter()
            .filter(|m| m.is_searchable())
            .cloned()
            .collect())
    }

    async fn set_availability(
        &self,
        id: &MechanicId,
        available: bool,
    ) -> Result<Option<Mechanic>, MechanicRepositoryError> {
        let mut tables = self.lock().map_err(MechanicRepositoryError::query)?;
        Ok(tables.mechanic_mut(id).map(|mechanic| {
            mechanic.available = available;
            mechanic.clone()
        }))
    }

    async fn update_location(
        &self,
        id: &MechanicId,
        address: &Location,
        coordinates: Option<Coordinates>,
    ) -> Result<Option<Mechanic>, MechanicRepositoryError> {
        let mut tables = self.lock().map_err(MechanicRepositoryError::query)?;
        Ok(tables.mechanic_mut(id).map(|mechanic| {
            mechanic.address = address.clone();
            mechanic.coordinates = coordinates;
            mechanic.clone()
        }))
    }
}

#[async_trait]
impl ServiceRequestRepository for InMemoryStore {
    async fn insert(&self, request: &ServiceRequest) -> Result<(), ServiceRequestRepositoryError> {
        let mut tables = self.lock().map_err(ServiceRequestRepositoryError::query)?;
        if tables.requests.iter().any(|r| r.id == request.id) {
            return Err(ServiceRequestRepositoryError::query(format!(
                "service request {} already exists",
                request.id
            )));
        }
        tables.requests.push(request.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &ServiceRequestId,
    ) -> Result<Option<ServiceRequest>, ServiceRequestRepositoryError> {
        let tables = self.lock().map_err(ServiceRequestRepositoryError::query)?;
        Ok(tables.requests.iter().find(|r| r.id == *id).cloned())
    }

    async fn list_by_requester(
        &self,
        requester_id: &AccountId,
    ) -> Result<Vec<ServiceRequest>, ServiceRequestRepositoryError> {
        let tables = self.lock().map_err(ServiceRequestRepositoryError::query)?;
        Ok(newest_first(
            tables
                .requests
                .iter()
                .filter(|r| r.requester_id == *requester_id),
            |r| r.created_at,
        ))
    }

    async fn list_by_mechanic(
        &self,
        mechanic_id: &MechanicId,
    ) -> Result<Vec<ServiceRequest>, ServiceRequestRepositoryError> {
        let tables = self.lock().map_err(ServiceRequestRepositoryError::query)?;
        Ok(newest_first(
            tables
                .requests
                .iter()
                .filter(|r| r.mechanic_id == Some(*mechanic_id)),
            |r| r.created_at,
        ))
    }

    async fn list_open(&self) -> Result<Vec<ServiceRequest>, ServiceRequestRepositoryError> {
        let tables = self.lock().map_err(ServiceRequestRepositoryError::query)?;
        Ok(newest_first(
            tables.requests.iter().filter(|r| {
                r.status == ServiceRequestStatus::Pending && r.mechanic_id.is_none()
            }),
            |r| r.created_at,
        ))
    }

    async fn transition(
        &self,
        id: &ServiceRequestId,
        guard: &UpdateGuard,
        change: &RequestChange,
    ) -> Result<Option<ServiceRequest>, ServiceRequestRepositoryError> {
        let mut tables = self.lock().map_err(ServiceRequestRepositoryError::query)?;
        let Some(stored) = tables.requests.iter_mut().find(|r| r.id == *id) else {
            return Ok(None);
        };
        if !stored.matches(guard) {
            return Ok(None);
        }
        stored.status = change.status;
        stored.mechanic_id = change.mechanic_id;
        Ok(Some(stored.clone()))
    }
}

#[async_trait]
impl FeedbackRepository for InMemoryStore {
    async fn insert(&self, feedback: &Feedback) -> Result<(), FeedbackRepositoryError> {
        let mut tables = self.lock().map_err(FeedbackRepositoryError::query)?;
        if tables.feedback.iter().any(|f| {
            f.author_id == feedback.author_id
                && f.service_request_id == feedback.service_request_id
        }) {
            return Err(FeedbackRepositoryError::duplicate(format!(
                "author {} already rated request {}",
                feedback.author_id, feedback.service_request_id
            )));
        }
        tables.feedback.push(feedback.clone());
        Ok(())
    }

    async fn upsert(&self, feedback: &Feedback) -> Result<Feedback, FeedbackRepositoryError> {
        let mut tables = self.lock().map_err(FeedbackRepositoryError::query)?;
        let existing = tables.feedback.iter_mut().find(|f| {
            f.author_id == feedback.author_id
                && f.service_request_id == feedback.service_request_id
        });
        match existing {
            Some(stored) => {
                stored.rating = feedback.rating;
                stored.comment = feedback.comment.clone();
                stored.updated_at = feedback.updated_at;
                Ok(stored.clone())
            }
            None => {
                tables.feedback.push(feedback.clone());
                Ok(feedback.clone())
            }
        }
    }

    async fn find_for_request(
        &self,
        author_id: &AccountId,
        service_request_id: &ServiceRequestId,
    ) -> Result<Option<Feedback>, FeedbackRepositoryError> {
        let tables = self.lock().map_err(FeedbackRepositoryError::query)?;
        Ok(tables
            .feedback
            .iter()
            .find(|f| f.author_id == *author_id && f.service_request_id == *service_request_id)
            .cloned())
    }

    async fn list_for_mechanic(
        &self,
        mechanic_id: &MechanicId,
    ) -> Result<Vec<Feedback>, FeedbackRepositoryError> {
        let tables = self.lock().map_err(FeedbackRepositoryError::query)?;
        Ok(newest_first(
            tables
                .feedback
                .iter()
                .filter(|f| f.mechanic_id == *mechanic_id),
            |f| f.created_at,
        ))
    }

    async fn rating_totals(
        &self,
        mechanic_ids: &[MechanicId],
    ) -> Result<HashMap<MechanicId, RatingTotals>, FeedbackRepositoryError> {
        let tables = self.lock().map_err(FeedbackRepositoryError::query)?;
        let mut totals: HashMap<MechanicId, RatingTotals> = HashMap::new();
        for record in tables
            .feedback
            .iter()
            .filter(|f| mechanic_ids.contains(&f.mechanic_id))
        {
            let entry = totals.entry(record.mechanic_id).or_default();
            entry.sum += u64::from(record.rating.value());
            entry.count += 1;
        }
        Ok(totals)
    }
}

#[cfg(test)]
mod tests;
