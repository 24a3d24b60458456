//! Accounts and the role that decides which workflows an account may drive.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{AccountId, EmailAddress, Username};

/// Kind of principal an account represents.
///
/// Requesters submit service requests and leave feedback. Mechanics own a
/// one-to-one [`crate::domain::Mechanic`] profile and work the request queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    Requester,
    Mechanic,
}

impl AccountRole {
    /// Stable lowercase name used in storage and payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Requester => "requester",
            Self::Mechanic => "mechanic",
        }
    }
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRoleError(pub String);

impl fmt::Display for UnknownRoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown account role: {}", self.0)
    }
}

impl std::error::Error for UnknownRoleError {}

impl FromStr for AccountRole {
    type Err = UnknownRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "requester" => Ok(Self::Requester),
            "mechanic" => Ok(Self::Mechanic),
            other => Err(UnknownRoleError(other.to_owned())),
        }
    }
}

/// Encoded password hash in PHC string format.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded hash produced by a [`crate::domain::ports::PasswordHasher`].
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encoded PHC string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(**redacted**)")
    }
}

/// Registered account.
///
/// ## Invariants
/// - `username` and `email` are unique across accounts.
/// - An account with role [`AccountRole::Mechanic`] has exactly one mechanic
///   profile; requester accounts have none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub username: Username,
    pub email: EmailAddress,
    pub role: AccountRole,
    pub password_hash: PasswordHash,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Whether this account acts as a mechanic.
    pub fn is_mechanic(&self) -> bool {
        self.role == AccountRole::Mechanic
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AccountRole::Requester)]
    #[case(AccountRole::Mechanic)]
    fn role_names_parse_back(#[case] role: AccountRole) {
        assert_eq!(role.as_str().parse::<AccountRole>(), Ok(role));
    }

    #[rstest]
    fn unknown_role_is_rejected() {
        assert!("admin".parse::<AccountRole>().is_err());
    }

    #[rstest]
    fn password_hash_debug_is_redacted() {
        let hash = PasswordHash::new("$argon2id$v=19$secret");
        assert!(!format!("{hash:?}").contains("secret"));
    }
}
