//! UUID-backed identifiers for accounts, mechanics, requests and feedback.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error returned when an identifier string is not a UUID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierError {
    kind: &'static str,
}

impl IdentifierError {
    /// Human-readable kind of identifier that failed to parse.
    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

impl fmt::Display for IdentifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} must be a valid UUID", self.kind)
    }
}

impl std::error::Error for IdentifierError {}

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Parse an identifier from its hyphenated string form.
            pub fn new(id: impl AsRef<str>) -> Result<Self, IdentifierError> {
                let raw = id.as_ref();
                if raw.trim() != raw {
                    return Err(IdentifierError { kind: $kind });
                }
                Uuid::parse_str(raw)
                    .map(Self)
                    .map_err(|_| IdentifierError { kind: $kind })
            }

            /// Wrap an existing UUID.
            pub const fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Generate a new random identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = IdentifierError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl From<$name> for Uuid {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

uuid_identifier! {
    /// Stable account identifier.
    ///
    /// # Examples
    /// ```
    /// use roadside::domain::AccountId;
    ///
    /// let id = AccountId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("uuid");
    /// assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    /// assert!(AccountId::new("not-a-uuid").is_err());
    /// ```
    AccountId, "account id"
}

uuid_identifier! {
    /// Stable mechanic profile identifier.
    MechanicId, "mechanic id"
}

uuid_identifier! {
    /// Stable service request identifier.
    ServiceRequestId, "service request id"
}

uuid_identifier! {
    /// Stable feedback record identifier.
    FeedbackId, "feedback id"
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    #[case("3fa85f64")]
    fn rejects_malformed_identifiers(#[case] raw: &str) {
        let err = MechanicId::new(raw).expect_err("malformed id");
        assert_eq!(err.kind(), "mechanic id");
    }

    #[rstest]
    fn serialises_as_bare_uuid_string() {
        let id = ServiceRequestId::from_uuid(Uuid::nil());
        let value = serde_json::to_value(id).expect("serialise id");
        assert_eq!(value, "00000000-0000-0000-0000-000000000000");
    }
}
