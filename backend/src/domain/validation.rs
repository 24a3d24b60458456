//! Field validation rules shared by registration and request submission.
//!
//! Each validated value is a newtype whose constructor normalises raw input
//! and enforces one rule set. Both the account registration path and the
//! service request path build their records from these types, so a phone
//! number or location accepted in one place is accepted everywhere.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use zeroize::Zeroizing;

use crate::domain::Error;

/// Minimum length of a free-text location or address.
pub const LOCATION_MIN: usize = 10;
/// Minimum length of an owner name.
pub const OWNER_NAME_MIN: usize = 2;
/// Minimum length of a vehicle registration number.
pub const VEHICLE_NUMBER_MIN: usize = 3;
/// Earliest accepted vehicle model year.
pub const VEHICLE_YEAR_MIN: i32 = 1980;
/// Minimum length of a vehicle brand.
pub const VEHICLE_BRAND_MIN: usize = 2;
/// Minimum length of a service-centre name.
pub const SERVICE_CENTRE_NAME_MIN: usize = 2;
/// Maximum length of a mechanic specialization.
pub const SPECIALIZATION_MAX: usize = 100;
/// Minimum password length.
pub const PASSWORD_MIN: usize = 8;
/// Minimum username length.
pub const USERNAME_MIN: usize = 3;
/// Maximum username length.
pub const USERNAME_MAX: usize = 150;

const PHONE_DIGITS: usize = 10;
const PASSWORD_SPECIALS: &str = "@$!%*#?&";
const COMMON_PASSWORDS: [&str; 7] = [
    "password",
    "12345678",
    "qwertyui",
    "admin123",
    "welcome1",
    "password1",
    "abc12345",
];

/// Rule violations raised while validating form fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    PhoneDigitCount { expected: usize },
    PhoneLeadingDigit,
    LocationTooShort { min: usize },
    OwnerNameTooShort { min: usize },
    OwnerNameInvalidCharacters,
    VehicleNumberTooShort { min: usize },
    VehicleNumberInvalidCharacters,
    VehicleYearOutOfRange { min: i32, max: i32 },
    VehicleBrandTooShort { min: usize },
    VehicleModelMissing,
    UsernameLength { min: usize, max: usize },
    UsernameInvalidCharacters,
    EmailInvalid,
    PasswordTooShort { min: usize },
    PasswordMissingDigit,
    PasswordMissingUppercase,
    PasswordMissingLowercase,
    PasswordMissingSpecial,
    PasswordTooCommon,
    PasswordMismatch,
    ServiceCentreNameTooShort { min: usize },
    SpecializationTooLong { max: usize },
}

impl ValidationError {
    /// Name of the request field the violation belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::PhoneDigitCount { .. } | Self::PhoneLeadingDigit => "phone",
            Self::LocationTooShort { .. } => "location",
            Self::OwnerNameTooShort { .. } | Self::OwnerNameInvalidCharacters => "ownerName",
            Self::VehicleNumberTooShort { .. } | Self::VehicleNumberInvalidCharacters => {
                "vehicleNumber"
            }
            Self::VehicleYearOutOfRange { .. } => "vehicleYear",
            Self::VehicleBrandTooShort { .. } => "vehicleBrand",
            Self::VehicleModelMissing => "vehicleModel",
            Self::UsernameLength { .. } | Self::UsernameInvalidCharacters => "username",
            Self::EmailInvalid => "email",
            Self::PasswordTooShort { .. }
            | Self::PasswordMissingDigit
            | Self::PasswordMissingUppercase
            | Self::PasswordMissingLowercase
            | Self::PasswordMissingSpecial
            | Self::PasswordTooCommon => "password",
            Self::PasswordMismatch => "passwordConfirmation",
            Self::ServiceCentreNameTooShort { .. } => "serviceCentreName",
            Self::SpecializationTooLong { .. } => "specialization",
        }
    }

    /// Stable machine-readable code for the violation.
    pub fn code(&self) -> &'static str {
        match self {
            Self::PhoneDigitCount { .. } => "phone_digit_count",
            Self::PhoneLeadingDigit => "phone_leading_digit",
            Self::LocationTooShort { .. } => "location_too_short",
            Self::OwnerNameTooShort { .. } => "owner_name_too_short",
            Self::OwnerNameInvalidCharacters => "owner_name_invalid_characters",
            Self::VehicleNumberTooShort { .. } => "vehicle_number_too_short",
            Self::VehicleNumberInvalidCharacters => "vehicle_number_invalid_characters",
            Self::VehicleYearOutOfRange { .. } => "vehicle_year_out_of_range",
            Self::VehicleBrandTooShort { .. } => "vehicle_brand_too_short",
            Self::VehicleModelMissing => "vehicle_model_missing",
            Self::UsernameLength { .. } => "username_length",
            Self::UsernameInvalidCharacters => "username_invalid_characters",
            Self::EmailInvalid => "email_invalid",
            Self::PasswordTooShort { .. } => "password_too_short",
            Self::PasswordMissingDigit => "password_missing_digit",
            Self::PasswordMissingUppercase => "password_missing_uppercase",
            Self::PasswordMissingLowercase => "password_missing_lowercase",
            Self::PasswordMissingSpecial => "password_missing_special",
            Self::PasswordTooCommon => "password_too_common",
            Self::PasswordMismatch => "password_mismatch",
            Self::ServiceCentreNameTooShort { .. } => "service_centre_name_too_short",
            Self::SpecializationTooLong { .. } => "specialization_too_long",
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PhoneDigitCount { expected } => {
                write!(f, "phone number must contain exactly {expected} digits")
            }
            Self::PhoneLeadingDigit => write!(f, "phone number must start with 6, 7, 8, or 9"),
            Self::LocationTooShort { min } => {
                write!(f, "location must be at least {min} characters")
            }
            Self::OwnerNameTooShort { min } => {
                write!(f, "owner name must be at least {min} characters")
            }
            Self::OwnerNameInvalidCharacters => {
                write!(f, "owner name may only contain letters, spaces, and dots")
            }
            Self::VehicleNumberTooShort { min } => {
                write!(f, "vehicle number must be at least {min} characters")
            }
            Self::VehicleNumberInvalidCharacters => write!(
                f,
                "vehicle number may only contain letters, digits, and spaces"
            ),
            Self::VehicleYearOutOfRange { min, max } => {
                write!(f, "vehicle year must be between {min} and {max}")
            }
            Self::VehicleBrandTooShort { min } => {
                write!(f, "vehicle brand must be at least {min} characters")
            }
            Self::VehicleModelMissing => write!(f, "vehicle model must not be empty"),
            Self::UsernameLength { min, max } => {
                write!(f, "username must be between {min} and {max} characters")
            }
            Self::UsernameInvalidCharacters => write!(
                f,
                "username may only contain letters, digits, and @ . + - _"
            ),
            Self::EmailInvalid => write!(f, "email address is not valid"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::PasswordMissingDigit => write!(f, "password must contain a digit"),
            Self::PasswordMissingUppercase => {
                write!(f, "password must contain an uppercase letter")
            }
            Self::PasswordMissingLowercase => {
                write!(f, "password must contain a lowercase letter")
            }
            Self::PasswordMissingSpecial => write!(
                f,
                "password must contain one of the characters {PASSWORD_SPECIALS}"
            ),
            Self::PasswordTooCommon => write!(f, "password is too common"),
            Self::PasswordMismatch => write!(f, "password confirmation does not match"),
            Self::ServiceCentreNameTooShort { min } => {
                write!(f, "service centre name must be at least {min} characters")
            }
            Self::SpecializationTooLong { max } => {
                write!(f, "specialization must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Invalid-request error carrying `{ field, code }` details.
///
/// # Examples
/// ```
/// use roadside::domain::{ErrorCode, field_error};
///
/// let err = field_error("rating", "rating_out_of_range", "rating must be 1-5");
/// assert_eq!(err.code(), ErrorCode::InvalidRequest);
/// assert_eq!(err.details().and_then(|d| d.get("field")).and_then(|f| f.as_str()), Some("rating"));
/// ```
pub fn field_error(field: &str, code: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code,
    }))
}

impl From<ValidationError> for Error {
    fn from(value: ValidationError) -> Self {
        field_error(value.field(), value.code(), value.to_string())
    }
}

static OWNER_NAME_RE: OnceLock<Regex> = OnceLock::new();
static VEHICLE_NUMBER_RE: OnceLock<Regex> = OnceLock::new();
static USERNAME_RE: OnceLock<Regex> = OnceLock::new();
static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn compiled(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| {
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("validation regex {pattern} failed to compile: {error}"))
    })
}

fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

macro_rules! string_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Borrow the normalised value.
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

string_newtype! {
    /// Ten-digit mobile number stored as bare digits.
    ///
    /// # Examples
    /// ```
    /// use roadside::domain::PhoneNumber;
    ///
    /// let phone = PhoneNumber::parse("+91 98765-43210").unwrap_err();
    /// assert_eq!(phone.field(), "phone");
    /// let phone = PhoneNumber::parse("98765 43210").expect("valid");
    /// assert_eq!(phone.as_str(), "9876543210");
    /// ```
    PhoneNumber
}

impl PhoneNumber {
    /// Strip everything but digits and check the regional format.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        if digits.len() != PHONE_DIGITS {
            return Err(ValidationError::PhoneDigitCount {
                expected: PHONE_DIGITS,
            });
        }
        if !digits.starts_with(['6', '7', '8', '9']) {
            return Err(ValidationError::PhoneLeadingDigit);
        }
        Ok(Self(digits))
    }
}

string_newtype! {
    /// Free-text location or street address with whitespace collapsed.
    Location
}

impl Location {
    /// Collapse whitespace and enforce the minimum descriptive length.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let collapsed = collapse_whitespace(raw);
        if collapsed.chars().count() < LOCATION_MIN {
            return Err(ValidationError::LocationTooShort { min: LOCATION_MIN });
        }
        Ok(Self(collapsed))
    }
}

string_newtype! {
    /// Name of the person the vehicle belongs to.
    OwnerName
}

impl OwnerName {
    /// Trim and check the allowed character set.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let collapsed = collapse_whitespace(raw);
        if collapsed.chars().count() < OWNER_NAME_MIN {
            return Err(ValidationError::OwnerNameTooShort {
                min: OWNER_NAME_MIN,
            });
        }
        if !compiled(&OWNER_NAME_RE, r"^[\p{L} .]+$").is_match(&collapsed) {
            return Err(ValidationError::OwnerNameInvalidCharacters);
        }
        Ok(Self(collapsed))
    }
}

string_newtype! {
    /// Upper-cased vehicle registration number.
    VehicleNumber
}

impl VehicleNumber {
    /// Upper-case and check the allowed character set.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let normalised = collapse_whitespace(raw).to_uppercase();
        if normalised.chars().count() < VEHICLE_NUMBER_MIN {
            return Err(ValidationError::VehicleNumberTooShort {
                min: VEHICLE_NUMBER_MIN,
            });
        }
        if !compiled(&VEHICLE_NUMBER_RE, "^[A-Z0-9 ]+$").is_match(&normalised) {
            return Err(ValidationError::VehicleNumberInvalidCharacters);
        }
        Ok(Self(normalised))
    }
}

/// Vehicle model year bounded by [`VEHICLE_YEAR_MIN`] and next year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleYear(i32);

impl VehicleYear {
    /// Check the year against the window ending one year after `current_year`.
    pub fn parse(year: i32, current_year: i32) -> Result<Self, ValidationError> {
        let max = current_year + 1;
        if !(VEHICLE_YEAR_MIN..=max).contains(&year) {
            return Err(ValidationError::VehicleYearOutOfRange {
                min: VEHICLE_YEAR_MIN,
                max,
            });
        }
        Ok(Self(year))
    }

    /// Rebuild a stored year without re-checking the moving upper bound.
    pub(crate) fn from_stored(year: i32) -> Self {
        Self(year)
    }

    /// The year as an integer.
    pub fn value(self) -> i32 {
        self.0
    }
}

string_newtype! {
    /// Vehicle manufacturer.
    VehicleBrand
}

impl VehicleBrand {
    /// Trim and enforce the minimum length.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let collapsed = collapse_whitespace(raw);
        if collapsed.chars().count() < VEHICLE_BRAND_MIN {
            return Err(ValidationError::VehicleBrandTooShort {
                min: VEHICLE_BRAND_MIN,
            });
        }
        Ok(Self(collapsed))
    }
}

string_newtype! {
    /// Vehicle model name.
    VehicleModel
}

impl VehicleModel {
    /// Trim and require a non-empty value.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let collapsed = collapse_whitespace(raw);
        if collapsed.is_empty() {
            return Err(ValidationError::VehicleModelMissing);
        }
        Ok(Self(collapsed))
    }
}

string_newtype! {
    /// Login name, unique across accounts.
    Username
}

impl Username {
    /// Trim and check length and character set.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        let length = trimmed.chars().count();
        if !(USERNAME_MIN..=USERNAME_MAX).contains(&length) {
            return Err(ValidationError::UsernameLength {
                min: USERNAME_MIN,
                max: USERNAME_MAX,
            });
        }
        if !compiled(&USERNAME_RE, r"^[\w.@+-]+$").is_match(trimmed) {
            return Err(ValidationError::UsernameInvalidCharacters);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

string_newtype! {
    /// Lower-cased email address, unique across accounts.
    EmailAddress
}

impl EmailAddress {
    /// Trim, lower-case and check the basic `local@domain.tld` shape.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let normalised = raw.trim().to_lowercase();
        if !compiled(&EMAIL_RE, r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_match(&normalised) {
            return Err(ValidationError::EmailInvalid);
        }
        Ok(Self(normalised))
    }
}

string_newtype! {
    /// Trading name of a mechanic's service centre.
    ServiceCentreName
}

impl ServiceCentreName {
    /// Trim and enforce the minimum length.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let collapsed = collapse_whitespace(raw);
        if collapsed.chars().count() < SERVICE_CENTRE_NAME_MIN {
            return Err(ValidationError::ServiceCentreNameTooShort {
                min: SERVICE_CENTRE_NAME_MIN,
            });
        }
        Ok(Self(collapsed))
    }
}

string_newtype! {
    /// Optional description of what a mechanic specialises in.
    Specialization
}

impl Specialization {
    /// Trim the value; blank input means no specialization.
    pub fn parse(raw: &str) -> Result<Option<Self>, ValidationError> {
        let collapsed = collapse_whitespace(raw);
        if collapsed.is_empty() {
            return Ok(None);
        }
        if collapsed.chars().count() > SPECIALIZATION_MAX {
            return Err(ValidationError::SpecializationTooLong {
                max: SPECIALIZATION_MAX,
            });
        }
        Ok(Some(Self(collapsed)))
    }
}

/// Password that passed the strength policy.
///
/// The plaintext is zeroed on drop and never serialised.
#[derive(Clone)]
pub struct NewPassword(Zeroizing<String>);

impl NewPassword {
    /// Check strength and confirmation.
    ///
    /// # Examples
    /// ```
    /// use roadside::domain::{NewPassword, ValidationError};
    ///
    /// assert!(NewPassword::parse("Str0ng!pass", "Str0ng!pass").is_ok());
    /// assert_eq!(
    ///     NewPassword::parse("Str0ng!pass", "other").err(),
    ///     Some(ValidationError::PasswordMismatch)
    /// );
    /// ```
    pub fn parse(password: &str, confirmation: &str) -> Result<Self, ValidationError> {
        if password.chars().count() < PASSWORD_MIN {
            return Err(ValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        if COMMON_PASSWORDS
            .iter()
            .any(|common| common.eq_ignore_ascii_case(password))
        {
            return Err(ValidationError::PasswordTooCommon);
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(ValidationError::PasswordMissingDigit);
        }
        if !password.chars().any(char::is_uppercase) {
            return Err(ValidationError::PasswordMissingUppercase);
        }
        if !password.chars().any(char::is_lowercase) {
            return Err(ValidationError::PasswordMissingLowercase);
        }
        if !password.chars().any(|c| PASSWORD_SPECIALS.contains(c)) {
            return Err(ValidationError::PasswordMissingSpecial);
        }
        if password != confirmation {
            return Err(ValidationError::PasswordMismatch);
        }
        Ok(Self(Zeroizing::new(password.to_owned())))
    }

    /// Plaintext for hashing.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for NewPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NewPassword(**redacted**)")
    }
}
