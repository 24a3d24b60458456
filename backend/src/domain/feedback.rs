//! Feedback ledger types and rating aggregation.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{AccountId, Error, FeedbackId, MechanicId, ServiceRequestId, field_error};

/// Lowest accepted rating.
pub const RATING_MIN: i64 = 1;
/// Highest accepted rating.
pub const RATING_MAX: i64 = 5;
/// Maximum comment length in characters.
pub const COMMENT_MAX: usize = 1000;

/// Validation errors for feedback submissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackValidationError {
    RatingOutOfRange { value: i64 },
    CommentTooLong { max: usize },
}

impl FeedbackValidationError {
    /// Request field the violation belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::RatingOutOfRange { .. } => "rating",
            Self::CommentTooLong { .. } => "comment",
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::RatingOutOfRange { .. } => "rating_out_of_range",
            Self::CommentTooLong { .. } => "comment_too_long",
        }
    }
}

impl fmt::Display for FeedbackValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RatingOutOfRange { value } => write!(
                f,
                "rating {value} must be between {RATING_MIN} and {RATING_MAX}"
            ),
            Self::CommentTooLong { max } => {
                write!(f, "comment must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for FeedbackValidationError {}

impl From<FeedbackValidationError> for Error {
    fn from(value: FeedbackValidationError) -> Self {
        field_error(value.field(), value.code(), value.to_string())
    }
}

/// Star rating between [`RATING_MIN`] and [`RATING_MAX`].
///
/// # Examples
/// ```
/// use roadside::domain::Rating;
///
/// assert_eq!(Rating::new(4).map(|r| r.value()), Ok(4));
/// assert!(Rating::new(6).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Rating(u8);

impl Rating {
    /// Validate a raw rating.
    pub fn new(value: i64) -> Result<Self, FeedbackValidationError> {
        if !(RATING_MIN..=RATING_MAX).contains(&value) {
            return Err(FeedbackValidationError::RatingOutOfRange { value });
        }
        u8::try_from(value)
            .map(Self)
            .map_err(|_| FeedbackValidationError::RatingOutOfRange { value })
    }

    /// Rating as an integer.
    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = FeedbackValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for i64 {
    fn from(value: Rating) -> Self {
        i64::from(value.0)
    }
}

/// Trimmed, non-empty feedback comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedbackComment(String);

impl FeedbackComment {
    /// Trim the comment; blank input means no comment.
    pub fn parse(raw: Option<&str>) -> Result<Option<Self>, FeedbackValidationError> {
        let Some(trimmed) = raw.map(str::trim).filter(|text| !text.is_empty()) else {
            return Ok(None);
        };
        if trimmed.chars().count() > COMMENT_MAX {
            return Err(FeedbackValidationError::CommentTooLong { max: COMMENT_MAX });
        }
        Ok(Some(Self(trimmed.to_owned())))
    }

    /// Borrow the comment text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// What happens when an author rates the same request twice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackPolicy {
    /// Replace the earlier rating and comment.
    #[default]
    Overwrite,
    /// Refuse the second submission with a conflict.
    Reject,
}

impl FromStr for FeedbackPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "reject" => Ok(Self::Reject),
            other => Err(format!("unknown feedback policy: {other}")),
        }
    }
}

/// One author's rating of one completed request.
///
/// ## Invariants
/// - At most one record exists per `(author_id, service_request_id)`.
/// - `mechanic_id` is the mechanic assigned to the request when it completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub id: FeedbackId,
    pub author_id: AccountId,
    pub mechanic_id: MechanicId,
    pub service_request_id: ServiceRequestId,
    pub rating: Rating,
    pub comment: Option<FeedbackComment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Running sum and count of a mechanic's ratings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RatingTotals {
    pub sum: u64,
    pub count: u64,
}

impl RatingTotals {
    /// Accumulate totals from individual ratings.
    pub fn from_ratings(ratings: impl IntoIterator<Item = Rating>) -> Self {
        ratings.into_iter().fold(Self::default(), |totals, rating| Self {
            sum: totals.sum + u64::from(rating.value()),
            count: totals.count + 1,
        })
    }

    /// Mean rating rounded to one decimal place, or `0.0` when unrated.
    ///
    /// Exact ties round to the even tenth, so a 4.25 mean reports 4.2.
    pub fn average(self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let mean = self.sum as f64 / self.count as f64;
        (mean * 10.0).round_ties_even() / 10.0
    }

    /// Summary as exposed to clients.
    pub fn summary(self) -> RatingSummary {
        RatingSummary {
            average: self.average(),
            count: self.count,
        }
    }
}

/// Average rating plus the number of ratings behind it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub average: f64,
    pub count: u64,
}

/// Mean of `ratings` rounded to one decimal, `0.0` for none.
///
/// # Examples
/// ```
/// use roadside::domain::{Rating, average_rating};
///
/// let ratings = [4, 5, 3].map(|r| Rating::new(r).expect("valid"));
/// assert_eq!(average_rating(ratings), 4.0);
/// assert_eq!(average_rating(Vec::<Rating>::new()), 0.0);
/// ```
pub fn average_rating(ratings: impl IntoIterator<Item = Rating>) -> f64 {
    RatingTotals::from_ratings(ratings).average()
}
