//! Journey ratings and their average.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::validation::{optional_text, FieldError};
use super::{JourneyId, RatingId, UserId};

/// Lowest accepted rating.
pub const RATING_MIN: i16 = 1;
/// Highest accepted rating.
pub const RATING_MAX: i16 = 5;
/// Maximum comment length.
pub const COMMENT_MAX: usize = 500;

/// Star rating between [`RATING_MIN`] and [`RATING_MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, ToSchema)]
#[serde(transparent)]
pub struct RatingValue(i16);

impl RatingValue {
    /// Validate the accepted range.
    pub fn new(value: i64) -> Result<Self, FieldError> {
        i16::try_from(value)
            .ok()
            .filter(|v| (RATING_MIN..=RATING_MAX).contains(v))
            .map(Self)
            .ok_or(FieldError::OutOfRange {
                field: "value",
                min: f64::from(RATING_MIN),
                max: f64::from(RATING_MAX),
            })
    }

    /// Raw value.
    pub const fn get(self) -> i16 {
        self.0
    }
}

/// Stored rating.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    #[schema(value_type = String, format = "uuid")]
    pub id: RatingId,
    #[schema(value_type = String, format = "uuid")]
    pub user_id: UserId,
    #[schema(value_type = String, format = "uuid")]
    pub journey_id: JourneyId,
    #[schema(value_type = i16, minimum = 1, maximum = 5)]
    pub value: RatingValue,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Upsert payload: overwrites value and comment of an existing pair.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingSubmission {
    pub id: RatingId,
    pub user_id: UserId,
    pub journey_id: JourneyId,
    pub value: RatingValue,
    pub comment: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl RatingSubmission {
    /// Validate the raw value and comment.
    pub fn try_new(
        user_id: UserId,
        journey_id: JourneyId,
        value: i64,
        comment: Option<&str>,
        submitted_at: DateTime<Utc>,
    ) -> Result<Self, FieldError> {
        Ok(Self {
            id: RatingId::random(),
            user_id,
            journey_id,
            value: RatingValue::new(value)?,
            comment: optional_text("comment", comment, COMMENT_MAX)?,
            submitted_at,
        })
    }
}

/// Rating joined with its author's username.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingEntry {
    pub rating: Rating,
    pub username: Option<String>,
}

/// Optional filters for listing ratings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RatingFilter {
    pub journey_id: Option<JourneyId>,
    pub user_id: Option<UserId>,
}

/// Mean rating of a journey.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingAverage {
    #[schema(value_type = String, format = "uuid")]
    pub journey_id: JourneyId,
    pub average_rating: f64,
    pub count: i64,
}

impl RatingAverage {
    /// Mean of `sum / count` rounded to one decimal; zero ratings give 0.
    ///
    /// # Examples
    /// ```
    /// use snaptrack::domain::{JourneyId, RatingAverage};
    ///
    /// let journey = JourneyId::random();
    /// assert_eq!(RatingAverage::from_totals(journey, 12, 3).average_rating, 4.0);
    /// assert_eq!(RatingAverage::from_totals(journey, 0, 0).average_rating, 0.0);
    /// ```
    pub fn from_totals(journey_id: JourneyId, sum: i64, count: i64) -> Self {
        let average_rating = if count > 0 {
            round_one_decimal(sum as f64 / count as f64)
        } else {
            0.0
        };
        Self {
            journey_id,
            average_rating,
            count: count.max(0),
        }
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
