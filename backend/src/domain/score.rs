//! Journey scores: best-score-wins submissions, totals and summaries.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::macros::define_text_enum;
use super::validation::FieldError;
use super::{JourneyId, ParticipationId, ScoreId, UserId};

/// Stored best score of a user on a journey.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    #[schema(value_type = String, format = "uuid")]
    pub id: ScoreId,
    #[schema(value_type = String, format = "uuid")]
    pub user_id: UserId,
    #[schema(value_type = String, format = "uuid")]
    pub journey_id: JourneyId,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub participation_id: Option<ParticipationId>,
    pub score: i32,
    pub time_seconds: i32,
    pub distance_meters: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated score submission.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreSubmission {
    pub user_id: UserId,
    pub journey_id: JourneyId,
    pub participation_id: Option<ParticipationId>,
    pub score: i32,
    pub time_seconds: Option<i32>,
    pub distance_meters: Option<f64>,
}

fn non_negative_int(field: &'static str, value: Option<i64>) -> Result<Option<i32>, FieldError> {
    value
        .map(|v| {
            i32::try_from(v)
                .ok()
                .filter(|v| *v >= 0)
                .ok_or(FieldError::OutOfRange {
                    field,
                    min: 0.0,
                    max: f64::from(i32::MAX),
                })
        })
        .transpose()
}

fn non_negative_distance(value: Option<f64>) -> Result<Option<f64>, FieldError> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(FieldError::OutOfRange {
            field: "distance",
            min: 0.0,
            max: f64::MAX,
        }),
        other => Ok(other),
    }
}

impl ScoreSubmission {
    /// Validate raw numbers; a missing score counts as 0.
    pub fn try_new(
        user_id: UserId,
        journey_id: JourneyId,
        participation_id: Option<ParticipationId>,
        score: Option<i64>,
        time_seconds: Option<i64>,
        distance_meters: Option<f64>,
    ) -> Result<Self, FieldError> {
        Ok(Self {
            user_id,
            journey_id,
            participation_id,
            score: non_negative_int("score", score)?.unwrap_or(0),
            time_seconds: non_negative_int("time", time_seconds)?,
            distance_meters: non_negative_distance(distance_meters)?,
        })
    }

    /// Fresh row for a pair without a stored score.
    pub fn into_score(self, now: DateTime<Utc>) -> Score {
        Score {
            id: ScoreId::random(),
            user_id: self.user_id,
            journey_id: self.journey_id,
            participation_id: self.participation_id,
            score: self.score,
            time_seconds: self.time_seconds.unwrap_or(0),
            distance_meters: self.distance_meters.unwrap_or(0.0),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Result of applying a submission to the stored best score.
#[derive(Debug, Clone, PartialEq)]
pub enum BestScore {
    /// No stored score; insert this one.
    Create(Score),
    /// Strictly better; overwrite the stored row.
    Improve { score: Score, previous_score: i32 },
    /// Not better; the stored row is retained unchanged.
    Keep(Score),
}

/// Decide what a submission does to the stored best score.
///
/// Only a strictly higher `score` replaces the stored one; time and distance
/// are replaced alongside it when supplied.
pub fn apply_best_score(
    existing: Option<Score>,
    submission: ScoreSubmission,
    now: DateTime<Utc>,
) -> BestScore {
    let Some(current) = existing else {
        return BestScore::Create(submission.into_score(now));
    };
    if submission.score <= current.score {
        return BestScore::Keep(current);
    }
    let previous_score = current.score;
    let score = Score {
        score: submission.score,
        time_seconds: submission.time_seconds.unwrap_or(current.time_seconds),
        distance_meters: submission.distance_meters.unwrap_or(current.distance_meters),
        participation_id: submission.participation_id.or(current.participation_id),
        updated_at: now,
        ..current
    };
    BestScore::Improve {
        score,
        previous_score,
    }
}

/// Full overwrite of a score row. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreChanges {
    pub score: Option<i32>,
    pub time_seconds: Option<i32>,
    pub distance_meters: Option<f64>,
    pub participation_id: Option<ParticipationId>,
}

impl ScoreChanges {
    /// Validate replacement values.
    pub fn try_new(
        score: Option<i64>,
        time_seconds: Option<i64>,
        distance_meters: Option<f64>,
        participation_id: Option<ParticipationId>,
    ) -> Result<Self, FieldError> {
        Ok(Self {
            score: non_negative_int("score", score)?,
            time_seconds: non_negative_int("time", time_seconds)?,
            distance_meters: non_negative_distance(distance_meters)?,
            participation_id,
        })
    }
}

/// Optional filters for listing scores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreFilter {
    pub journey_id: Option<JourneyId>,
    pub user_id: Option<UserId>,
}

define_text_enum! {
    /// Summable score dimension.
    pub enum ScoreCategory ("category") {
        Score => "score",
        Distance => "distance",
        Time => "time",
    }
}

/// Summed score, distance and time. Empty input sums to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, ToSchema)]
pub struct ScoreTotals {
    pub score: i64,
    pub distance: f64,
    pub time: i64,
}

/// Per-category values, optionally narrowed to one category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, ToSchema)]
pub struct ScoreCategories {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
}

impl ScoreTotals {
    /// Project totals onto the requested category, or all of them.
    pub fn categories(&self, only: Option<ScoreCategory>) -> ScoreCategories {
        let keep = |category| only.is_none_or(|selected| selected == category);
        ScoreCategories {
            score: keep(ScoreCategory::Score).then_some(self.score),
            distance: keep(ScoreCategory::Distance).then_some(self.distance),
            time: keep(ScoreCategory::Time).then_some(self.time),
        }
    }
}

/// Inclusive creation-time window for summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummaryWindow {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

fn parse_bound(field: &'static str, raw: &str, end_of_day: bool) -> Result<DateTime<Utc>, FieldError> {
    let raw = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        let instant = instant.with_timezone(&Utc);
        if !end_of_day {
            return Ok(instant);
        }
        return Ok(instant.date_naive().and_time(last_instant()).and_utc());
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| FieldError::InvalidFormat {
        field,
        reason: "must be a YYYY-MM-DD date or an RFC 3339 timestamp",
    })?;
    let time = if end_of_day {
        last_instant()
    } else {
        NaiveTime::MIN
    };
    Ok(date.and_time(time).and_utc())
}

fn last_instant() -> NaiveTime {
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN)
}

impl SummaryWindow {
    /// Parse query bounds; `to` extends through 23:59:59.999 UTC of its day.
    ///
    /// # Examples
    /// ```
    /// use snaptrack::domain::SummaryWindow;
    ///
    /// let window = SummaryWindow::parse(Some("2025-01-01"), Some("2025-01-31")).unwrap();
    /// assert_eq!(window.to.unwrap().to_rfc3339(), "2025-01-31T23:59:59.999+00:00");
    /// ```
    pub fn parse(from: Option<&str>, to: Option<&str>) -> Result<Self, FieldError> {
        let from = from
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| parse_bound("from", raw, false))
            .transpose()?;
        let to = to
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| parse_bound("to", raw, true))
            .transpose()?;
        Ok(Self { from, to })
    }
}

/// Filters for the per-user summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummaryFilter {
    pub user_id: Option<UserId>,
    pub journey_id: Option<JourneyId>,
    pub window: SummaryWindow,
}

/// Per-user sums. `username` is `None` when the user row is gone.
#[derive(Debug, Clone, PartialEq)]
pub struct UserScoreTotals {
    pub user_id: UserId,
    pub username: Option<String>,
    pub totals: ScoreTotals,
}

/// Score of a journey joined with its author.
#[derive(Debug, Clone, PartialEq)]
pub struct JourneyScoreEntry {
    pub score_id: ScoreId,
    pub user_id: UserId,
    pub username: String,
    pub journey_id: JourneyId,
    pub score: i32,
}

/// Score of a user joined with the journey name.
#[derive(Debug, Clone, PartialEq)]
pub struct UserScoreEntry {
    pub score_id: ScoreId,
    pub journey_id: JourneyId,
    pub journey_title: String,
    pub score: i32,
    pub created_at: DateTime<Utc>,
}
