//! Steps: ordered, geolocated checkpoints of a journey.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::geo::GeoPoint;
use super::validation::{finite, optional_text, required_text, FieldError};
use super::{JourneyId, StepId};

/// Maximum step title length.
pub const STEP_TITLE_MAX: usize = 200;
/// Maximum step description length.
pub const STEP_DESCRIPTION_MAX: usize = 1000;
/// Maximum riddle length.
pub const RIDDLE_MAX: usize = 500;
/// Maximum note length.
pub const NOTE_MAX: usize = 500;

/// Optional sensor readings captured with a step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StepReadings {
    pub accuracy: Option<f64>,
    pub altitude: Option<f64>,
    pub speed: Option<f64>,
}

impl StepReadings {
    /// Reject non-finite readings.
    pub fn try_new(
        accuracy: Option<f64>,
        altitude: Option<f64>,
        speed: Option<f64>,
    ) -> Result<Self, FieldError> {
        Ok(Self {
            accuracy: finite("accuracy", accuracy)?,
            altitude: finite("altitude", altitude)?,
            speed: finite("speed", speed)?,
        })
    }
}

/// Stored step.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    #[schema(value_type = String, format = "uuid")]
    pub id: StepId,
    #[schema(value_type = String, format = "uuid")]
    pub journey_id: JourneyId,
    pub position: i32,
    pub title: String,
    pub description: Option<String>,
    pub riddle: Option<String>,
    pub location: GeoPoint,
    pub image: Option<String>,
    #[serde(flatten)]
    pub readings: StepReadings,
    pub note: Option<String>,
    pub recorded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw step fields supplied by a caller.
#[derive(Debug, Clone, PartialEq)]
pub struct StepDraft {
    pub journey_id: JourneyId,
    pub position: Option<i32>,
    pub title: String,
    pub description: Option<String>,
    pub riddle: Option<String>,
    pub location: GeoPoint,
    pub image: Option<String>,
    pub readings: StepReadings,
    pub note: Option<String>,
    pub recorded_at: Option<DateTime<Utc>>,
}

/// Validated step ready for insertion. `position: None` appends.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStep {
    pub id: StepId,
    pub journey_id: JourneyId,
    pub position: Option<i32>,
    pub title: String,
    pub description: Option<String>,
    pub riddle: Option<String>,
    pub location: GeoPoint,
    pub image: Option<String>,
    pub readings: StepReadings,
    pub note: Option<String>,
    pub recorded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

fn position(value: Option<i32>) -> Result<Option<i32>, FieldError> {
    match value {
        Some(p) if p < 0 => Err(FieldError::OutOfRange {
            field: "position",
            min: 0.0,
            max: f64::from(i32::MAX),
        }),
        other => Ok(other),
    }
}

impl NewStep {
    /// Validate a draft into a step stamped at `created_at`.
    pub fn try_from_draft(
        draft: StepDraft,
        created_at: DateTime<Utc>,
    ) -> Result<Self, FieldError> {
        Ok(Self {
            id: StepId::random(),
            journey_id: draft.journey_id,
            position: position(draft.position)?,
            title: required_text("title", &draft.title, STEP_TITLE_MAX)?,
            description: optional_text(
                "description",
                draft.description.as_deref(),
                STEP_DESCRIPTION_MAX,
            )?,
            riddle: optional_text("riddle", draft.riddle.as_deref(), RIDDLE_MAX)?,
            location: draft.location,
            image: optional_text("image", draft.image.as_deref(), usize::MAX)?,
            readings: draft.readings,
            note: optional_text("note", draft.note.as_deref(), NOTE_MAX)?,
            recorded_at: draft.recorded_at,
            created_at,
        })
    }
}

/// Partial step update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepChanges {
    pub position: Option<i32>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub riddle: Option<String>,
    pub location: Option<GeoPoint>,
    pub image: Option<String>,
    pub accuracy: Option<f64>,
    pub altitude: Option<f64>,
    pub speed: Option<f64>,
    pub note: Option<String>,
    pub recorded_at: Option<DateTime<Utc>>,
}

/// Raw partial step fields supplied by a caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepPatch {
    pub position: Option<i32>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub riddle: Option<String>,
    pub location: Option<GeoPoint>,
    pub image: Option<String>,
    pub readings: StepReadings,
    pub note: Option<String>,
    pub recorded_at: Option<DateTime<Utc>>,
}

impl StepChanges {
    /// Validate a partial draft.
    pub fn try_from_patch(patch: StepPatch) -> Result<Self, FieldError> {
        Ok(Self {
            position: position(patch.position)?,
            title: patch
                .title
                .map(|value| required_text("title", &value, STEP_TITLE_MAX))
                .transpose()?,
            description: optional_text(
                "description",
                patch.description.as_deref(),
                STEP_DESCRIPTION_MAX,
            )?,
            riddle: optional_text("riddle", patch.riddle.as_deref(), RIDDLE_MAX)?,
            location: patch.location,
            image: optional_text("image", patch.image.as_deref(), usize::MAX)?,
            accuracy: patch.readings.accuracy,
            altitude: patch.readings.altitude,
            speed: patch.readings.speed,
            note: optional_text("note", patch.note.as_deref(), NOTE_MAX)?,
            recorded_at: patch.recorded_at,
        })
    }
}
