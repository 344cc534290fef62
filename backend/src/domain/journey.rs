//! Journeys: scavenger-hunt courses made of geolocated steps.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::geo::GeoPoint;
use super::validation::{optional_text, required_text, FieldError};
use super::{GroupId, JourneyId};

/// Maximum journey name length.
pub const JOURNEY_NAME_MAX: usize = 200;
/// Maximum journey description length.
pub const JOURNEY_DESCRIPTION_MAX: usize = 1000;
/// Maximum town name length.
pub const TOWN_MAX: usize = 200;

/// Stored journey.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Journey {
    #[schema(value_type = String, format = "uuid")]
    pub id: JourneyId,
    pub name: String,
    pub description: String,
    pub town: Option<String>,
    pub image: Option<String>,
    pub target: Option<GeoPoint>,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub group_id: Option<GroupId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw journey fields supplied by a caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JourneyDraft {
    pub name: String,
    pub description: String,
    pub town: Option<String>,
    pub image: Option<String>,
    pub target: Option<GeoPoint>,
    pub group_id: Option<GroupId>,
}

/// Validated journey ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct NewJourney {
    pub id: JourneyId,
    pub name: String,
    pub description: String,
    pub town: Option<String>,
    pub image: Option<String>,
    pub target: Option<GeoPoint>,
    pub group_id: Option<GroupId>,
    pub created_at: DateTime<Utc>,
}

impl NewJourney {
    /// Validate a draft into a journey stamped at `created_at`.
    pub fn try_from_draft(
        draft: JourneyDraft,
        created_at: DateTime<Utc>,
    ) -> Result<Self, FieldError> {
        Ok(Self {
            id: JourneyId::random(),
            name: required_text("name", &draft.name, JOURNEY_NAME_MAX)?,
            description: required_text(
                "description",
                &draft.description,
                JOURNEY_DESCRIPTION_MAX,
            )?,
            town: optional_text("town", draft.town.as_deref(), TOWN_MAX)?,
            image: optional_text("image", draft.image.as_deref(), usize::MAX)?,
            target: draft.target,
            group_id: draft.group_id,
            created_at,
        })
    }
}

/// Raw partial journey fields supplied by a caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JourneyPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub town: Option<String>,
    pub image: Option<String>,
    pub target: Option<GeoPoint>,
    pub group_id: Option<GroupId>,
}

/// Partial journey update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JourneyChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub town: Option<String>,
    pub image: Option<String>,
    pub target: Option<GeoPoint>,
    pub group_id: Option<GroupId>,
}

impl JourneyChanges {
    /// Validate replacement values from a partial draft.
    pub fn try_from_patch(patch: JourneyPatch) -> Result<Self, FieldError> {
        Ok(Self {
            name: patch
                .name
                .map(|value| required_text("name", &value, JOURNEY_NAME_MAX))
                .transpose()?,
            description: patch
                .description
                .map(|value| required_text("description", &value, JOURNEY_DESCRIPTION_MAX))
                .transpose()?,
            town: optional_text("town", patch.town.as_deref(), TOWN_MAX)?,
            image: optional_text("image", patch.image.as_deref(), usize::MAX)?,
            target: patch.target,
            group_id: patch.group_id,
        })
    }
}
