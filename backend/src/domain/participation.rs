//! A user's enrolment in a journey and their saved journeys.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::macros::define_text_enum;
use super::{JourneyId, ParticipationId, UserId, UserJourneyId};

define_text_enum! {
    /// Invitation lifecycle of a participation.
    pub enum ParticipationStatus ("status") {
        Invited => "invited",
        Accepted => "accepted",
        Declined => "declined",
        Completed => "completed",
    }
}

/// Stored participation.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Participation {
    #[schema(value_type = String, format = "uuid")]
    pub id: ParticipationId,
    #[schema(value_type = String, format = "uuid")]
    pub user_id: UserId,
    #[schema(value_type = String, format = "uuid")]
    pub journey_id: JourneyId,
    pub status: ParticipationStatus,
    pub invited_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

/// `responded_at` for a participation entering `status` at `now`.
///
/// Leaving `invited` stamps the response time; returning to `invited`
/// clears it.
pub fn responded_at_for(status: ParticipationStatus, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match status {
        ParticipationStatus::Invited => None,
        _ => Some(now),
    }
}

impl Participation {
    /// Build a new participation row entering `status` at `now`.
    pub fn new(
        user_id: UserId,
        journey_id: JourneyId,
        status: ParticipationStatus,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ParticipationId::random(),
            user_id,
            journey_id,
            status,
            invited_at: now,
            responded_at: responded_at_for(status, now),
        }
    }
}

/// Optional filters for listing participations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParticipationFilter {
    pub user_id: Option<UserId>,
    pub journey_id: Option<JourneyId>,
}

/// Stored user-journey link.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserJourney {
    #[schema(value_type = String, format = "uuid")]
    pub id: UserJourneyId,
    #[schema(value_type = String, format = "uuid")]
    pub user_id: UserId,
    #[schema(value_type = String, format = "uuid")]
    pub journey_id: JourneyId,
    pub created_at: DateTime<Utc>,
}

impl UserJourney {
    /// Build a new link stamped at `created_at`.
    pub fn new(user_id: UserId, journey_id: JourneyId, created_at: DateTime<Utc>) -> Self {
        Self {
            id: UserJourneyId::random(),
            user_id,
            journey_id,
            created_at,
        }
    }
}

/// User-journey link joined with journey and user names.
#[derive(Debug, Clone, PartialEq)]
pub struct UserJourneyRow {
    pub journey_id: JourneyId,
    pub journey_name: String,
    pub user_id: UserId,
    pub username: String,
}

/// Users who saved one journey.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JourneyAudience {
    #[schema(value_type = String, format = "uuid")]
    pub journey_id: JourneyId,
    pub journey_name: String,
    pub users: Vec<AudienceMember>,
}

/// One entry of [`JourneyAudience::users`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AudienceMember {
    #[schema(value_type = String, format = "uuid")]
    pub user_id: UserId,
    pub username: String,
}

/// Group link rows by journey, keeping first-seen journey order.
pub fn group_by_journey(rows: Vec<UserJourneyRow>) -> Vec<JourneyAudience> {
    let mut grouped: Vec<JourneyAudience> = Vec::new();
    for row in rows {
        let member = AudienceMember {
            user_id: row.user_id,
            username: row.username,
        };
        match grouped.iter_mut().find(|g| g.journey_id == row.journey_id) {
            Some(existing) => existing.users.push(member),
            None => grouped.push(JourneyAudience {
                journey_id: row.journey_id,
                journey_name: row.journey_name,
                users: vec![member],
            }),
        }
    }
    grouped
}
