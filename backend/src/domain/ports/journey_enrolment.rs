//! Driving port for participations and saved journeys.

use async_trait::async_trait;

use crate::domain::{
    Error, JourneyAudience, JourneyId, Participation, ParticipationFilter, ParticipationId,
    ParticipationStatus, UserId, UserJourney, UserJourneyId,
};

/// Raw participation fields; the status defaults to `invited`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParticipationRequest {
    pub user_id: UserId,
    pub journey_id: JourneyId,
    pub status: Option<ParticipationStatus>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JourneyEnrolment: Send + Sync {
    async fn list_participations(
        &self,
        filter: ParticipationFilter,
    ) -> Result<Vec<Participation>, Error>;

    async fn get_participation(&self, id: ParticipationId) -> Result<Participation, Error>;

    /// Create a participation; a second one for the same pair conflicts.
    async fn create_participation(
        &self,
        request: ParticipationRequest,
    ) -> Result<Participation, Error>;

    /// Replace the status, stamping the response time.
    async fn update_participation(
        &self,
        id: ParticipationId,
        status: ParticipationStatus,
    ) -> Result<Participation, Error>;

    async fn delete_participation(&self, id: ParticipationId) -> Result<(), Error>;

    /// Saved journeys grouped by journey, optionally for one user.
    async fn saved_journeys(&self, user: Option<UserId>) -> Result<Vec<JourneyAudience>, Error>;

    /// Save a journey for a user; saving it twice conflicts.
    async fn save_journey(&self, user: UserId, journey: JourneyId) -> Result<UserJourney, Error>;

    /// Point a saved entry at another journey.
    async fn move_saved_journey(
        &self,
        id: UserJourneyId,
        journey: JourneyId,
    ) -> Result<UserJourney, Error>;

    async fn delete_saved_journey(&self, id: UserJourneyId) -> Result<(), Error>;
}
