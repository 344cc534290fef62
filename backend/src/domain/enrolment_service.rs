//! Participation and saved-journey service implementing [`JourneyEnrolment`].
//!
//! Both relations allow one row per (user, journey); a second create is a
//! conflict rather than an overwrite.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    EnrolmentPersistenceError, JourneyEnrolment, ParticipationRepository, ParticipationRequest,
    UserJourneyRepository,
};
use crate::domain::{
    Error, JourneyAudience, JourneyId, Participation, ParticipationFilter, ParticipationId,
    ParticipationStatus, UserId, UserJourney, UserJourneyId, group_by_journey, responded_at_for,
};

fn map_enrolment_error(error: EnrolmentPersistenceError, duplicate: &str) -> Error {
    match error {
        EnrolmentPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("enrolment repository unavailable: {message}"))
        }
        EnrolmentPersistenceError::Query { message } => {
            Error::internal(format!("enrolment repository error: {message}"))
        }
        EnrolmentPersistenceError::Duplicate { .. } => Error::conflict(duplicate),
        EnrolmentPersistenceError::MissingReference { .. } => {
            Error::not_found("User or journey not found")
        }
    }
}

fn participation_error(error: EnrolmentPersistenceError) -> Error {
    map_enrolment_error(error, "User already participates in this journey")
}

fn saved_journey_error(error: EnrolmentPersistenceError) -> Error {
    map_enrolment_error(error, "Journey already saved by this user")
}

fn participation_not_found() -> Error {
    Error::not_found("Participation not found")
}

fn saved_journey_not_found() -> Error {
    Error::not_found("User journey not found")
}

/// Enrolment service backed by participation and user-journey repositories.
#[derive(Clone)]
pub struct EnrolmentService<P, U> {
    participations: Arc<P>,
    saved: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<P, U> EnrolmentService<P, U> {
    pub fn new(participations: Arc<P>, saved: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self {
            participations,
            saved,
            clock,
        }
    }
}

#[async_trait]
impl<P, U> JourneyEnrolment for EnrolmentService<P, U>
where
    P: ParticipationRepository,
    U: UserJourneyRepository,
{
    async fn list_participations(
        &self,
        filter: ParticipationFilter,
    ) -> Result<Vec<Participation>, Error> {
        self.participations
            .list(filter)
            .await
            .map_err(participation_error)
    }

    async fn get_participation(&self, id: ParticipationId) -> Result<Participation, Error> {
        self.participations
            .find(id)
            .await
            .map_err(participation_error)?
            .ok_or_else(participation_not_found)
    }

    async fn create_participation(
        &self,
        request: ParticipationRequest,
    ) -> Result<Participation, Error> {
        let participation = Participation::new(
            request.user_id,
            request.journey_id,
            request.status.unwrap_or(ParticipationStatus::Invited),
            self.clock.utc(),
        );
        let created = self
            .participations
            .create(&participation)
            .await
            .map_err(participation_error)?;
        info!(participation_id = %created.id, status = %created.status, "participation created");
        Ok(created)
    }

    async fn update_participation(
        &self,
        id: ParticipationId,
        status: ParticipationStatus,
    ) -> Result<Participation, Error> {
        let responded_at = responded_at_for(status, self.clock.utc());
        self.participations
            .set_status(id, status, responded_at)
            .await
            .map_err(participation_error)?
            .ok_or_else(participation_not_found)
    }

    async fn delete_participation(&self, id: ParticipationId) -> Result<(), Error> {
        if self
            .participations
            .delete(id)
            .await
            .map_err(participation_error)?
        {
            Ok(())
        } else {
            Err(participation_not_found())
        }
    }

    async fn saved_journeys(&self, user: Option<UserId>) -> Result<Vec<JourneyAudience>, Error> {
        let rows = self.saved.rows(user).await.map_err(saved_journey_error)?;
        Ok(group_by_journey(rows))
    }

    async fn save_journey(&self, user: UserId, journey: JourneyId) -> Result<UserJourney, Error> {
        let link = UserJourney::new(user, journey, self.clock.utc());
        self.saved.create(&link).await.map_err(saved_journey_error)
    }

    async fn move_saved_journey(
        &self,
        id: UserJourneyId,
        journey: JourneyId,
    ) -> Result<UserJourney, Error> {
        self.saved
            .set_journey(id, journey)
            .await
            .map_err(saved_journey_error)?
            .ok_or_else(saved_journey_not_found)
    }

    async fn delete_saved_journey(&self, id: UserJourneyId) -> Result<(), Error> {
        if self.saved.delete(id).await.map_err(saved_journey_error)? {
            Ok(())
        } else {
            Err(saved_journey_not_found())
        }
    }
}

#[cfg(test)]
#[path = "enrolment_service_tests.rs"]
mod tests;
