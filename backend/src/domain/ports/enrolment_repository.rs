//! Ports for participation and saved-journey persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    JourneyId, Participation, ParticipationFilter, ParticipationId, ParticipationStatus, UserId,
    UserJourney, UserJourneyId, UserJourneyRow,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by participation and user-journey adapters.
    pub enum EnrolmentPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "enrolment repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "enrolment repository query failed: {message}",
        /// The user already has a row for this journey.
        Duplicate { message: String } => "enrolment already exists: {message}",
        /// Referenced user or journey does not exist.
        MissingReference { message: String } => "enrolment references unknown row: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ParticipationRepository: Send + Sync {
    /// Participations matching the filter, newest invitation first.
    async fn list(
        &self,
        filter: ParticipationFilter,
    ) -> Result<Vec<Participation>, EnrolmentPersistenceError>;

    /// Fetch a participation by identifier.
    async fn find(
        &self,
        id: ParticipationId,
    ) -> Result<Option<Participation>, EnrolmentPersistenceError>;

    /// Insert a participation.
    async fn create(
        &self,
        participation: &Participation,
    ) -> Result<Participation, EnrolmentPersistenceError>;

    /// Overwrite status and response time.
    async fn set_status(
        &self,
        id: ParticipationId,
        status: ParticipationStatus,
        responded_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Participation>, EnrolmentPersistenceError>;

    /// Delete a participation; `false` when it did not exist.
    async fn delete(&self, id: ParticipationId) -> Result<bool, EnrolmentPersistenceError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserJourneyRepository: Send + Sync {
    /// Links joined with names, optionally for one user, ordered by journey.
    async fn rows(
        &self,
        user: Option<UserId>,
    ) -> Result<Vec<UserJourneyRow>, EnrolmentPersistenceError>;

    /// Insert a link.
    async fn create(&self, link: &UserJourney) -> Result<UserJourney, EnrolmentPersistenceError>;

    /// Point a link at another journey.
    async fn set_journey(
        &self,
        id: UserJourneyId,
        journey: JourneyId,
    ) -> Result<Option<UserJourney>, EnrolmentPersistenceError>;

    /// Delete a link; `false` when it did not exist.
    async fn delete(&self, id: UserJourneyId) -> Result<bool, EnrolmentPersistenceError>;
}
