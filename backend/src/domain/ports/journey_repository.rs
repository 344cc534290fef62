//! Ports for journey and step persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Journey, JourneyChanges, JourneyId, NewJourney, NewStep, Step, StepChanges, StepId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by journey and step repository adapters.
    pub enum JourneyPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "journey repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "journey repository query failed: {message}",
        /// Referenced journey or group does not exist.
        MissingReference { message: String } => "journey references unknown row: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JourneyRepository: Send + Sync {
    /// Every journey, newest first.
    async fn list(&self) -> Result<Vec<Journey>, JourneyPersistenceError>;

    /// Fetch a journey by identifier.
    async fn find(&self, id: JourneyId) -> Result<Option<Journey>, JourneyPersistenceError>;

    /// Insert a journey.
    async fn create(&self, journey: &NewJourney) -> Result<Journey, JourneyPersistenceError>;

    /// Apply partial changes; `None` when the journey does not exist.
    async fn update(
        &self,
        id: JourneyId,
        changes: &JourneyChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<Journey>, JourneyPersistenceError>;

    /// Delete a journey and, through cascades, its steps and relations.
    async fn delete(&self, id: JourneyId) -> Result<bool, JourneyPersistenceError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StepRepository: Send + Sync {
    /// Every step, grouped by journey and ordered by position.
    async fn list(&self) -> Result<Vec<Step>, JourneyPersistenceError>;

    /// Steps of one journey ordered by position.
    async fn list_for_journey(
        &self,
        journey: JourneyId,
    ) -> Result<Vec<Step>, JourneyPersistenceError>;

    /// Fetch a step by identifier.
    async fn find(&self, id: StepId) -> Result<Option<Step>, JourneyPersistenceError>;

    /// Insert a step. A missing position takes the next free one in the
    /// journey.
    async fn create(&self, step: &NewStep) -> Result<Step, JourneyPersistenceError>;

    /// Apply partial changes; `None` when the step does not exist.
    async fn update(
        &self,
        id: StepId,
        changes: &StepChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<Step>, JourneyPersistenceError>;

    /// Delete a step; `false` when it did not exist.
    async fn delete(&self, id: StepId) -> Result<bool, JourneyPersistenceError>;
}
