//! Driving port for journeys, their steps and location guesses.

use async_trait::async_trait;

use crate::domain::geo::{GeoPoint, GuessEvaluation};
use crate::domain::{
    Error, Journey, JourneyDraft, JourneyId, JourneyPatch, Step, StepDraft, StepId, StepPatch,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JourneyCatalogue: Send + Sync {
    async fn list_journeys(&self) -> Result<Vec<Journey>, Error>;

    async fn get_journey(&self, id: JourneyId) -> Result<Journey, Error>;

    async fn create_journey(&self, draft: JourneyDraft) -> Result<Journey, Error>;

    async fn update_journey(&self, id: JourneyId, patch: JourneyPatch) -> Result<Journey, Error>;

    /// Delete a journey; steps, participations, ratings and scores go with it.
    async fn delete_journey(&self, id: JourneyId) -> Result<(), Error>;

    async fn list_steps(&self) -> Result<Vec<Step>, Error>;

    /// Steps of a journey ordered by position.
    async fn steps_of(&self, journey: JourneyId) -> Result<Vec<Step>, Error>;

    async fn get_step(&self, id: StepId) -> Result<Step, Error>;

    /// Create a step; without a position it is appended to its journey.
    async fn create_step(&self, draft: StepDraft) -> Result<Step, Error>;

    async fn update_step(&self, id: StepId, patch: StepPatch) -> Result<Step, Error>;

    async fn delete_step(&self, id: StepId) -> Result<(), Error>;

    /// Score a guessed position against the step location.
    async fn guess(&self, id: StepId, guess: GeoPoint) -> Result<GuessEvaluation, Error>;
}
