//! Journey and step service implementing [`JourneyCatalogue`].

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::geo::{GeoPoint, GuessEvaluation, evaluate_guess};
use crate::domain::ports::{
    JourneyCatalogue, JourneyPersistenceError, JourneyRepository, StepRepository,
};
use crate::domain::{
    Error, Journey, JourneyChanges, JourneyDraft, JourneyId, JourneyPatch, NewJourney, NewStep,
    Step, StepChanges, StepDraft, StepId, StepPatch,
};

fn map_journey_error(error: JourneyPersistenceError) -> Error {
    match error {
        JourneyPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("journey repository unavailable: {message}"))
        }
        JourneyPersistenceError::Query { message } => {
            Error::internal(format!("journey repository error: {message}"))
        }
        JourneyPersistenceError::MissingReference { message } => {
            Error::not_found(format!("Referenced row not found: {message}"))
        }
    }
}

fn journey_not_found() -> Error {
    Error::not_found("Journey not found")
}

fn step_not_found() -> Error {
    Error::not_found("Step not found")
}

/// Journey service backed by journey and step repositories.
#[derive(Clone)]
pub struct JourneyService<J, S> {
    journeys: Arc<J>,
    steps: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<J, S> JourneyService<J, S> {
    pub fn new(journeys: Arc<J>, steps: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            journeys,
            steps,
            clock,
        }
    }
}

#[async_trait]
impl<J, S> JourneyCatalogue for JourneyService<J, S>
where
    J: JourneyRepository,
    S: StepRepository,
{
    async fn list_journeys(&self) -> Result<Vec<Journey>, Error> {
        self.journeys.list().await.map_err(map_journey_error)
    }

    async fn get_journey(&self, id: JourneyId) -> Result<Journey, Error> {
        self.journeys
            .find(id)
            .await
            .map_err(map_journey_error)?
            .ok_or_else(journey_not_found)
    }

    async fn create_journey(&self, draft: JourneyDraft) -> Result<Journey, Error> {
        let journey = NewJourney::try_from_draft(draft, self.clock.utc())?;
        let created = self
            .journeys
            .create(&journey)
            .await
            .map_err(map_journey_error)?;
        info!(journey_id = %created.id, "journey created");
        Ok(created)
    }

    async fn update_journey(&self, id: JourneyId, patch: JourneyPatch) -> Result<Journey, Error> {
        let changes = JourneyChanges::try_from_patch(patch)?;
        self.journeys
            .update(id, &changes, self.clock.utc())
            .await
            .map_err(map_journey_error)?
            .ok_or_else(journey_not_found)
    }

    async fn delete_journey(&self, id: JourneyId) -> Result<(), Error> {
        if self.journeys.delete(id).await.map_err(map_journey_error)? {
            info!(journey_id = %id, "journey deleted");
            Ok(())
        } else {
            Err(journey_not_found())
        }
    }

    async fn list_steps(&self) -> Result<Vec<Step>, Error> {
        self.steps.list().await.map_err(map_journey_error)
    }

    async fn steps_of(&self, journey: JourneyId) -> Result<Vec<Step>, Error> {
        self.steps
            .list_for_journey(journey)
            .await
            .map_err(map_journey_error)
    }

    async fn get_step(&self, id: StepId) -> Result<Step, Error> {
        self.steps
            .find(id)
            .await
            .map_err(map_journey_error)?
            .ok_or_else(step_not_found)
    }

    async fn create_step(&self, draft: StepDraft) -> Result<Step, Error> {
        let step = NewStep::try_from_draft(draft, self.clock.utc())?;
        self.steps
            .create(&step)
            .await
            .map_err(|error| match error {
                JourneyPersistenceError::MissingReference { .. } => journey_not_found(),
                other => map_journey_error(other),
            })
    }

    async fn update_step(&self, id: StepId, patch: StepPatch) -> Result<Step, Error> {
        let changes = StepChanges::try_from_patch(patch)?;
        self.steps
            .update(id, &changes, self.clock.utc())
            .await
            .map_err(map_journey_error)?
            .ok_or_else(step_not_found)
    }

    async fn delete_step(&self, id: StepId) -> Result<(), Error> {
        if self.steps.delete(id).await.map_err(map_journey_error)? {
            Ok(())
        } else {
            Err(step_not_found())
        }
    }

    async fn guess(&self, id: StepId, guess: GeoPoint) -> Result<GuessEvaluation, Error> {
        let step = self.get_step(id).await?;
        Ok(evaluate_guess(step.location, guess))
    }
}

#[cfg(test)]
#[path = "journey_service_tests.rs"]
mod tests;
