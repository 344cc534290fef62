//! Tests for the journey service.

use std::sync::Arc;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::StepReadings;
use crate::domain::ports::{MockJourneyRepository, MockStepRepository};
use crate::domain::service_test_support::{fixture_clock, fixture_timestamp};

fn service(
    journeys: MockJourneyRepository,
    steps: MockStepRepository,
) -> JourneyService<MockJourneyRepository, MockStepRepository> {
    JourneyService::new(Arc::new(journeys), Arc::new(steps), fixture_clock())
}

fn point(lat: f64, lng: f64) -> GeoPoint {
    GeoPoint::new(lat, lng).expect("valid point")
}

fn stored_step(new: &NewStep, position: i32) -> Step {
    Step {
        id: new.id,
        journey_id: new.journey_id,
        position,
        title: new.title.clone(),
        description: new.description.clone(),
        riddle: new.riddle.clone(),
        location: new.location,
        image: new.image.clone(),
        readings: new.readings,
        note: new.note.clone(),
        recorded_at: new.recorded_at,
        created_at: new.created_at,
        updated_at: new.created_at,
    }
}

fn step_draft(journey_id: JourneyId) -> StepDraft {
    StepDraft {
        journey_id,
        position: None,
        title: "Fountain".to_owned(),
        description: None,
        riddle: Some("Where does the water sing?".to_owned()),
        location: point(48.8584, 2.2945),
        image: None,
        readings: StepReadings::default(),
        note: None,
        recorded_at: None,
    }
}

#[tokio::test]
async fn create_journey_validates_and_stamps_creation_time() {
    let mut journeys = MockJourneyRepository::new();
    journeys
        .expect_create()
        .withf(|journey| {
            journey.name == "Old town" && journey.created_at == fixture_timestamp()
        })
        .times(1)
        .return_once(|journey| {
            Ok(Journey {
                id: journey.id,
                name: journey.name.clone(),
                description: journey.description.clone(),
                town: journey.town.clone(),
                image: None,
                target: None,
                group_id: None,
                created_at: journey.created_at,
                updated_at: journey.created_at,
            })
        });

    let draft = JourneyDraft {
        name: " Old town ".to_owned(),
        description: "A walk through the old town".to_owned(),
        ..JourneyDraft::default()
    };
    let journey = service(journeys, MockStepRepository::new())
        .create_journey(draft)
        .await
        .expect("journey created");
    assert_eq!(journey.name, "Old town");
}

#[tokio::test]
async fn journey_without_description_is_rejected() {
    let draft = JourneyDraft {
        name: "Old town".to_owned(),
        ..JourneyDraft::default()
    };
    let error = service(MockJourneyRepository::new(), MockStepRepository::new())
        .create_journey(draft)
        .await
        .expect_err("missing description");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.details().expect("details")["field"], "description");
}

#[tokio::test]
async fn create_step_appends_when_position_missing() {
    let journey_id = JourneyId::random();
    let mut steps = MockStepRepository::new();
    steps
        .expect_create()
        .withf(move |step| step.position.is_none() && step.journey_id == journey_id)
        .times(1)
        .return_once(|step| Ok(stored_step(step, 3)));

    let step = service(MockJourneyRepository::new(), steps)
        .create_step(step_draft(journey_id))
        .await
        .expect("step created");
    assert_eq!(step.position, 3);
}

#[tokio::test]
async fn create_step_for_unknown_journey_is_not_found() {
    let mut steps = MockStepRepository::new();
    steps
        .expect_create()
        .return_once(|_| Err(JourneyPersistenceError::missing_reference("journey_id")));

    let error = service(MockJourneyRepository::new(), steps)
        .create_step(step_draft(JourneyId::random()))
        .await
        .expect_err("missing journey");
    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(error.message(), "Journey not found");
}

#[tokio::test]
async fn guess_scores_distance_to_step_location() {
    let draft = step_draft(JourneyId::random());
    let new_step = NewStep::try_from_draft(draft, fixture_timestamp()).expect("valid step");
    let step = stored_step(&new_step, 0);
    let id = step.id;
    let mut steps = MockStepRepository::new();
    steps.expect_find().return_once(move |_| Ok(Some(step)));

    let evaluation = service(MockJourneyRepository::new(), steps)
        .guess(id, point(48.8584, 2.2945))
        .await
        .expect("guess scored");
    assert_eq!(evaluation.distance_meters, 0.0);
    assert_eq!(evaluation.tier.points, 100);
}

#[tokio::test]
async fn guess_on_unknown_step_is_not_found() {
    let mut steps = MockStepRepository::new();
    steps.expect_find().return_once(|_| Ok(None));

    let error = service(MockJourneyRepository::new(), steps)
        .guess(StepId::random(), point(0.0, 0.0))
        .await
        .expect_err("missing step");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn deleting_unknown_journey_is_not_found() {
    let mut journeys = MockJourneyRepository::new();
    journeys.expect_delete().return_once(|_| Ok(false));

    let error = service(journeys, MockStepRepository::new())
        .delete_journey(JourneyId::random())
        .await
        .expect_err("missing");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn query_failures_surface_as_internal_errors() {
    let mut journeys = MockJourneyRepository::new();
    journeys
        .expect_list()
        .return_once(|| Err(JourneyPersistenceError::query("syntax error")));

    let error = service(journeys, MockStepRepository::new())
        .list_journeys()
        .await
        .expect_err("query failure");
    assert_eq!(error.code(), ErrorCode::InternalError);
}
