//! Tests for the enrolment service.

use std::sync::Arc;

use rstest::rstest;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::UserJourneyRow;
use crate::domain::ports::{MockParticipationRepository, MockUserJourneyRepository};
use crate::domain::service_test_support::{fixture_clock, fixture_timestamp};

fn service(
    participations: MockParticipationRepository,
    saved: MockUserJourneyRepository,
) -> EnrolmentService<MockParticipationRepository, MockUserJourneyRepository> {
    EnrolmentService::new(Arc::new(participations), Arc::new(saved), fixture_clock())
}

fn request(status: Option<ParticipationStatus>) -> ParticipationRequest {
    ParticipationRequest {
        user_id: UserId::random(),
        journey_id: JourneyId::random(),
        status,
    }
}

#[tokio::test]
async fn participation_defaults_to_invited_without_response_time() {
    let mut participations = MockParticipationRepository::new();
    participations
        .expect_create()
        .withf(|p| p.status == ParticipationStatus::Invited && p.responded_at.is_none())
        .times(1)
        .return_once(|p| Ok(p.clone()));

    let created = service(participations, MockUserJourneyRepository::new())
        .create_participation(request(None))
        .await
        .expect("created");
    assert_eq!(created.invited_at, fixture_timestamp());
}

#[tokio::test]
async fn second_participation_for_same_pair_conflicts() {
    let mut participations = MockParticipationRepository::new();
    participations
        .expect_create()
        .return_once(|_| Err(EnrolmentPersistenceError::duplicate("user_id, journey_id")));

    let error = service(participations, MockUserJourneyRepository::new())
        .create_participation(request(Some(ParticipationStatus::Accepted)))
        .await
        .expect_err("conflict");
    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[rstest]
#[case(ParticipationStatus::Accepted, true)]
#[case(ParticipationStatus::Completed, true)]
#[case(ParticipationStatus::Invited, false)]
#[tokio::test]
async fn status_change_stamps_response_time(
    #[case] status: ParticipationStatus,
    #[case] stamped: bool,
) {
    let mut participations = MockParticipationRepository::new();
    participations
        .expect_set_status()
        .withf(move |_, next, responded_at| {
            *next == status && responded_at.is_some() == stamped
        })
        .times(1)
        .return_once(|id, status, responded_at| {
            Ok(Some(Participation {
                id,
                user_id: UserId::random(),
                journey_id: JourneyId::random(),
                status,
                invited_at: fixture_timestamp(),
                responded_at,
            }))
        });

    let updated = service(participations, MockUserJourneyRepository::new())
        .update_participation(ParticipationId::random(), status)
        .await
        .expect("updated");
    assert_eq!(updated.status, status);
}

#[tokio::test]
async fn saved_journeys_are_grouped_by_journey() {
    let (first, second) = (JourneyId::random(), JourneyId::random());
    let row = |journey_id, journey_name: &str, username: &str| UserJourneyRow {
        journey_id,
        journey_name: journey_name.to_owned(),
        user_id: UserId::random(),
        username: username.to_owned(),
    };
    let rows = vec![
        row(first, "Old town", "ann"),
        row(second, "Harbour", "bob"),
        row(first, "Old town", "cid"),
    ];
    let mut saved = MockUserJourneyRepository::new();
    saved
        .expect_rows()
        .withf(|user| user.is_none())
        .return_once(move |_| Ok(rows));

    let grouped = service(MockParticipationRepository::new(), saved)
        .saved_journeys(None)
        .await
        .expect("grouped");
    assert_eq!(grouped.len(), 2);
    assert_eq!(grouped[0].journey_id, first);
    let names: Vec<_> = grouped[0].users.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, ["ann", "cid"]);
}

#[tokio::test]
async fn saving_journey_twice_conflicts() {
    let mut saved = MockUserJourneyRepository::new();
    saved
        .expect_create()
        .return_once(|_| Err(EnrolmentPersistenceError::duplicate("pair")));

    let error = service(MockParticipationRepository::new(), saved)
        .save_journey(UserId::random(), JourneyId::random())
        .await
        .expect_err("conflict");
    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(error.message(), "Journey already saved by this user");
}

#[tokio::test]
async fn moving_unknown_saved_journey_is_not_found() {
    let mut saved = MockUserJourneyRepository::new();
    saved.expect_set_journey().return_once(|_, _| Ok(None));

    let error = service(MockParticipationRepository::new(), saved)
        .move_saved_journey(UserJourneyId::random(), JourneyId::random())
        .await
        .expect_err("missing");
    assert_eq!(error.code(), ErrorCode::NotFound);
}
