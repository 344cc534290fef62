//! Tests for the participations handlers.

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use serde_json::json;

use super::*;
use crate::domain::{JourneyId, UserId};
use crate::inbound::http::test_utils::{TestPorts, bearer, fixture_timestamp, send};

fn participation(status: ParticipationStatus) -> Participation {
    Participation {
        id: ParticipationId::random(),
        user_id: UserId::random(),
        journey_id: JourneyId::random(),
        status,
        invited_at: fixture_timestamp(),
        responded_at: (status != ParticipationStatus::Invited).then(fixture_timestamp),
    }
}

#[actix_web::test]
async fn listing_forwards_the_query_filter() {
    let mut ports = TestPorts::default();
    let journey = JourneyId::random();
    ports
        .enrolment
        .expect_list_participations()
        .withf(move |filter| filter.journey_id == Some(journey) && filter.user_id.is_none())
        .return_once(|_| Ok(vec![participation(ParticipationStatus::Invited)]));

    let (status, body) = send(
        ports,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/participations?journeyId={journey}&userId=")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["status"], "invited");
    assert!(body[0]["respondedAt"].is_null());
}

#[actix_web::test]
async fn malformed_filter_is_invalid_uuid() {
    let (status, body) = send(
        TestPorts::default(),
        actix_test::TestRequest::get().uri("/api/v1/participations?userId=ann"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "userId");
    assert_eq!(body["details"]["code"], "invalid_uuid");
}

#[actix_web::test]
async fn create_defaults_status_in_the_service() {
    let mut ports = TestPorts::default();
    ports.authenticate(UserId::random());
    ports
        .enrolment
        .expect_create_participation()
        .withf(|request| request.status.is_none())
        .return_once(|_| Ok(participation(ParticipationStatus::Invited)));

    let (status, _) = send(
        ports,
        actix_test::TestRequest::post()
            .uri("/api/v1/participations")
            .insert_header(bearer())
            .set_json(json!({"userId": UserId::random(), "journeyId": JourneyId::random()})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[actix_web::test]
async fn duplicate_pair_conflicts() {
    let mut ports = TestPorts::default();
    ports.authenticate(UserId::random());
    ports
        .enrolment
        .expect_create_participation()
        .return_once(|_| Err(Error::conflict("Participation already exists")));

    let (status, body) = send(
        ports,
        actix_test::TestRequest::post()
            .uri("/api/v1/participations")
            .insert_header(bearer())
            .set_json(json!({"userId": UserId::random(), "journeyId": JourneyId::random()})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Participation already exists");
}

#[actix_web::test]
async fn update_parses_status_labels() {
    let mut ports = TestPorts::default();
    ports.authenticate(UserId::random());
    ports
        .enrolment
        .expect_update_participation()
        .withf(|_, status| *status == ParticipationStatus::Completed)
        .return_once(|_, status| Ok(participation(status)));

    let (status, body) = send(
        ports,
        actix_test::TestRequest::put()
            .uri(&format!("/api/v1/participations/{}", ParticipationId::random()))
            .insert_header(bearer())
            .set_json(json!({"status": "completed"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");
    assert!(body["respondedAt"].is_string());
}

#[actix_web::test]
async fn unknown_status_is_rejected() {
    let mut ports = TestPorts::default();
    ports.authenticate(UserId::random());

    let (status, body) = send(
        ports,
        actix_test::TestRequest::put()
            .uri(&format!("/api/v1/participations/{}", ParticipationId::random()))
            .insert_header(bearer())
            .set_json(json!({"status": "maybe"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "status");
}
