//! Tests for the ratings handlers.

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use serde_json::json;

use super::*;
use crate::domain::{RatingId, RatingValue, UserId};
use crate::inbound::http::test_utils::{TestPorts, bearer, fixture_timestamp, send};

fn rating(user_id: UserId, value: i64) -> Rating {
    Rating {
        id: RatingId::random(),
        user_id,
        journey_id: JourneyId::random(),
        value: RatingValue::new(value).expect("valid rating"),
        comment: Some("Lovely".to_owned()),
        created_at: fixture_timestamp(),
        updated_at: fixture_timestamp(),
    }
}

#[actix_web::test]
async fn rate_returns_created_envelope() {
    let mut ports = TestPorts::default();
    let caller = UserId::random();
    ports.authenticate(caller);
    ports
        .ratings
        .expect_rate()
        .withf(move |principal, request| {
            principal.is(caller) && request.value == 4 && request.user_id.is_none()
        })
        .return_once(move |_, _| Ok(rating(caller, 4)));

    let (status, body) = send(
        ports,
        actix_test::TestRequest::post()
            .uri("/api/v1/ratings")
            .insert_header(bearer())
            .set_json(json!({"journeyId": JourneyId::random(), "value": 4, "comment": "Lovely"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Rating saved");
    assert_eq!(body["rating"]["value"], 4);
}

#[actix_web::test]
async fn rating_for_someone_else_is_forbidden() {
    let mut ports = TestPorts::default();
    ports.authenticate(UserId::random());
    ports
        .ratings
        .expect_rate()
        .return_once(|_, _| Err(Error::forbidden("You can only rate as yourself")));

    let (status, _) = send(
        ports,
        actix_test::TestRequest::post()
            .uri("/api/v1/ratings")
            .insert_header(bearer())
            .set_json(json!({
                "journeyId": JourneyId::random(),
                "value": 3,
                "userId": UserId::random()
            })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn listing_flattens_author_and_value() {
    let mut ports = TestPorts::default();
    let author = UserId::random();
    let journey = JourneyId::random();
    ports
        .ratings
        .expect_list_ratings()
        .withf(move |filter| filter.journey_id == Some(journey) && filter.user_id.is_none())
        .return_once(move |_| {
            Ok(vec![RatingEntry {
                rating: rating(author, 5),
                username: None,
            }])
        });

    let (status, body) = send(
        ports,
        actix_test::TestRequest::get().uri(&format!("/api/v1/ratings?journeyId={journey}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["rating"], 5);
    assert_eq!(body[0]["userId"], author.to_string());
    assert!(body[0]["username"].is_null());
    assert_eq!(body[0]["createdAt"], "2025-05-12T09:30:00Z");
}

#[actix_web::test]
async fn average_is_served_as_is() {
    let mut ports = TestPorts::default();
    let journey = JourneyId::random();
    ports
        .ratings
        .expect_average()
        .return_once(|id| Ok(RatingAverage::from_totals(id, 12, 3)));

    let (status, body) = send(
        ports,
        actix_test::TestRequest::get().uri(&format!("/api/v1/ratings/average/{journey}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"journeyId": journey, "averageRating": 4.0, "count": 3})
    );
}
