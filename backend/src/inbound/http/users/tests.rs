//! Tests for the users handlers.

use actix_web::http::StatusCode;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::domain::ports::LoginOutcome;
use crate::domain::{EmailAddress, ErrorCode, Username};
use crate::inbound::http::test_utils::{TestPorts, bearer, fixture_timestamp, send};

fn sample_user(id: UserId) -> User {
    User {
        id,
        username: Username::new("ann").expect("valid username"),
        email: EmailAddress::new("ann@example.com").expect("valid email"),
        bio: None,
        profile_picture: None,
        created_at: fixture_timestamp(),
        updated_at: fixture_timestamp(),
    }
}

#[actix_web::test]
async fn login_returns_token_and_camel_case_user() {
    let mut ports = TestPorts::default();
    let id = UserId::random();
    ports
        .accounts
        .expect_login()
        .withf(|credentials| credentials.identifier() == "ann@example.com")
        .return_once(move |_| {
            Ok(LoginOutcome {
                token: "jwt".to_owned(),
                user: sample_user(id),
            })
        });

    let (status, body) = send(
        ports,
        actix_test::TestRequest::post()
            .uri("/api/v1/users/login")
            .set_json(json!({"email": "ann@example.com", "password": "secret"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["token"], "jwt");
    assert_eq!(body["user"]["createdAt"], "2025-05-12T09:30:00Z");
    assert!(body["user"].get("passwordHash").is_none());
}

#[rstest]
#[case(json!({"email": "  ", "password": "secret"}), "email")]
#[case(json!({"email": "ann"}), "password")]
#[actix_web::test]
async fn login_requires_both_fields(#[case] payload: Value, #[case] field: &str) {
    let (status, body) = send(
        TestPorts::default(),
        actix_test::TestRequest::post()
            .uri("/api/v1/users/login")
            .set_json(payload),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], field);
}

#[actix_web::test]
async fn sign_up_rejects_unknown_fields() {
    let (status, body) = send(
        TestPorts::default(),
        actix_test::TestRequest::post().uri("/api/v1/users").set_json(json!({
            "username": "ann",
            "email": "ann@example.com",
            "password": "secret",
            "isAdmin": true
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["code"], "invalid_body");
}

#[actix_web::test]
async fn sign_up_returns_created() {
    let mut ports = TestPorts::default();
    ports
        .accounts
        .expect_sign_up()
        .withf(|request| request.username == "ann" && request.bio.is_none())
        .return_once(|_| Ok(sample_user(UserId::random())));

    let (status, body) = send(
        ports,
        actix_test::TestRequest::post().uri("/api/v1/users").set_json(json!({
            "username": "ann",
            "email": "ann@example.com",
            "password": "secret"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "ann");
}

#[actix_web::test]
async fn malformed_path_id_is_invalid_uuid() {
    let (status, body) = send(
        TestPorts::default(),
        actix_test::TestRequest::get().uri("/api/v1/users/not-a-uuid"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["code"], "invalid_uuid");
    assert_eq!(body["details"]["field"], "id");
}

#[actix_web::test]
async fn update_requires_a_token() {
    let (status, _) = send(
        TestPorts::default(),
        actix_test::TestRequest::put()
            .uri(&format!("/api/v1/users/{}", UserId::random()))
            .set_json(json!({"bio": "hi"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn updating_someone_else_is_forbidden() {
    let mut ports = TestPorts::default();
    let caller = UserId::random();
    ports.authenticate(caller);
    ports
        .accounts
        .expect_update_user()
        .return_once(|_, _, _| Err(Error::forbidden("You can only modify your own account")));

    let (status, body) = send(
        ports,
        actix_test::TestRequest::put()
            .uri(&format!("/api/v1/users/{}", UserId::random()))
            .insert_header(bearer())
            .set_json(json!({"bio": "hi"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");
}

#[actix_web::test]
async fn delete_echoes_the_id() {
    let mut ports = TestPorts::default();
    let caller = UserId::random();
    ports.authenticate(caller);
    ports
        .accounts
        .expect_delete_user()
        .withf(move |principal, id| principal.is(caller) && *id == caller)
        .return_once(|_, _| Ok(()));

    let (status, body) = send(
        ports,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/users/{caller}"))
            .insert_header(bearer()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], caller.to_string());
}

#[actix_web::test]
async fn upload_forwards_raw_bytes_and_content_type() {
    let mut ports = TestPorts::default();
    let caller = UserId::random();
    ports.authenticate(caller);
    ports
        .accounts
        .expect_upload_profile_picture()
        .withf(|_, _, upload| upload.content_type == "image/png" && upload.bytes == b"png")
        .return_once(|_, _, _| Ok("https://img.example/pic.png".to_owned()));

    let (status, body) = send(
        ports,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/users/{caller}/upload-profile"))
            .insert_header(bearer())
            .insert_header((CONTENT_TYPE, "image/png"))
            .set_payload("png"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profilePicture"], "https://img.example/pic.png");
}

#[actix_web::test]
async fn unavailable_image_host_surfaces_as_503() {
    let mut ports = TestPorts::default();
    let caller = UserId::random();
    ports.authenticate(caller);
    ports
        .accounts
        .expect_upload_profile_picture()
        .return_once(|_, _, _| Err(Error::service_unavailable("image host is not configured")));

    let (status, body) = send(
        ports,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/users/{caller}/upload-profile"))
            .insert_header(bearer())
            .insert_header((CONTENT_TYPE, "image/jpeg"))
            .set_payload("jpg"),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], serde_json::to_value(ErrorCode::ServiceUnavailable).expect("code"));
}
