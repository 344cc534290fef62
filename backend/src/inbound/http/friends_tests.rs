//! Tests for the friends handlers.

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use serde_json::json;

use super::*;
use crate::inbound::http::test_utils::{TestPorts, bearer, fixture_timestamp, send, summary};

fn pending_friendship(requester_id: UserId, recipient_id: UserId) -> Friendship {
    Friendship {
        id: FriendshipId::random(),
        requester_id,
        recipient_id,
        status: FriendshipStatus::Pending,
        requested_at: fixture_timestamp(),
        responded_at: None,
    }
}

#[actix_web::test]
async fn send_request_returns_created_envelope() {
    let mut ports = TestPorts::default();
    let caller = UserId::random();
    let friend = UserId::random();
    ports.authenticate(caller);
    ports
        .friends
        .expect_send_request()
        .withf(move |_, requester, recipient| *requester == caller && *recipient == friend)
        .return_once(move |_, requester, recipient| {
            Ok(pending_friendship(requester, recipient))
        });

    let (status, body) = send(
        ports,
        actix_test::TestRequest::post()
            .uri("/api/v1/friends/requests")
            .insert_header(bearer())
            .set_json(json!({"userId": caller, "friendUserId": friend})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Friend request created");
    assert_eq!(body["friendship"]["status"], "pending");
    assert_eq!(body["friendship"]["recipientId"], friend.to_string());
}

#[actix_web::test]
async fn send_request_reports_the_malformed_field() {
    let mut ports = TestPorts::default();
    let caller = ports.authenticate(UserId::random());

    let (status, body) = send(
        ports,
        actix_test::TestRequest::post()
            .uri("/api/v1/friends/requests")
            .insert_header(bearer())
            .set_json(json!({"userId": caller.user_id, "friendUserId": "bob"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "friendUserId");
    assert_eq!(body["details"]["value"], "bob");
}

#[actix_web::test]
async fn reverse_request_conflicts() {
    let mut ports = TestPorts::default();
    ports.authenticate(UserId::random());
    ports
        .friends
        .expect_send_request()
        .return_once(|_, _, _| Err(Error::conflict("Friendship already exists")));

    let (status, body) = send(
        ports,
        actix_test::TestRequest::post()
            .uri("/api/v1/friends/requests")
            .insert_header(bearer())
            .set_json(json!({"userId": UserId::random(), "friendUserId": UserId::random()})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");
}

#[actix_web::test]
async fn refuse_passes_the_answer_through() {
    let mut ports = TestPorts::default();
    let caller = UserId::random();
    ports.authenticate(caller);
    let id = FriendshipId::random();
    ports
        .friends
        .expect_respond()
        .withf(move |_, requested, response| {
            *requested == id && *response == FriendResponse::Refuse
        })
        .return_once(move |_, _, _| {
            let mut friendship = pending_friendship(UserId::random(), caller);
            friendship.status = FriendshipStatus::Refused;
            Ok(friendship)
        });

    let (status, body) = send(
        ports,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/friends/requests/{id}/refuse"))
            .insert_header(bearer()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Friend request refused");
    assert_eq!(body["friendship"]["status"], "refused");
}

#[actix_web::test]
async fn pending_requests_are_shaped_as_notifications() {
    let mut ports = TestPorts::default();
    let sender = summary("bob");
    let friendship_id = FriendshipId::random();
    let other = sender.clone();
    ports.friends.expect_pending_for().return_once(move |_| {
        Ok(vec![PendingFriendRequest {
            friendship_id,
            other,
        }])
    });

    let (status, body) = send(
        ports,
        actix_test::TestRequest::get().uri(&format!(
            "/api/v1/friends/requests/pending/{}",
            UserId::random()
        )),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{
            "id": friendship_id,
            "name": "bob",
            "senderId": sender.id,
            "profilePicture": null,
            "type": "invite",
            "category": "friend"
        }])
    );
}

#[actix_web::test]
async fn sent_requests_are_marked_pending_sent() {
    let mut ports = TestPorts::default();
    ports.friends.expect_sent_by().return_once(|_| {
        Ok(vec![PendingFriendRequest {
            friendship_id: FriendshipId::random(),
            other: summary("cid"),
        }])
    });

    let (_, body) = send(
        ports,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/friends/requests/sent/{}", UserId::random())),
    )
    .await;
    assert_eq!(body[0]["type"], "pending-sent");
    assert_eq!(body[0]["name"], "cid");
    assert!(body[0].get("category").is_none());
}

#[actix_web::test]
async fn friend_list_names_the_other_party() {
    let mut ports = TestPorts::default();
    ports.friends.expect_friends_of().return_once(|_| {
        Ok(vec![FriendEntry {
            friendship_id: FriendshipId::random(),
            friend: summary("dan"),
            status: FriendshipStatus::Accepted,
        }])
    });

    let (_, body) = send(
        ports,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/friends/list/{}", UserId::random())),
    )
    .await;
    assert_eq!(body[0]["friendName"], "dan");
    assert_eq!(body[0]["status"], "accepted");
}

#[actix_web::test]
async fn unfriends_expose_email() {
    let mut ports = TestPorts::default();
    ports
        .friends
        .expect_strangers_of()
        .return_once(|_| Ok(vec![summary("eve")]));

    let (_, body) = send(
        ports,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/friends/unfriends/{}", UserId::random())),
    )
    .await;
    assert_eq!(body[0]["email"], "eve@example.com");
    assert!(body[0]["userId"].is_string());
}

#[actix_web::test]
async fn delete_requires_a_token() {
    let (status, body) = send(
        TestPorts::default(),
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/friends/{}", FriendshipId::random())),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Access token required");
}

#[actix_web::test]
async fn delete_confirms_with_the_id() {
    let mut ports = TestPorts::default();
    ports.authenticate(UserId::random());
    ports.friends.expect_remove().return_once(|_, _| Ok(()));
    let id = FriendshipId::random();

    let (status, body) = send(
        ports,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/friends/{id}"))
            .insert_header(bearer()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Friend deleted", "id": id}));
}
