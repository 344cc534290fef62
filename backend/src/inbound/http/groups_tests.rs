//! Tests for the groups handlers.

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use serde_json::json;

use super::*;
use crate::domain::{GroupMember, MembershipId};
use crate::inbound::http::test_utils::{TestPorts, bearer, fixture_timestamp, send};

fn sample_group(owner_id: Option<UserId>) -> Group {
    Group {
        id: GroupId::random(),
        name: "Hikers".to_owned(),
        description: None,
        owner_id,
        is_private: true,
        image: None,
        created_at: fixture_timestamp(),
    }
}

#[actix_web::test]
async fn create_defers_owner_choice_to_the_service() {
    let mut ports = TestPorts::default();
    let caller = UserId::random();
    ports.authenticate(caller);
    ports
        .groups
        .expect_create_group()
        .withf(move |principal, draft| {
            principal.is(caller) && draft.owner_id.is_none() && draft.is_private == Some(true)
        })
        .return_once(move |_, _| Ok(sample_group(Some(caller))));

    let (status, body) = send(
        ports,
        actix_test::TestRequest::post()
            .uri("/api/v1/groups")
            .insert_header(bearer())
            .set_json(json!({"name": "Hikers", "isPrivate": true})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Group created");
    assert_eq!(body["group"]["ownerId"], caller.to_string());
    assert_eq!(body["group"]["isPrivate"], true);
}

#[actix_web::test]
async fn create_rejects_malformed_owner() {
    let mut ports = TestPorts::default();
    ports.authenticate(UserId::random());

    let (status, body) = send(
        ports,
        actix_test::TestRequest::post()
            .uri("/api/v1/groups")
            .insert_header(bearer())
            .set_json(json!({"name": "Hikers", "ownerId": "nobody"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "ownerId");
}

#[actix_web::test]
async fn roster_uses_user_ids_and_roles() {
    let mut ports = TestPorts::default();
    let group = GroupId::random();
    let user_id = UserId::random();
    ports.groups.expect_roster().return_once(move |id| {
        Ok(GroupRoster {
            group_id: id,
            group_name: "Hikers".to_owned(),
            members: vec![GroupMember {
                membership_id: MembershipId::random(),
                user_id,
                username: "ann".to_owned(),
                profile_picture: None,
                role: MembershipRole::Admin,
            }],
        })
    });

    let (status, body) = send(
        ports,
        actix_test::TestRequest::get().uri(&format!("/api/v1/groups/{group}/members")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "groupId": group,
            "groupName": "Hikers",
            "members": [{
                "id": user_id,
                "username": "ann",
                "profilePicture": null,
                "role": "admin"
            }]
        })
    );
}

#[actix_web::test]
async fn groups_of_user_is_not_shadowed_by_member_routes() {
    let mut ports = TestPorts::default();
    let user = UserId::random();
    let group = GroupRef {
        id: GroupId::random(),
        name: "Hikers".to_owned(),
    };
    let expected = group.clone();
    ports
        .groups
        .expect_groups_of()
        .withf(move |id| *id == user)
        .return_once(move |_| Ok(vec![group]));

    let (status, body) = send(
        ports,
        actix_test::TestRequest::get().uri(&format!("/api/v1/groups/user/{user}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{"id": expected.id, "name": "Hikers"}]));
}

#[actix_web::test]
async fn missing_group_is_not_found() {
    let mut ports = TestPorts::default();
    ports
        .groups
        .expect_get_group()
        .return_once(|_| Err(Error::not_found("Group not found")));

    let (status, body) = send(
        ports,
        actix_test::TestRequest::get().uri(&format!("/api/v1/groups/{}", GroupId::random())),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Group not found");
}

#[actix_web::test]
async fn remove_member_parses_both_ids() {
    let mut ports = TestPorts::default();
    ports.authenticate(UserId::random());
    let group = GroupId::random();
    let user = UserId::random();
    ports
        .groups
        .expect_remove_member()
        .withf(move |g, u| *g == group && *u == user)
        .return_once(|_, _| Ok(()));

    let (status, body) = send(
        ports,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/groups/{group}/members/{user}"))
            .insert_header(bearer()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Member removed from group");
}

#[actix_web::test]
async fn update_forwards_partial_fields() {
    let mut ports = TestPorts::default();
    ports.authenticate(UserId::random());
    ports
        .groups
        .expect_update_group()
        .withf(|_, patch| patch.name.as_deref() == Some("Walkers") && patch.image.is_none())
        .return_once(|_, _| Ok(sample_group(None)));

    let (status, _) = send(
        ports,
        actix_test::TestRequest::put()
            .uri(&format!("/api/v1/groups/{}", GroupId::random()))
            .insert_header(bearer())
            .set_json(json!({"name": "Walkers"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}
