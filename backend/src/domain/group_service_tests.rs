//! Tests for the group service.

use std::sync::Arc;

use rstest::rstest;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::MockGroupRepository;
use crate::domain::service_test_support::{fixture_clock, fixture_timestamp, principal};

fn service(repo: MockGroupRepository) -> GroupService<MockGroupRepository> {
    GroupService::new(Arc::new(repo), fixture_clock())
}

fn stored_group(new: &NewGroup) -> Group {
    Group {
        id: new.id,
        name: new.name.clone(),
        description: new.description.clone(),
        owner_id: new.owner_id,
        is_private: new.is_private,
        image: new.image.clone(),
        created_at: new.created_at,
    }
}

fn draft(name: &str) -> GroupDraft {
    GroupDraft {
        name: name.to_owned(),
        ..GroupDraft::default()
    }
}

#[tokio::test]
async fn create_group_defaults_owner_to_caller_and_enrols_admin() {
    let caller = UserId::random();
    let mut repo = MockGroupRepository::new();
    repo.expect_create_group()
        .withf(move |group, owner| {
            let Some(owner) = owner else { return false };
            group.owner_id == Some(caller)
                && group.name == "Hikers"
                && !group.is_private
                && owner.user_id == caller
                && owner.group_id == group.id
                && owner.role == MembershipRole::Admin
        })
        .times(1)
        .return_once(|group, _| Ok(stored_group(group)));

    let group = service(repo)
        .create_group(&principal(caller), draft("  Hikers "))
        .await
        .expect("group created");
    assert_eq!(group.owner_id, Some(caller));
    assert_eq!(group.created_at, fixture_timestamp());
}

#[tokio::test]
async fn create_group_honours_explicit_owner() {
    let owner = UserId::random();
    let mut repo = MockGroupRepository::new();
    repo.expect_create_group()
        .withf(move |group, membership| {
            group.owner_id == Some(owner)
                && membership.as_ref().is_some_and(|m| m.user_id == owner)
        })
        .return_once(|group, _| Ok(stored_group(group)));

    let request = GroupDraft {
        owner_id: Some(owner),
        ..draft("Walkers")
    };
    service(repo)
        .create_group(&principal(UserId::random()), request)
        .await
        .expect("group created");
}

#[tokio::test]
async fn blank_group_name_is_rejected() {
    let error = service(MockGroupRepository::new())
        .create_group(&principal(UserId::random()), draft("   "))
        .await
        .expect_err("blank name");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn duplicate_membership_is_a_conflict() {
    let mut repo = MockGroupRepository::new();
    repo.expect_create_membership()
        .withf(|membership| membership.role == MembershipRole::Pending)
        .return_once(|_| Err(GroupPersistenceError::duplicate("user_id, group_id")));

    let request = MembershipRequest {
        user_id: UserId::random(),
        group_id: GroupId::random(),
        role: None,
    };
    let error = service(repo)
        .create_membership(request)
        .await
        .expect_err("duplicate");
    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn deleting_unknown_group_is_not_found() {
    let mut repo = MockGroupRepository::new();
    repo.expect_delete_group().return_once(|_| Ok(false));

    let error = service(repo)
        .delete_group(GroupId::random())
        .await
        .expect_err("missing");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

fn invite(user: UserId, role: MembershipRole) -> Membership {
    Membership::new(user, GroupId::random(), role, fixture_timestamp())
}

#[tokio::test]
async fn accepting_invite_promotes_to_member() {
    let user = UserId::random();
    let pending = invite(user, MembershipRole::Pending);
    let id = pending.id;
    let mut accepted = pending.clone();
    accepted.role = MembershipRole::Member;
    let mut repo = MockGroupRepository::new();
    repo.expect_find_membership()
        .return_once(move |_| Ok(Some(pending)));
    repo.expect_set_role()
        .withf(|_, role| *role == MembershipRole::Member)
        .times(1)
        .return_once(move |_, _| Ok(Some(accepted)));

    let membership = service(repo)
        .accept_invite(&principal(user), id)
        .await
        .expect("accepted");
    assert_eq!(membership.role, MembershipRole::Member);
}

#[tokio::test]
async fn declining_invite_deletes_membership() {
    let user = UserId::random();
    let pending = invite(user, MembershipRole::Pending);
    let id = pending.id;
    let mut repo = MockGroupRepository::new();
    repo.expect_find_membership()
        .return_once(move |_| Ok(Some(pending)));
    repo.expect_delete_membership()
        .withf(move |membership_id| *membership_id == id)
        .times(1)
        .return_once(|_| Ok(true));

    service(repo)
        .decline_invite(&principal(user), id)
        .await
        .expect("declined");
}

#[rstest]
#[case(MembershipRole::Pending, true, ErrorCode::Forbidden)]
#[case(MembershipRole::Member, false, ErrorCode::Conflict)]
#[tokio::test]
async fn invitations_are_answered_only_by_their_invitee_while_pending(
    #[case] role: MembershipRole,
    #[case] answered_by_stranger: bool,
    #[case] expected: ErrorCode,
) {
    let user = UserId::random();
    let membership = invite(user, role);
    let id = membership.id;
    let mut repo = MockGroupRepository::new();
    repo.expect_find_membership()
        .return_once(move |_| Ok(Some(membership)));

    let caller = if answered_by_stranger {
        UserId::random()
    } else {
        user
    };
    let error = service(repo)
        .accept_invite(&principal(caller), id)
        .await
        .expect_err("rejected");
    assert_eq!(error.code(), expected);
}

#[tokio::test]
async fn removing_non_member_is_not_found() {
    let mut repo = MockGroupRepository::new();
    repo.expect_remove_member().return_once(|_, _| Ok(false));

    let error = service(repo)
        .remove_member(GroupId::random(), UserId::random())
        .await
        .expect_err("not a member");
    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(error.message(), "User is not a member of this group");
}
