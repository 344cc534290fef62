//! Group and membership service implementing [`GroupDirectory`].
//!
//! A user holds at most one membership per group. Invitations are
//! memberships in the `pending` role: accepting turns them into `member`,
//! declining deletes them.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    GroupDirectory, GroupPersistenceError, GroupRepository, MembershipRequest,
};
use crate::domain::{
    Error, Group, GroupChanges, GroupDraft, GroupId, GroupInvite, GroupPatch, GroupRef,
    GroupRoster, Membership, MembershipId, MembershipRole, NewGroup, Principal, UserId,
};

fn map_group_error(error: GroupPersistenceError) -> Error {
    match error {
        GroupPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("group repository unavailable: {message}"))
        }
        GroupPersistenceError::Query { message } => {
            Error::internal(format!("group repository error: {message}"))
        }
        GroupPersistenceError::Duplicate { .. } => {
            Error::conflict("User is already a member of this group")
        }
        GroupPersistenceError::MissingReference { .. } => {
            Error::not_found("User or group not found")
        }
    }
}

fn group_not_found() -> Error {
    Error::not_found("Group not found")
}

fn membership_not_found() -> Error {
    Error::not_found("Membership not found")
}

/// Group service backed by a [`GroupRepository`].
#[derive(Clone)]
pub struct GroupService<R> {
    groups: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> GroupService<R> {
    pub fn new(groups: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { groups, clock }
    }
}

impl<R> GroupService<R>
where
    R: GroupRepository,
{
    /// Load an invitation addressed to `caller` that is still pending.
    async fn pending_invite(
        &self,
        caller: &Principal,
        id: MembershipId,
    ) -> Result<Membership, Error> {
        let membership = self.get_membership(id).await?;
        if !caller.is(membership.user_id) {
            return Err(Error::forbidden(
                "Only the invited user can answer an invitation",
            ));
        }
        if membership.role != MembershipRole::Pending {
            return Err(Error::conflict("Invitation is no longer pending"));
        }
        Ok(membership)
    }
}

#[async_trait]
impl<R> GroupDirectory for GroupService<R>
where
    R: GroupRepository,
{
    async fn list_groups(&self) -> Result<Vec<Group>, Error> {
        self.groups.list_groups().await.map_err(map_group_error)
    }

    async fn get_group(&self, id: GroupId) -> Result<Group, Error> {
        self.groups
            .find_group(id)
            .await
            .map_err(map_group_error)?
            .ok_or_else(group_not_found)
    }

    async fn create_group(&self, caller: &Principal, draft: GroupDraft) -> Result<Group, Error> {
        let now = self.clock.utc();
        let owner_id = draft.owner_id.unwrap_or(caller.user_id);
        let group = NewGroup::try_from_draft(
            GroupDraft {
                owner_id: Some(owner_id),
                ..draft
            },
            now,
        )?;
        let owner = Membership::new(owner_id, group.id, MembershipRole::Admin, now);
        let created = self
            .groups
            .create_group(&group, Some(owner))
            .await
            .map_err(map_group_error)?;
        info!(group_id = %created.id, owner_id = %owner_id, "group created");
        Ok(created)
    }

    async fn update_group(&self, id: GroupId, patch: GroupPatch) -> Result<Group, Error> {
        let changes = GroupChanges::try_from_patch(patch)?;
        self.groups
            .update_group(id, &changes)
            .await
            .map_err(map_group_error)?
            .ok_or_else(group_not_found)
    }

    async fn delete_group(&self, id: GroupId) -> Result<(), Error> {
        if self.groups.delete_group(id).await.map_err(map_group_error)? {
            info!(group_id = %id, "group deleted");
            Ok(())
        } else {
            Err(group_not_found())
        }
    }

    async fn groups_of(&self, user: UserId) -> Result<Vec<GroupRef>, Error> {
        self.groups.groups_of(user).await.map_err(map_group_error)
    }

    async fn roster(&self, id: GroupId) -> Result<GroupRoster, Error> {
        self.groups
            .roster(id)
            .await
            .map_err(map_group_error)?
            .ok_or_else(group_not_found)
    }

    async fn remove_member(&self, group: GroupId, user: UserId) -> Result<(), Error> {
        if self
            .groups
            .remove_member(group, user)
            .await
            .map_err(map_group_error)?
        {
            Ok(())
        } else {
            Err(Error::not_found("User is not a member of this group"))
        }
    }

    async fn list_memberships(&self) -> Result<Vec<Membership>, Error> {
        self.groups.list_memberships().await.map_err(map_group_error)
    }

    async fn get_membership(&self, id: MembershipId) -> Result<Membership, Error> {
        self.groups
            .find_membership(id)
            .await
            .map_err(map_group_error)?
            .ok_or_else(membership_not_found)
    }

    async fn create_membership(&self, request: MembershipRequest) -> Result<Membership, Error> {
        let membership = Membership::new(
            request.user_id,
            request.group_id,
            request.role.unwrap_or(MembershipRole::Pending),
            self.clock.utc(),
        );
        self.groups
            .create_membership(&membership)
            .await
            .map_err(map_group_error)
    }

    async fn set_role(&self, id: MembershipId, role: MembershipRole) -> Result<Membership, Error> {
        self.groups
            .set_role(id, role)
            .await
            .map_err(map_group_error)?
            .ok_or_else(membership_not_found)
    }

    async fn delete_membership(&self, id: MembershipId) -> Result<(), Error> {
        if self
            .groups
            .delete_membership(id)
            .await
            .map_err(map_group_error)?
        {
            Ok(())
        } else {
            Err(membership_not_found())
        }
    }

    async fn pending_invites(&self, user: UserId) -> Result<Vec<GroupInvite>, Error> {
        self.groups
            .pending_invites(user)
            .await
            .map_err(map_group_error)
    }

    async fn accept_invite(
        &self,
        caller: &Principal,
        id: MembershipId,
    ) -> Result<Membership, Error> {
        self.pending_invite(caller, id).await?;
        self.set_role(id, MembershipRole::Member).await
    }

    async fn decline_invite(&self, caller: &Principal, id: MembershipId) -> Result<(), Error> {
        self.pending_invite(caller, id).await?;
        self.delete_membership(id).await
    }
}

#[cfg(test)]
#[path = "group_service_tests.rs"]
mod tests;
