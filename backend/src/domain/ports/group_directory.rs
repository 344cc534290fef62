//! Driving port for groups and their memberships.

use async_trait::async_trait;

use crate::domain::{
    Error, Group, GroupDraft, GroupId, GroupInvite, GroupPatch, GroupRef, GroupRoster, Membership,
    MembershipId, MembershipRole, Principal, UserId,
};

/// Raw membership fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MembershipRequest {
    pub user_id: UserId,
    pub group_id: GroupId,
    pub role: Option<MembershipRole>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupDirectory: Send + Sync {
    async fn list_groups(&self) -> Result<Vec<Group>, Error>;

    async fn get_group(&self, id: GroupId) -> Result<Group, Error>;

    /// Create a group owned by `draft.owner_id`, or the caller when unset,
    /// and enrol the owner as admin.
    async fn create_group(&self, caller: &Principal, draft: GroupDraft) -> Result<Group, Error>;

    async fn update_group(&self, id: GroupId, patch: GroupPatch) -> Result<Group, Error>;

    /// Delete a group together with its memberships.
    async fn delete_group(&self, id: GroupId) -> Result<(), Error>;

    /// Groups `user` owns or holds an active role in.
    async fn groups_of(&self, user: UserId) -> Result<Vec<GroupRef>, Error>;

    async fn roster(&self, id: GroupId) -> Result<GroupRoster, Error>;

    async fn remove_member(&self, group: GroupId, user: UserId) -> Result<(), Error>;

    async fn list_memberships(&self) -> Result<Vec<Membership>, Error>;

    async fn get_membership(&self, id: MembershipId) -> Result<Membership, Error>;

    /// Invite or enrol a user; the role defaults to `pending`.
    async fn create_membership(&self, request: MembershipRequest) -> Result<Membership, Error>;

    async fn set_role(&self, id: MembershipId, role: MembershipRole) -> Result<Membership, Error>;

    async fn delete_membership(&self, id: MembershipId) -> Result<(), Error>;

    /// Pending invitations addressed to `user`.
    async fn pending_invites(&self, user: UserId) -> Result<Vec<GroupInvite>, Error>;

    /// Accept an invitation addressed to the caller; the role becomes `member`.
    async fn accept_invite(&self, caller: &Principal, id: MembershipId)
    -> Result<Membership, Error>;

    /// Decline an invitation addressed to the caller; the row is removed.
    async fn decline_invite(&self, caller: &Principal, id: MembershipId) -> Result<(), Error>;
}
