//! Port for group and membership persistence.

use async_trait::async_trait;

use crate::domain::{
    Group, GroupChanges, GroupId, GroupInvite, GroupRef, GroupRoster, Membership, MembershipId,
    MembershipRole, NewGroup, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by group repository adapters.
    pub enum GroupPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "group repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "group repository query failed: {message}",
        /// The user already has a membership in the group.
        Duplicate { message: String } => "membership already exists: {message}",
        /// Referenced user or group does not exist.
        MissingReference { message: String } => "group references unknown row: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Every group.
    async fn list_groups(&self) -> Result<Vec<Group>, GroupPersistenceError>;

    /// Fetch a group by identifier.
    async fn find_group(&self, id: GroupId) -> Result<Option<Group>, GroupPersistenceError>;

    /// Insert a group and, atomically, its owner's membership.
    async fn create_group(
        &self,
        group: &NewGroup,
        owner: Option<Membership>,
    ) -> Result<Group, GroupPersistenceError>;

    /// Apply partial changes; `None` when the group does not exist.
    async fn update_group(
        &self,
        id: GroupId,
        changes: &GroupChanges,
    ) -> Result<Option<Group>, GroupPersistenceError>;

    /// Delete a group and its memberships in one transaction.
    async fn delete_group(&self, id: GroupId) -> Result<bool, GroupPersistenceError>;

    /// Groups `user` belongs to with an active role or owns.
    async fn groups_of(&self, user: UserId) -> Result<Vec<GroupRef>, GroupPersistenceError>;

    /// Group name and every membership joined with the member's profile.
    async fn roster(&self, id: GroupId) -> Result<Option<GroupRoster>, GroupPersistenceError>;

    /// Remove `user` from `group`; `false` when not a member.
    async fn remove_member(
        &self,
        group: GroupId,
        user: UserId,
    ) -> Result<bool, GroupPersistenceError>;

    /// Every membership row.
    async fn list_memberships(&self) -> Result<Vec<Membership>, GroupPersistenceError>;

    /// Fetch a membership by identifier.
    async fn find_membership(
        &self,
        id: MembershipId,
    ) -> Result<Option<Membership>, GroupPersistenceError>;

    /// Insert a membership.
    async fn create_membership(
        &self,
        membership: &Membership,
    ) -> Result<Membership, GroupPersistenceError>;

    /// Replace the role of a membership.
    async fn set_role(
        &self,
        id: MembershipId,
        role: MembershipRole,
    ) -> Result<Option<Membership>, GroupPersistenceError>;

    /// Delete a membership; `false` when it did not exist.
    async fn delete_membership(&self, id: MembershipId) -> Result<bool, GroupPersistenceError>;

    /// Pending invitations of `user`, with the group name.
    async fn pending_invites(&self, user: UserId)
    -> Result<Vec<GroupInvite>, GroupPersistenceError>;
}
