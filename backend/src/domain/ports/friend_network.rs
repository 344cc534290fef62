//! Driving port for friendships.

use async_trait::async_trait;

use crate::domain::{
    Error, FriendEntry, Friendship, FriendshipId, PendingFriendRequest, Principal, UserId,
    UserSummary,
};

/// Answer given by the recipient of a friend request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FriendResponse {
    Accept,
    Refuse,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FriendNetwork: Send + Sync {
    /// Every friendship row.
    async fn list_friendships(&self) -> Result<Vec<Friendship>, Error>;

    /// Send a request from `requester` to `recipient` on the caller's behalf.
    async fn send_request(
        &self,
        caller: &Principal,
        requester: UserId,
        recipient: UserId,
    ) -> Result<Friendship, Error>;

    /// Accept or refuse a request addressed to the caller.
    async fn respond(
        &self,
        caller: &Principal,
        id: FriendshipId,
        response: FriendResponse,
    ) -> Result<Friendship, Error>;

    /// Pending requests addressed to `user`.
    async fn pending_for(&self, user: UserId) -> Result<Vec<PendingFriendRequest>, Error>;

    /// Pending requests sent by `user`.
    async fn sent_by(&self, user: UserId) -> Result<Vec<PendingFriendRequest>, Error>;

    /// Users sharing no friendship with `user`, in either direction.
    async fn strangers_of(&self, user: UserId) -> Result<Vec<UserSummary>, Error>;

    /// Accepted friends of `user`.
    async fn friends_of(&self, user: UserId) -> Result<Vec<FriendEntry>, Error>;

    /// Remove a friendship the caller is part of.
    async fn remove(&self, caller: &Principal, id: FriendshipId) -> Result<(), Error>;
}
