//! Port for friendship persistence.
//!
//! Adapters enforce one row per unordered pair of users and report a second
//! request between the same two users, in either direction, as
//! [`FriendshipPersistenceError::Duplicate`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    FriendEntry, FriendRequest, Friendship, FriendshipId, FriendshipStatus, PendingFriendRequest,
    UserId, UserSummary,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by friendship repository adapters.
    pub enum FriendshipPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "friendship repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "friendship repository query failed: {message}",
        /// The pair already has a friendship.
        Duplicate { message: String } => "friendship already exists: {message}",
        /// One of the users does not exist.
        MissingUser { message: String } => "friendship references unknown user: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FriendshipRepository: Send + Sync {
    /// Every friendship row.
    async fn list(&self) -> Result<Vec<Friendship>, FriendshipPersistenceError>;

    /// Fetch a friendship by identifier.
    async fn find(&self, id: FriendshipId)
    -> Result<Option<Friendship>, FriendshipPersistenceError>;

    /// Insert a pending request.
    async fn create(&self, request: &FriendRequest)
    -> Result<Friendship, FriendshipPersistenceError>;

    /// Overwrite the status and response time.
    async fn set_status(
        &self,
        id: FriendshipId,
        status: FriendshipStatus,
        responded_at: DateTime<Utc>,
    ) -> Result<Option<Friendship>, FriendshipPersistenceError>;

    /// Delete a friendship; `false` when it did not exist.
    async fn delete(&self, id: FriendshipId) -> Result<bool, FriendshipPersistenceError>;

    /// Pending requests addressed to `recipient`, with the sender.
    async fn pending_for(
        &self,
        recipient: UserId,
    ) -> Result<Vec<PendingFriendRequest>, FriendshipPersistenceError>;

    /// Pending requests sent by `requester`, with the recipient.
    async fn sent_by(
        &self,
        requester: UserId,
    ) -> Result<Vec<PendingFriendRequest>, FriendshipPersistenceError>;

    /// Accepted friendships of `user` from either side.
    async fn friends_of(&self, user: UserId)
    -> Result<Vec<FriendEntry>, FriendshipPersistenceError>;

    /// Users with no friendship row of any status with `user`, excluding
    /// `user`.
    async fn unrelated_to(
        &self,
        user: UserId,
    ) -> Result<Vec<UserSummary>, FriendshipPersistenceError>;
}
