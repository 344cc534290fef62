//! Friendship service implementing [`FriendNetwork`].

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    FriendNetwork, FriendResponse, FriendshipPersistenceError, FriendshipRepository,
};
use crate::domain::{
    Error, FriendEntry, FriendRequest, Friendship, FriendshipId, FriendshipStatus,
    PendingFriendRequest, Principal, UserId, UserSummary,
};

fn map_friendship_error(error: FriendshipPersistenceError) -> Error {
    match error {
        FriendshipPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("friendship repository unavailable: {message}"))
        }
        FriendshipPersistenceError::Query { message } => {
            Error::internal(format!("friendship repository error: {message}"))
        }
        FriendshipPersistenceError::Duplicate { .. } => {
            Error::conflict("A friendship already exists between these users")
        }
        FriendshipPersistenceError::MissingUser { .. } => Error::not_found("User not found"),
    }
}

fn request_not_found() -> Error {
    Error::not_found("Friend request not found")
}

/// Friendship service backed by a [`FriendshipRepository`].
#[derive(Clone)]
pub struct FriendshipService<R> {
    friendships: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> FriendshipService<R> {
    pub fn new(friendships: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { friendships, clock }
    }
}

impl<R> FriendshipService<R>
where
    R: FriendshipRepository,
{
    async fn existing(&self, id: FriendshipId) -> Result<Friendship, Error> {
        self.friendships
            .find(id)
            .await
            .map_err(map_friendship_error)?
            .ok_or_else(request_not_found)
    }
}

#[async_trait]
impl<R> FriendNetwork for FriendshipService<R>
where
    R: FriendshipRepository,
{
    async fn list_friendships(&self) -> Result<Vec<Friendship>, Error> {
        self.friendships.list().await.map_err(map_friendship_error)
    }

    async fn send_request(
        &self,
        caller: &Principal,
        requester: UserId,
        recipient: UserId,
    ) -> Result<Friendship, Error> {
        if !caller.is(requester) {
            return Err(Error::forbidden(
                "Friend requests can only be sent on your own behalf",
            ));
        }
        let request = FriendRequest::new(requester, recipient, self.clock.utc())?;
        let friendship = self
            .friendships
            .create(&request)
            .await
            .map_err(map_friendship_error)?;
        info!(friendship_id = %friendship.id, "friend request created");
        Ok(friendship)
    }

    async fn respond(
        &self,
        caller: &Principal,
        id: FriendshipId,
        response: FriendResponse,
    ) -> Result<Friendship, Error> {
        let friendship = self.existing(id).await?;
        if !caller.is(friendship.recipient_id) {
            return Err(Error::forbidden(
                "Only the recipient can answer a friend request",
            ));
        }
        let status = match response {
            FriendResponse::Accept => FriendshipStatus::Accepted,
            FriendResponse::Refuse => FriendshipStatus::Refused,
        };
        self.friendships
            .set_status(id, status, self.clock.utc())
            .await
            .map_err(map_friendship_error)?
            .ok_or_else(request_not_found)
    }

    async fn pending_for(&self, user: UserId) -> Result<Vec<PendingFriendRequest>, Error> {
        self.friendships
            .pending_for(user)
            .await
            .map_err(map_friendship_error)
    }

    async fn sent_by(&self, user: UserId) -> Result<Vec<PendingFriendRequest>, Error> {
        self.friendships
            .sent_by(user)
            .await
            .map_err(map_friendship_error)
    }

    async fn strangers_of(&self, user: UserId) -> Result<Vec<UserSummary>, Error> {
        self.friendships
            .unrelated_to(user)
            .await
            .map_err(map_friendship_error)
    }

    async fn friends_of(&self, user: UserId) -> Result<Vec<FriendEntry>, Error> {
        self.friendships
            .friends_of(user)
            .await
            .map_err(map_friendship_error)
    }

    async fn remove(&self, caller: &Principal, id: FriendshipId) -> Result<(), Error> {
        let friendship = self.existing(id).await?;
        if !friendship.involves(caller.user_id) {
            return Err(Error::forbidden(
                "Only a member of the friendship can delete it",
            ));
        }
        if self
            .friendships
            .delete(id)
            .await
            .map_err(map_friendship_error)?
        {
            Ok(())
        } else {
            Err(request_not_found())
        }
    }
}

#[cfg(test)]
#[path = "friendship_service_tests.rs"]
mod tests;
