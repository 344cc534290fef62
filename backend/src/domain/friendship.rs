//! Friend requests and friendships between two users.
//!
//! A friendship is stored once per unordered pair of users: a request from
//! A to B blocks a later request from B to A until the first is deleted.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::macros::define_text_enum;
use super::validation::FieldError;
use super::{FriendshipId, UserId, UserSummary};

define_text_enum! {
    /// Lifecycle of a friend request.
    pub enum FriendshipStatus ("status") {
        Pending => "pending",
        Accepted => "accepted",
        Refused => "refused",
        Blocked => "blocked",
    }
}

/// Stored friendship row.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Friendship {
    #[schema(value_type = String, format = "uuid")]
    pub id: FriendshipId,
    #[schema(value_type = String, format = "uuid")]
    pub requester_id: UserId,
    #[schema(value_type = String, format = "uuid")]
    pub recipient_id: UserId,
    pub status: FriendshipStatus,
    pub requested_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl Friendship {
    /// True when `user` is either side of the friendship.
    pub fn involves(&self, user: UserId) -> bool {
        self.requester_id == user || self.recipient_id == user
    }

    /// The other party, from `user`'s point of view.
    pub fn counterpart(&self, user: UserId) -> UserId {
        if self.requester_id == user {
            self.recipient_id
        } else {
            self.requester_id
        }
    }
}

/// A new pending request.
#[derive(Debug, Clone, PartialEq)]
pub struct FriendRequest {
    pub id: FriendshipId,
    pub requester_id: UserId,
    pub recipient_id: UserId,
    pub requested_at: DateTime<Utc>,
}

impl FriendRequest {
    /// Build a pending request, rejecting self-friendship.
    pub fn new(
        requester_id: UserId,
        recipient_id: UserId,
        requested_at: DateTime<Utc>,
    ) -> Result<Self, FieldError> {
        if requester_id == recipient_id {
            return Err(FieldError::InvalidFormat {
                field: "friendUserId",
                reason: "must differ from userId",
            });
        }
        Ok(Self {
            id: FriendshipId::random(),
            requester_id,
            recipient_id,
            requested_at,
        })
    }
}

/// Pending request joined with the user on the other side.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingFriendRequest {
    pub friendship_id: FriendshipId,
    pub other: UserSummary,
}

/// Accepted friendship seen from one of its members.
#[derive(Debug, Clone, PartialEq)]
pub struct FriendEntry {
    pub friendship_id: FriendshipId,
    pub friend: UserSummary,
    pub status: FriendshipStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn self_requests_are_rejected() {
        let user = UserId::random();
        let err = FriendRequest::new(user, user, Utc::now()).expect_err("self request");
        assert_eq!(err.field(), "friendUserId");
    }

    #[rstest]
    fn counterpart_is_symmetric() {
        let (a, b) = (UserId::random(), UserId::random());
        let friendship = Friendship {
            id: FriendshipId::random(),
            requester_id: a,
            recipient_id: b,
            status: FriendshipStatus::Accepted,
            requested_at: Utc::now(),
            responded_at: None,
        };
        assert_eq!(friendship.counterpart(a), b);
        assert_eq!(friendship.counterpart(b), a);
        assert!(friendship.involves(a));
        assert!(!friendship.involves(UserId::random()));
    }

    #[rstest]
    #[case("pending", FriendshipStatus::Pending)]
    #[case("refused", FriendshipStatus::Refused)]
    fn statuses_parse(#[case] raw: &str, #[case] expected: FriendshipStatus) {
        assert_eq!(raw.parse::<FriendshipStatus>(), Ok(expected));
    }
}
