//! PostgreSQL-backed `FriendshipRepository` implementation.
//!
//! The table holds one row per unordered user pair; the unique index on
//! `LEAST/GREATEST` of the two ids turns a reverse request into a unique
//! violation, reported as [`FriendshipPersistenceError::Duplicate`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;
use uuid::Uuid;

use crate::domain::ports::{FriendshipPersistenceError, FriendshipRepository};
use crate::domain::{
    FriendEntry, FriendRequest, Friendship, FriendshipId, FriendshipStatus, PendingFriendRequest,
    UserId, UserSummary,
};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error, pool_error_message};
use super::models::{FriendshipRow, UserSummaryRow};
use super::pool::{DbPool, PoolError};
use super::schema::{friendships, users};

/// Diesel-backed implementation of the `FriendshipRepository` port.
#[derive(Clone)]
pub struct DieselFriendshipRepository {
    pool: DbPool,
}

impl DieselFriendshipRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> FriendshipPersistenceError {
    FriendshipPersistenceError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> FriendshipPersistenceError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => FriendshipPersistenceError::connection(message),
        DieselFailure::Query(message) => FriendshipPersistenceError::query(message),
        DieselFailure::UniqueViolation { .. } => {
            FriendshipPersistenceError::duplicate("a friendship already links these users")
        }
        DieselFailure::ForeignKeyViolation { .. } => {
            FriendshipPersistenceError::missing_user("requester or recipient")
        }
    }
}

fn row_to_friendship(row: FriendshipRow) -> Result<Friendship, FriendshipPersistenceError> {
    let status = row.status.parse::<FriendshipStatus>().map_err(|error| {
        warn!(friendship_id = %row.id, %error, "stored friendship status is unknown");
        FriendshipPersistenceError::query("stored friendship row is invalid")
    })?;
    Ok(Friendship {
        id: FriendshipId::from_uuid(row.id),
        requester_id: UserId::from_uuid(row.requester_id),
        recipient_id: UserId::from_uuid(row.recipient_id),
        status,
        requested_at: row.requested_at,
        responded_at: row.responded_at,
    })
}

fn rows_to_friendships(
    rows: Vec<FriendshipRow>,
) -> Result<Vec<Friendship>, FriendshipPersistenceError> {
    rows.into_iter().map(row_to_friendship).collect()
}

fn pending_entries(rows: Vec<(Uuid, UserSummaryRow)>) -> Vec<PendingFriendRequest> {
    rows.into_iter()
        .map(|(id, other)| PendingFriendRequest {
            friendship_id: FriendshipId::from_uuid(id),
            other: other.into_summary(),
        })
        .collect()
}

/// Pair each accepted friendship of `user` with the profile on the other side.
fn friend_entries(
    user: UserId,
    friendships: Vec<Friendship>,
    profiles: Vec<UserSummary>,
) -> Vec<FriendEntry> {
    friendships
        .into_iter()
        .filter_map(|friendship| {
            let other = friendship.counterpart(user);
            profiles
                .iter()
                .find(|profile| profile.id == other)
                .map(|friend| FriendEntry {
                    friendship_id: friendship.id,
                    friend: friend.clone(),
                    status: friendship.status,
                })
        })
        .collect()
}

#[async_trait]
impl FriendshipRepository for DieselFriendshipRepository {
    async fn list(&self) -> Result<Vec<Friendship>, FriendshipPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = friendships::table
            .order(friendships::requested_at.desc())
            .select(FriendshipRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_friendships(rows)
    }

    async fn find(
        &self,
        id: FriendshipId,
    ) -> Result<Option<Friendship>, FriendshipPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        friendships::table
            .find(id.as_uuid())
            .select(FriendshipRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_friendship)
            .transpose()
    }

    async fn create(
        &self,
        request: &FriendRequest,
    ) -> Result<Friendship, FriendshipPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = FriendshipRow {
            id: *request.id.as_uuid(),
            requester_id: *request.requester_id.as_uuid(),
            recipient_id: *request.recipient_id.as_uuid(),
            status: FriendshipStatus::Pending.as_str().to_owned(),
            requested_at: request.requested_at,
            responded_at: None,
        };
        let stored = diesel::insert_into(friendships::table)
            .values(&row)
            .returning(FriendshipRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_friendship(stored)
    }

    async fn set_status(
        &self,
        id: FriendshipId,
        status: FriendshipStatus,
        responded_at: DateTime<Utc>,
    ) -> Result<Option<Friendship>, FriendshipPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(friendships::table.find(id.as_uuid()))
            .set((
                friendships::status.eq(status.as_str()),
                friendships::responded_at.eq(Some(responded_at)),
            ))
            .returning(FriendshipRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_friendship)
            .transpose()
    }

    async fn delete(&self, id: FriendshipId) -> Result<bool, FriendshipPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(friendships::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn pending_for(
        &self,
        recipient: UserId,
    ) -> Result<Vec<PendingFriendRequest>, FriendshipPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = friendships::table
            .inner_join(users::table.on(users::id.eq(friendships::requester_id)))
            .filter(friendships::recipient_id.eq(recipient.as_uuid()))
            .filter(friendships::status.eq(FriendshipStatus::Pending.as_str()))
            .order(friendships::requested_at.desc())
            .select((friendships::id, UserSummaryRow::as_select()))
            .load::<(Uuid, UserSummaryRow)>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(pending_entries(rows))
    }

    async fn sent_by(
        &self,
        requester: UserId,
    ) -> Result<Vec<PendingFriendRequest>, FriendshipPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = friendships::table
            .inner_join(users::table.on(users::id.eq(friendships::recipient_id)))
            .filter(friendships::requester_id.eq(requester.as_uuid()))
            .filter(friendships::status.eq(FriendshipStatus::Pending.as_str()))
            .order(friendships::requested_at.desc())
            .select((friendships::id, UserSummaryRow::as_select()))
            .load::<(Uuid, UserSummaryRow)>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(pending_entries(rows))
    }

    async fn friends_of(
        &self,
        user: UserId,
    ) -> Result<Vec<FriendEntry>, FriendshipPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = friendships::table
            .filter(
                friendships::requester_id
                    .eq(user.as_uuid())
                    .or(friendships::recipient_id.eq(user.as_uuid())),
            )
            .filter(friendships::status.eq(FriendshipStatus::Accepted.as_str()))
            .order(friendships::responded_at.desc())
            .select(FriendshipRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let accepted = rows_to_friendships(rows)?;

        let others: Vec<Uuid> = accepted
            .iter()
            .map(|friendship| *friendship.counterpart(user).as_uuid())
            .collect();
        let profiles = users::table
            .filter(users::id.eq_any(others))
            .select(UserSummaryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(UserSummaryRow::into_summary)
            .collect();
        Ok(friend_entries(user, accepted, profiles))
    }

    async fn unrelated_to(
        &self,
        user: UserId,
    ) -> Result<Vec<UserSummary>, FriendshipPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let asked_by_user = friendships::table
            .filter(friendships::requester_id.eq(*user.as_uuid()))
            .select(friendships::recipient_id);
        let asked_user = friendships::table
            .filter(friendships::recipient_id.eq(*user.as_uuid()))
            .select(friendships::requester_id);
        let rows = users::table
            .filter(users::id.ne(user.as_uuid()))
            .filter(diesel::dsl::not(users::id.eq_any(asked_by_user)))
            .filter(diesel::dsl::not(users::id.eq_any(asked_user)))
            .order(users::username.asc())
            .select(UserSummaryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(UserSummaryRow::into_summary).collect())
    }
}
