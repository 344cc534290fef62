//! PostgreSQL-backed `RatingRepository` implementation.
//!
//! A user holds at most one rating per journey; resubmitting overwrites the
//! value and comment in place through `ON CONFLICT DO UPDATE`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{RatingPersistenceError, RatingRepository};
use crate::domain::{
    JourneyId, Rating, RatingEntry, RatingFilter, RatingId, RatingSubmission, RatingValue, UserId,
};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error, pool_error_message};
use super::models::{NewRatingRow, RatingRow};
use super::pool::{DbPool, PoolError};
use super::schema::{ratings, users};

/// Diesel-backed implementation of the `RatingRepository` port.
#[derive(Clone)]
pub struct DieselRatingRepository {
    pool: DbPool,
}

impl DieselRatingRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> RatingPersistenceError {
    RatingPersistenceError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> RatingPersistenceError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => RatingPersistenceError::connection(message),
        DieselFailure::Query(message) => RatingPersistenceError::query(message),
        DieselFailure::ForeignKeyViolation { .. } => {
            RatingPersistenceError::missing_reference("user or journey")
        }
        DieselFailure::UniqueViolation { .. } => {
            RatingPersistenceError::query("unique constraint violation")
        }
    }
}

fn row_to_rating(row: RatingRow) -> Result<Rating, RatingPersistenceError> {
    let value = RatingValue::new(i64::from(row.value)).map_err(|error| {
        warn!(rating_id = %row.id, %error, "stored rating value out of range");
        RatingPersistenceError::query("stored rating row is invalid")
    })?;
    Ok(Rating {
        id: RatingId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        journey_id: JourneyId::from_uuid(row.journey_id),
        value,
        comment: row.comment,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

/// Sum and count of rating values.
fn sum_values(values: &[i16]) -> (i64, i64) {
    let total = values.iter().copied().map(i64::from).sum();
    let rated = i64::try_from(values.len()).unwrap_or(i64::MAX);
    (total, rated)
}

#[async_trait]
impl RatingRepository for DieselRatingRepository {
    async fn upsert(&self, submission: &RatingSubmission) -> Result<Rating, RatingPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewRatingRow {
            id: *submission.id.as_uuid(),
            user_id: *submission.user_id.as_uuid(),
            journey_id: *submission.journey_id.as_uuid(),
            value: submission.value.get(),
            comment: submission.comment.as_deref(),
            created_at: submission.submitted_at,
            updated_at: submission.submitted_at,
        };
        let stored = diesel::insert_into(ratings::table)
            .values(&row)
            .on_conflict((ratings::user_id, ratings::journey_id))
            .do_update()
            .set((
                ratings::value.eq(excluded(ratings::value)),
                ratings::comment.eq(excluded(ratings::comment)),
                ratings::updated_at.eq(excluded(ratings::updated_at)),
            ))
            .returning(RatingRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_rating(stored)
    }

    async fn list(&self, filter: RatingFilter) -> Result<Vec<RatingEntry>, RatingPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = ratings::table
            .left_join(users::table)
            .select((RatingRow::as_select(), users::username.nullable()))
            .order((ratings::updated_at.desc(), ratings::id.asc()))
            .into_boxed();
        if let Some(journey) = filter.journey_id {
            query = query.filter(ratings::journey_id.eq(*journey.as_uuid()));
        }
        if let Some(user) = filter.user_id {
            query = query.filter(ratings::user_id.eq(*user.as_uuid()));
        }
        let rows = query
            .load::<(RatingRow, Option<String>)>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter()
            .map(|(row, username)| {
                Ok(RatingEntry {
                    rating: row_to_rating(row)?,
                    username,
                })
            })
            .collect()
    }

    async fn totals(&self, journey: JourneyId) -> Result<(i64, i64), RatingPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let values: Vec<i16> = ratings::table
            .filter(ratings::journey_id.eq(journey.as_uuid()))
            .select(ratings::value)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(sum_values(&values))
    }
}
