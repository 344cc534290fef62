//! PostgreSQL-backed `ScoreRepository` implementation.
//!
//! Besides row access this adapter runs the score aggregations: global or
//! per-user totals, the per-user summary and the leaderboard source rows.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{ScorePersistenceError, ScoreRepository};
use crate::domain::{
    JourneyId, JourneyScoreEntry, LeaderboardRow, ParticipationId, Score, ScoreChanges,
    ScoreFilter, ScoreId, ScoreTotals, SummaryFilter, UserId, UserScoreEntry, UserScoreTotals,
};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error, pool_error_message};
use super::models::{ScoreRow, ScoreUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::{journeys, scores, users};

/// Diesel-backed implementation of the `ScoreRepository` port.
#[derive(Clone)]
pub struct DieselScoreRepository {
    pool: DbPool,
}

impl DieselScoreRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ScorePersistenceError {
    ScorePersistenceError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> ScorePersistenceError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => ScorePersistenceError::connection(message),
        DieselFailure::Query(message) => ScorePersistenceError::query(message),
        DieselFailure::UniqueViolation { .. } => {
            ScorePersistenceError::duplicate("a score already exists for this user and journey")
        }
        failure @ DieselFailure::ForeignKeyViolation { .. } => {
            let target = match failure.constraint() {
                Some(name) if name.contains("participation") => "participation",
                _ => "user or journey",
            };
            ScorePersistenceError::missing_reference(target)
        }
    }
}

fn row_to_score(row: ScoreRow) -> Score {
    Score {
        id: ScoreId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        journey_id: JourneyId::from_uuid(row.journey_id),
        participation_id: row.participation_id.map(ParticipationId::from_uuid),
        score: row.score,
        time_seconds: row.time_seconds,
        distance_meters: row.distance_meters,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

fn score_to_row(score: &Score) -> ScoreRow {
    ScoreRow {
        id: *score.id.as_uuid(),
        user_id: *score.user_id.as_uuid(),
        journey_id: *score.journey_id.as_uuid(),
        participation_id: score.participation_id.map(|id| *id.as_uuid()),
        score: score.score,
        time_seconds: score.time_seconds,
        distance_meters: score.distance_meters,
        created_at: score.created_at,
        updated_at: score.updated_at,
    }
}

fn changes_to_update(changes: &ScoreChanges, now: DateTime<Utc>) -> ScoreUpdate {
    ScoreUpdate {
        score: changes.score,
        time_seconds: changes.time_seconds,
        distance_meters: changes.distance_meters,
        participation_id: changes.participation_id.map(|id| *id.as_uuid()),
        updated_at: now,
    }
}

/// Score, distance and time of one stored row.
type ScoreValues = (i32, f64, i32);

fn add_values(totals: ScoreTotals, (score, distance, time): ScoreValues) -> ScoreTotals {
    ScoreTotals {
        score: totals.score + i64::from(score),
        distance: totals.distance + distance,
        time: totals.time + i64::from(time),
    }
}

fn fold_totals(rows: impl IntoIterator<Item = ScoreValues>) -> ScoreTotals {
    rows.into_iter().fold(ScoreTotals::default(), add_values)
}

/// Sum rows per user, keeping the first-seen order stable for equal keys.
fn fold_per_user(rows: Vec<(Uuid, String, ScoreValues)>) -> Vec<UserScoreTotals> {
    let mut positions: HashMap<Uuid, usize> = HashMap::new();
    let mut summary: Vec<UserScoreTotals> = Vec::new();
    for (user_id, username, values) in rows {
        let index = *positions.entry(user_id).or_insert_with(|| {
            summary.push(UserScoreTotals {
                user_id: UserId::from_uuid(user_id),
                username: Some(username),
                totals: ScoreTotals::default(),
            });
            summary.len() - 1
        });
        if let Some(entry) = summary.get_mut(index) {
            entry.totals = add_values(entry.totals, values);
        }
    }
    summary.sort_by(by_score_then_name);
    summary
}

fn fold_leaderboard(rows: Vec<(Uuid, String, Option<String>, i32)>) -> Vec<LeaderboardRow> {
    let mut positions: HashMap<Uuid, usize> = HashMap::new();
    let mut board: Vec<LeaderboardRow> = Vec::new();
    for (user_id, username, profile_picture, score) in rows {
        let index = *positions.entry(user_id).or_insert_with(|| {
            board.push(LeaderboardRow {
                user_id: UserId::from_uuid(user_id),
                username,
                profile_picture,
                total_score: 0,
            });
            board.len() - 1
        });
        if let Some(entry) = board.get_mut(index) {
            entry.total_score += i64::from(score);
        }
    }
    board
}

/// Highest score first, then alphabetical username.
fn by_score_then_name(a: &UserScoreTotals, b: &UserScoreTotals) -> Ordering {
    b.totals
        .score
        .cmp(&a.totals.score)
        .then_with(|| a.username.cmp(&b.username))
        .then_with(|| a.user_id.cmp(&b.user_id))
}

#[async_trait]
impl ScoreRepository for DieselScoreRepository {
    async fn list(&self, filter: ScoreFilter) -> Result<Vec<Score>, ScorePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = scores::table
            .select(ScoreRow::as_select())
            .order((scores::created_at.desc(), scores::id.asc()))
            .into_boxed();
        if let Some(journey) = filter.journey_id {
            query = query.filter(scores::journey_id.eq(*journey.as_uuid()));
        }
        if let Some(user) = filter.user_id {
            query = query.filter(scores::user_id.eq(*user.as_uuid()));
        }
        let rows = query.load(&mut conn).await.map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(row_to_score).collect())
    }

    async fn find(&self, id: ScoreId) -> Result<Option<Score>, ScorePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = scores::table
            .find(id.as_uuid())
            .select(ScoreRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(row_to_score))
    }

    async fn find_for_pair(
        &self,
        user: UserId,
        journey: JourneyId,
    ) -> Result<Option<Score>, ScorePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = scores::table
            .filter(scores::user_id.eq(user.as_uuid()))
            .filter(scores::journey_id.eq(journey.as_uuid()))
            .select(ScoreRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(row_to_score))
    }

    async fn insert(&self, score: &Score) -> Result<Score, ScorePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let stored = diesel::insert_into(scores::table)
            .values(&score_to_row(score))
            .returning(ScoreRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(row_to_score(stored))
    }

    async fn replace(&self, score: &Score) -> Result<Score, ScorePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let stored = diesel::update(scores::table.find(score.id.as_uuid()))
            .set((
                scores::score.eq(score.score),
                scores::time_seconds.eq(score.time_seconds),
                scores::distance_meters.eq(score.distance_meters),
                scores::participation_id.eq(score.participation_id.map(|id| *id.as_uuid())),
                scores::updated_at.eq(score.updated_at),
            ))
            .returning(ScoreRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(row_to_score(stored))
    }

    async fn update(
        &self,
        id: ScoreId,
        changes: &ScoreChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<Score>, ScorePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::update(scores::table.find(id.as_uuid()))
            .set(&changes_to_update(changes, now))
            .returning(ScoreRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(row_to_score))
    }

    async fn delete(&self, id: ScoreId) -> Result<bool, ScorePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(scores::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn totals(&self, user: Option<UserId>) -> Result<ScoreTotals, ScorePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = scores::table
            .select((
                scores::score,
                scores::distance_meters,
                scores::time_seconds,
            ))
            .into_boxed();
        if let Some(user) = user {
            query = query.filter(scores::user_id.eq(*user.as_uuid()));
        }
        let rows = query
            .load::<ScoreValues>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(fold_totals(rows))
    }

    async fn summary(
        &self,
        filter: SummaryFilter,
    ) -> Result<Vec<UserScoreTotals>, ScorePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = scores::table
            .inner_join(users::table)
            .select((
                users::id,
                users::username,
                scores::score,
                scores::distance_meters,
                scores::time_seconds,
            ))
            .order(scores::created_at.asc())
            .into_boxed();
        if let Some(user) = filter.user_id {
            query = query.filter(scores::user_id.eq(*user.as_uuid()));
        }
        if let Some(journey) = filter.journey_id {
            query = query.filter(scores::journey_id.eq(*journey.as_uuid()));
        }
        if let Some(from) = filter.window.from {
            query = query.filter(scores::created_at.ge(from));
        }
        if let Some(to) = filter.window.to {
            query = query.filter(scores::created_at.le(to));
        }
        let rows = query
            .load::<(Uuid, String, i32, f64, i32)>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(fold_per_user(
            rows.into_iter()
                .map(|(user_id, username, score, distance, time)| {
                    (user_id, username, (score, distance, time))
                })
                .collect(),
        ))
    }

    async fn for_journey(
        &self,
        journey: JourneyId,
    ) -> Result<Vec<JourneyScoreEntry>, ScorePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = scores::table
            .inner_join(users::table)
            .filter(scores::journey_id.eq(journey.as_uuid()))
            .order((scores::score.desc(), scores::created_at.asc()))
            .select((
                scores::id,
                users::id,
                users::username,
                scores::journey_id,
                scores::score,
            ))
            .load::<(Uuid, Uuid, String, Uuid, i32)>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows
            .into_iter()
            .map(|(score_id, user_id, username, journey_id, score)| JourneyScoreEntry {
                score_id: ScoreId::from_uuid(score_id),
                user_id: UserId::from_uuid(user_id),
                username,
                journey_id: JourneyId::from_uuid(journey_id),
                score,
            })
            .collect())
    }

    async fn for_user(&self, user: UserId) -> Result<Vec<UserScoreEntry>, ScorePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = scores::table
            .inner_join(journeys::table)
            .filter(scores::user_id.eq(user.as_uuid()))
            .order((scores::created_at.desc(), scores::id.asc()))
            .select((
                scores::id,
                journeys::id,
                journeys::name,
                scores::score,
                scores::created_at,
            ))
            .load::<(Uuid, Uuid, String, i32, DateTime<Utc>)>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows
            .into_iter()
            .map(
                |(score_id, journey_id, journey_title, score, created_at)| UserScoreEntry {
                    score_id: ScoreId::from_uuid(score_id),
                    journey_id: JourneyId::from_uuid(journey_id),
                    journey_title,
                    score,
                    created_at,
                },
            )
            .collect())
    }

    async fn leaderboard_rows(&self) -> Result<Vec<LeaderboardRow>, ScorePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = scores::table
            .inner_join(users::table)
            .select((
                users::id,
                users::username,
                users::profile_picture,
                scores::score,
            ))
            .load::<(Uuid, String, Option<String>, i32)>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(fold_leaderboard(rows))
    }
}
