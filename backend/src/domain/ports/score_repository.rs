//! Port for score persistence and aggregation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    JourneyId, JourneyScoreEntry, LeaderboardRow, Score, ScoreChanges, ScoreFilter, ScoreId,
    ScoreTotals, SummaryFilter, UserId, UserScoreEntry, UserScoreTotals,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by score repository adapters.
    pub enum ScorePersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "score repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "score repository query failed: {message}",
        /// A score already exists for the (user, journey) pair.
        Duplicate { message: String } => "score already exists: {message}",
        /// Referenced user, journey or participation does not exist.
        MissingReference { message: String } => "score references unknown row: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScoreRepository: Send + Sync {
    /// Scores matching the filter, newest first.
    async fn list(&self, filter: ScoreFilter) -> Result<Vec<Score>, ScorePersistenceError>;

    /// Fetch a score by identifier.
    async fn find(&self, id: ScoreId) -> Result<Option<Score>, ScorePersistenceError>;

    /// Stored score of a (user, journey) pair.
    async fn find_for_pair(
        &self,
        user: UserId,
        journey: JourneyId,
    ) -> Result<Option<Score>, ScorePersistenceError>;

    /// Insert a new score.
    async fn insert(&self, score: &Score) -> Result<Score, ScorePersistenceError>;

    /// Overwrite an existing row with `score`.
    async fn replace(&self, score: &Score) -> Result<Score, ScorePersistenceError>;

    /// Apply partial changes; `None` when the score does not exist.
    async fn update(
        &self,
        id: ScoreId,
        changes: &ScoreChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<Score>, ScorePersistenceError>;

    /// Delete a score; `false` when it did not exist.
    async fn delete(&self, id: ScoreId) -> Result<bool, ScorePersistenceError>;

    /// Sums over every score, or one user's.
    async fn totals(&self, user: Option<UserId>) -> Result<ScoreTotals, ScorePersistenceError>;

    /// Per-user sums matching the filter.
    async fn summary(
        &self,
        filter: SummaryFilter,
    ) -> Result<Vec<UserScoreTotals>, ScorePersistenceError>;

    /// Scores of a journey, best first.
    async fn for_journey(
        &self,
        journey: JourneyId,
    ) -> Result<Vec<JourneyScoreEntry>, ScorePersistenceError>;

    /// Scores of a user, newest first.
    async fn for_user(&self, user: UserId) -> Result<Vec<UserScoreEntry>, ScorePersistenceError>;

    /// Per-user total score of every user with at least one score.
    async fn leaderboard_rows(&self) -> Result<Vec<LeaderboardRow>, ScorePersistenceError>;
}
