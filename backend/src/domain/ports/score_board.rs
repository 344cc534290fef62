//! Driving port for scores, summaries and the leaderboard.

use async_trait::async_trait;

use crate::domain::{
    BestScore, Error, JourneyId, JourneyScoreEntry, Leaderboard, ParticipationId, Principal,
    Score, ScoreCategories, ScoreFilter, ScoreId, ScoreTotals, UserId, UserScoreEntry,
};

/// Raw score submission. `user_id`, when present, must be the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRequest {
    pub journey_id: JourneyId,
    pub score: Option<i64>,
    pub time_seconds: Option<i64>,
    pub distance_meters: Option<f64>,
    pub participation_id: Option<ParticipationId>,
    pub user_id: Option<UserId>,
}

/// Raw score overwrite. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreUpdateRequest {
    pub score: Option<i64>,
    pub time_seconds: Option<i64>,
    pub distance_meters: Option<f64>,
    pub participation_id: Option<ParticipationId>,
}

/// Raw summary query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryRequest {
    pub user_id: Option<UserId>,
    pub journey_id: Option<JourneyId>,
    pub category: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// One user's line in a score summary.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreSummaryEntry {
    pub user_id: UserId,
    pub username: String,
    pub categories: ScoreCategories,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScoreBoard: Send + Sync {
    /// Submit a score for the caller; only a strictly better one replaces
    /// the stored best.
    async fn submit(&self, caller: &Principal, request: ScoreRequest) -> Result<BestScore, Error>;

    async fn list_scores(&self, filter: ScoreFilter) -> Result<Vec<Score>, Error>;

    async fn get_score(&self, id: ScoreId) -> Result<Score, Error>;

    async fn update_score(&self, id: ScoreId, request: ScoreUpdateRequest)
    -> Result<Score, Error>;

    async fn delete_score(&self, id: ScoreId) -> Result<(), Error>;

    /// Sums over every score, or one user's.
    async fn totals(&self, user: Option<UserId>) -> Result<ScoreTotals, Error>;

    /// Per-user sums within the requested filters.
    async fn summary(&self, request: SummaryRequest) -> Result<Vec<ScoreSummaryEntry>, Error>;

    /// Scores of a journey, best first.
    async fn journey_scores(&self, journey: JourneyId) -> Result<Vec<JourneyScoreEntry>, Error>;

    /// Scores of a user, newest first.
    async fn user_scores(&self, user: UserId) -> Result<Vec<UserScoreEntry>, Error>;

    /// Global ranking with optional highlighted users.
    async fn leaderboard(
        &self,
        user: Option<UserId>,
        friend: Option<UserId>,
    ) -> Result<Leaderboard, Error>;
}
