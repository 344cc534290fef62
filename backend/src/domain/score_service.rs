//! Score service implementing [`ScoreBoard`].
//!
//! One score is kept per (user, journey): a submission replaces it only when
//! strictly better. Aggregations (totals, summaries, leaderboard) are
//! computed by the repository and shaped here.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    ScoreBoard, ScorePersistenceError, ScoreRepository, ScoreRequest, ScoreSummaryEntry,
    ScoreUpdateRequest, SummaryRequest, UserRepository,
};
use crate::domain::user_account_service::map_user_error;
use crate::domain::{
    BestScore, Error, Highlight, JourneyId, JourneyScoreEntry, Leaderboard, LeaderboardEntry,
    Principal, Score, ScoreCategory, ScoreChanges, ScoreFilter, ScoreId, ScoreSubmission,
    ScoreTotals, SummaryFilter, SummaryWindow, UserId, UserScoreEntry, apply_best_score,
    build_leaderboard, rank_rows,
};

/// Username reported for score rows whose user no longer resolves.
const UNKNOWN_USERNAME: &str = "Unknown";

fn map_score_error(error: ScorePersistenceError) -> Error {
    match error {
        ScorePersistenceError::Connection { message } => {
            Error::service_unavailable(format!("score repository unavailable: {message}"))
        }
        ScorePersistenceError::Query { message } => {
            Error::internal(format!("score repository error: {message}"))
        }
        ScorePersistenceError::Duplicate { .. } => {
            Error::conflict("A score already exists for this user and journey")
        }
        ScorePersistenceError::MissingReference { .. } => {
            Error::not_found("User, journey or participation not found")
        }
    }
}

fn score_not_found() -> Error {
    Error::not_found("Score not found")
}

/// Score service backed by score and user repositories.
#[derive(Clone)]
pub struct ScoreService<S, U> {
    scores: Arc<S>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<S, U> ScoreService<S, U> {
    pub fn new(scores: Arc<S>, users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self {
            scores,
            users,
            clock,
        }
    }
}

impl<S, U> ScoreService<S, U>
where
    S: ScoreRepository,
    U: UserRepository,
{
    async fn highlight(
        &self,
        ranked: &[LeaderboardEntry],
        user: Option<UserId>,
    ) -> Result<Highlight, Error> {
        let Some(user_id) = user else {
            return Ok(Highlight::None);
        };
        if let Some(entry) = ranked.iter().find(|entry| entry.user_id == user_id) {
            return Ok(Highlight::Known {
                user_id,
                username: entry.username.clone(),
                profile_picture: entry.profile_picture.clone(),
            });
        }
        let found = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?;
        Ok(found.map_or(Highlight::Unknown, |user| Highlight::Known {
            user_id,
            username: user.username.to_string(),
            profile_picture: user.profile_picture,
        }))
    }
}

#[async_trait]
impl<S, U> ScoreBoard for ScoreService<S, U>
where
    S: ScoreRepository,
    U: UserRepository,
{
    async fn submit(&self, caller: &Principal, request: ScoreRequest) -> Result<BestScore, Error> {
        if request.user_id.is_some_and(|user| !caller.is(user)) {
            return Err(Error::forbidden("Scores can only be submitted for yourself"));
        }
        let submission = ScoreSubmission::try_new(
            caller.user_id,
            request.journey_id,
            request.participation_id,
            request.score,
            request.time_seconds,
            request.distance_meters,
        )?;
        let existing = self
            .scores
            .find_for_pair(submission.user_id, submission.journey_id)
            .await
            .map_err(map_score_error)?;

        match apply_best_score(existing, submission, self.clock.utc()) {
            BestScore::Create(score) => {
                let created = self.scores.insert(&score).await.map_err(map_score_error)?;
                info!(score_id = %created.id, score = created.score, "score created");
                Ok(BestScore::Create(created))
            }
            BestScore::Improve {
                score,
                previous_score,
            } => {
                let improved = self.scores.replace(&score).await.map_err(map_score_error)?;
                info!(
                    score_id = %improved.id,
                    score = improved.score,
                    previous_score,
                    "score improved"
                );
                Ok(BestScore::Improve {
                    score: improved,
                    previous_score,
                })
            }
            kept @ BestScore::Keep(_) => Ok(kept),
        }
    }

    async fn list_scores(&self, filter: ScoreFilter) -> Result<Vec<Score>, Error> {
        self.scores.list(filter).await.map_err(map_score_error)
    }

    async fn get_score(&self, id: ScoreId) -> Result<Score, Error> {
        self.scores
            .find(id)
            .await
            .map_err(map_score_error)?
            .ok_or_else(score_not_found)
    }

    async fn update_score(
        &self,
        id: ScoreId,
        request: ScoreUpdateRequest,
    ) -> Result<Score, Error> {
        let changes = ScoreChanges::try_new(
            request.score,
            request.time_seconds,
            request.distance_meters,
            request.participation_id,
        )?;
        self.scores
            .update(id, &changes, self.clock.utc())
            .await
            .map_err(map_score_error)?
            .ok_or_else(score_not_found)
    }

    async fn delete_score(&self, id: ScoreId) -> Result<(), Error> {
        if self.scores.delete(id).await.map_err(map_score_error)? {
            Ok(())
        } else {
            Err(score_not_found())
        }
    }

    async fn totals(&self, user: Option<UserId>) -> Result<ScoreTotals, Error> {
        self.scores.totals(user).await.map_err(map_score_error)
    }

    async fn summary(&self, request: SummaryRequest) -> Result<Vec<ScoreSummaryEntry>, Error> {
        let category = request
            .category
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(str::parse::<ScoreCategory>)
            .transpose()?;
        let window = SummaryWindow::parse(request.from.as_deref(), request.to.as_deref())?;
        let filter = SummaryFilter {
            user_id: request.user_id,
            journey_id: request.journey_id,
            window,
        };
        let rows = self.scores.summary(filter).await.map_err(map_score_error)?;
        Ok(rows
            .into_iter()
            .map(|row| ScoreSummaryEntry {
                user_id: row.user_id,
                username: row
                    .username
                    .unwrap_or_else(|| UNKNOWN_USERNAME.to_owned()),
                categories: row.totals.categories(category),
            })
            .collect())
    }

    async fn journey_scores(&self, journey: JourneyId) -> Result<Vec<JourneyScoreEntry>, Error> {
        self.scores
            .for_journey(journey)
            .await
            .map_err(map_score_error)
    }

    async fn user_scores(&self, user: UserId) -> Result<Vec<UserScoreEntry>, Error> {
        self.scores.for_user(user).await.map_err(map_score_error)
    }

    async fn leaderboard(
        &self,
        user: Option<UserId>,
        friend: Option<UserId>,
    ) -> Result<Leaderboard, Error> {
        let rows = self
            .scores
            .leaderboard_rows()
            .await
            .map_err(map_score_error)?;
        let ranked = rank_rows(rows);
        let user = self.highlight(&ranked, user).await?;
        let friend = self.highlight(&ranked, friend).await?;
        Ok(build_leaderboard(ranked, user, friend))
    }
}

#[cfg(test)]
#[path = "score_service_tests.rs"]
mod tests;
