//! Scores API handlers.
//!
//! ```text
//! GET    /api/v1/scores?journeyId=…&userId=…
//! POST   /api/v1/scores {"journeyId":"…","score":80,"time":600,"distance":1200.5}
//! GET    /api/v1/scores/summary?userId&journeyId&category&from&to
//! GET    /api/v1/scores/totals?userId=…
//! GET    /api/v1/scores/journey/{journeyId}
//! GET    /api/v1/scores/user/{userId}
//! GET    /api/v1/scores/leaderboard/global?userId=…&friendId=…
//! GET    /api/v1/scores/{id}
//! PUT    /api/v1/scores/{id}
//! DELETE /api/v1/scores/{id}
//! ```
//!
//! Submissions keep only the best score per user and journey: a lower or
//! equal resubmission answers `200` with the retained row.

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{ScoreRequest, ScoreSummaryEntry, ScoreUpdateRequest, SummaryRequest};
use crate::domain::{
    BestScore, Error, JourneyId, JourneyScoreEntry, Leaderboard, Score, ScoreCategories,
    ScoreFilter, ScoreId, ScoreTotals, UserId, UserScoreEntry,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{AuthenticatedUser, OptionalUser};
use crate::inbound::http::schemas::DeletedBody;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id, parse_optional_id};

/// Score submission body; `userId` may only name the caller.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SubmitScoreBody {
    #[schema(format = "uuid")]
    pub journey_id: String,
    pub score: Option<i64>,
    /// Seconds taken.
    pub time: Option<i64>,
    /// Metres walked.
    pub distance: Option<f64>,
    #[schema(format = "uuid")]
    pub participation_id: Option<String>,
    #[schema(format = "uuid")]
    pub user_id: Option<String>,
}

/// Score overwrite body; absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateScoreBody {
    pub score: Option<i64>,
    pub time: Option<i64>,
    pub distance: Option<f64>,
    #[schema(format = "uuid")]
    pub participation_id: Option<String>,
}

/// Outcome of a submission.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSubmittedBody {
    pub message: String,
    pub score: Score,
    pub improved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_score: Option<i32>,
}

impl ScoreSubmittedBody {
    fn from_outcome(outcome: BestScore) -> (bool, Self) {
        match outcome {
            BestScore::Create(score) => (
                true,
                Self {
                    message: "Score created".to_owned(),
                    score,
                    improved: false,
                    previous_score: None,
                },
            ),
            BestScore::Improve {
                score,
                previous_score,
            } => (
                false,
                Self {
                    message: "Score improved".to_owned(),
                    score,
                    improved: true,
                    previous_score: Some(previous_score),
                },
            ),
            BestScore::Keep(score) => (
                false,
                Self {
                    message: "Existing score kept".to_owned(),
                    score,
                    improved: false,
                    previous_score: None,
                },
            ),
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScoreQuery {
    pub journey_id: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummaryQuery {
    pub user_id: Option<String>,
    pub journey_id: Option<String>,
    /// One of `score`, `distance`, `time`.
    pub category: Option<String>,
    /// Date (`YYYY-MM-DD`) or RFC 3339 instant.
    pub from: Option<String>,
    /// Date (`YYYY-MM-DD`, whole day included) or RFC 3339 instant.
    pub to: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SummaryUser {
    #[schema(format = "uuid")]
    pub id: String,
    pub username: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SummaryLine {
    pub user: SummaryUser,
    pub categories: ScoreCategories,
}

impl From<ScoreSummaryEntry> for SummaryLine {
    fn from(entry: ScoreSummaryEntry) -> Self {
        Self {
            user: SummaryUser {
                id: entry.user_id.to_string(),
                username: entry.username,
            },
            categories: entry.categories,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SummaryBody {
    pub message: String,
    pub summary: Vec<SummaryLine>,
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TotalsQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TotalsBody {
    pub totals: ScoreTotals,
}

/// Score of one player on a journey.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JourneyScoreLine {
    #[schema(format = "uuid")]
    pub score_id: String,
    #[schema(format = "uuid")]
    pub user_id: String,
    pub username: String,
    #[schema(format = "uuid")]
    pub journey_id: String,
    pub score: i32,
}

impl From<JourneyScoreEntry> for JourneyScoreLine {
    fn from(entry: JourneyScoreEntry) -> Self {
        Self {
            score_id: entry.score_id.to_string(),
            user_id: entry.user_id.to_string(),
            username: entry.username,
            journey_id: entry.journey_id.to_string(),
            score: entry.score,
        }
    }
}

/// Score of a player on one journey.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserScoreLine {
    #[schema(format = "uuid")]
    pub score_id: String,
    #[schema(format = "uuid")]
    pub journey_id: String,
    pub journey_title: String,
    pub score: i32,
    pub created_at: DateTime<Utc>,
}

impl From<UserScoreEntry> for UserScoreLine {
    fn from(entry: UserScoreEntry) -> Self {
        Self {
            score_id: entry.score_id.to_string(),
            journey_id: entry.journey_id.to_string(),
            journey_title: entry.journey_title,
            score: entry.score,
            created_at: entry.created_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardQuery {
    /// Defaults to the caller.
    pub user_id: Option<String>,
    pub friend_id: Option<String>,
}

fn score_id(raw: &str) -> Result<ScoreId, Error> {
    parse_id(raw, FieldName::new("id"))
}

fn optional_user(raw: Option<&str>) -> Result<Option<UserId>, Error> {
    parse_optional_id(raw, FieldName::new("userId"))
}

fn optional_journey(raw: Option<&str>) -> Result<Option<JourneyId>, Error> {
    parse_optional_id(raw, FieldName::new("journeyId"))
}

#[utoipa::path(
    get,
    path = "/api/v1/scores",
    params(
        ("journeyId" = Option<String>, Query, description = "Only scores of this journey"),
        ("userId" = Option<String>, Query, description = "Only scores of this user")
    ),
    responses(
        (status = 200, description = "Scores", body = [Score]),
        (status = 400, description = "Malformed filter", body = Error)
    ),
    tags = ["scores"],
    operation_id = "listScores"
)]
#[get("/scores")]
pub async fn list_scores(
    state: web::Data<HttpState>,
    _viewer: OptionalUser,
    query: web::Query<ScoreQuery>,
) -> ApiResult<web::Json<Vec<Score>>> {
    let filter = ScoreFilter {
        journey_id: optional_journey(query.journey_id.as_deref())?,
        user_id: optional_user(query.user_id.as_deref())?,
    };
    Ok(web::Json(state.scores.list_scores(filter).await?))
}

/// Submit a score for the caller; only a strictly better one is kept.
#[utoipa::path(
    post,
    path = "/api/v1/scores",
    request_body = SubmitScoreBody,
    responses(
        (status = 201, description = "First score for this journey", body = ScoreSubmittedBody),
        (status = 200, description = "Score improved or existing score kept", body = ScoreSubmittedBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "userId is not the caller", body = Error),
        (status = 404, description = "Unknown journey", body = Error)
    ),
    tags = ["scores"],
    operation_id = "submitScore",
    security(("BearerToken" = []))
)]
#[post("/scores")]
pub async fn submit_score(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<SubmitScoreBody>,
) -> ApiResult<HttpResponse> {
    let SubmitScoreBody {
        journey_id,
        score,
        time,
        distance,
        participation_id,
        user_id,
    } = payload.into_inner();
    let request = ScoreRequest {
        journey_id: parse_id(&journey_id, FieldName::new("journeyId"))?,
        score,
        time_seconds: time,
        distance_meters: distance,
        participation_id: parse_optional_id(
            participation_id.as_deref(),
            FieldName::new("participationId"),
        )?,
        user_id: optional_user(user_id.as_deref())?,
    };
    let outcome = state.scores.submit(caller.principal(), request).await?;
    let (created, body) = ScoreSubmittedBody::from_outcome(outcome);
    let mut response = if created {
        HttpResponse::Created()
    } else {
        HttpResponse::Ok()
    };
    Ok(response.json(body))
}

/// Per-user sums within optional filters.
#[utoipa::path(
    get,
    path = "/api/v1/scores/summary",
    params(
        ("userId" = Option<String>, Query),
        ("journeyId" = Option<String>, Query),
        ("category" = Option<String>, Query, description = "score, distance or time"),
        ("from" = Option<String>, Query, description = "Inclusive lower bound"),
        ("to" = Option<String>, Query, description = "Inclusive upper bound; dates cover the whole day")
    ),
    responses(
        (status = 200, description = "Summary", body = SummaryBody),
        (status = 400, description = "Unknown category or malformed bound", body = Error)
    ),
    tags = ["scores"],
    operation_id = "scoreSummary"
)]
#[get("/scores/summary")]
pub async fn score_summary(
    state: web::Data<HttpState>,
    _viewer: OptionalUser,
    query: web::Query<SummaryQuery>,
) -> ApiResult<web::Json<SummaryBody>> {
    let SummaryQuery {
        user_id,
        journey_id,
        category,
        from,
        to,
    } = query.into_inner();
    let request = SummaryRequest {
        user_id: optional_user(user_id.as_deref())?,
        journey_id: optional_journey(journey_id.as_deref())?,
        category,
        from,
        to,
    };
    let summary = state.scores.summary(request).await?;
    Ok(web::Json(SummaryBody {
        message: "Score summary generated".to_owned(),
        summary: summary.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/scores/totals",
    params(("userId" = Option<String>, Query, description = "Only this user's scores")),
    responses((status = 200, description = "Totals", body = TotalsBody)),
    tags = ["scores"],
    operation_id = "scoreTotals"
)]
#[get("/scores/totals")]
pub async fn score_totals(
    state: web::Data<HttpState>,
    _viewer: OptionalUser,
    query: web::Query<TotalsQuery>,
) -> ApiResult<web::Json<TotalsBody>> {
    let user = optional_user(query.user_id.as_deref())?;
    let totals = state.scores.totals(user).await?;
    Ok(web::Json(TotalsBody { totals }))
}

/// Global ranking with the podium and optional highlighted players.
#[utoipa::path(
    get,
    path = "/api/v1/scores/leaderboard/global",
    params(
        ("userId" = Option<String>, Query, description = "Defaults to the caller"),
        ("friendId" = Option<String>, Query)
    ),
    responses((status = 200, description = "Leaderboard", body = Leaderboard)),
    tags = ["scores"],
    operation_id = "globalLeaderboard"
)]
#[get("/scores/leaderboard/global")]
pub async fn global_leaderboard(
    state: web::Data<HttpState>,
    viewer: OptionalUser,
    query: web::Query<LeaderboardQuery>,
) -> ApiResult<web::Json<Leaderboard>> {
    let user = optional_user(query.user_id.as_deref())?
        .or_else(|| viewer.principal().map(|principal| principal.user_id));
    let friend = parse_optional_id(query.friend_id.as_deref(), FieldName::new("friendId"))?;
    Ok(web::Json(state.scores.leaderboard(user, friend).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/scores/journey/{journeyId}",
    params(("journeyId" = String, Path, format = "uuid")),
    responses((status = 200, description = "Scores, best first", body = [JourneyScoreLine])),
    tags = ["scores"],
    operation_id = "journeyScores"
)]
#[get("/scores/journey/{journey_id}")]
pub async fn journey_scores(
    state: web::Data<HttpState>,
    _viewer: OptionalUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<JourneyScoreLine>>> {
    let journey: JourneyId = parse_id(&path, FieldName::new("journeyId"))?;
    let entries = state.scores.journey_scores(journey).await?;
    Ok(web::Json(entries.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/scores/user/{userId}",
    params(("userId" = String, Path, format = "uuid")),
    responses((status = 200, description = "Scores, newest first", body = [UserScoreLine])),
    tags = ["scores"],
    operation_id = "userScores"
)]
#[get("/scores/user/{user_id}")]
pub async fn user_scores(
    state: web::Data<HttpState>,
    _viewer: OptionalUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<UserScoreLine>>> {
    let user: UserId = parse_id(&path, FieldName::new("userId"))?;
    let entries = state.scores.user_scores(user).await?;
    Ok(web::Json(entries.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/scores/{id}",
    params(("id" = String, Path, format = "uuid")),
    responses(
        (status = 200, description = "Score", body = Score),
        (status = 404, description = "Unknown score", body = Error)
    ),
    tags = ["scores"],
    operation_id = "getScore"
)]
#[get("/scores/{id}")]
pub async fn get_score(
    state: web::Data<HttpState>,
    _viewer: OptionalUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<Score>> {
    let id = score_id(&path)?;
    Ok(web::Json(state.scores.get_score(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/scores/{id}",
    params(("id" = String, Path, format = "uuid")),
    request_body = UpdateScoreBody,
    responses(
        (status = 200, description = "Updated score", body = Score),
        (status = 404, description = "Unknown score", body = Error)
    ),
    tags = ["scores"],
    operation_id = "updateScore",
    security(("BearerToken" = []))
)]
#[put("/scores/{id}")]
pub async fn update_score(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<UpdateScoreBody>,
) -> ApiResult<web::Json<Score>> {
    let id = score_id(&path)?;
    let UpdateScoreBody {
        score,
        time,
        distance,
        participation_id,
    } = payload.into_inner();
    let request = ScoreUpdateRequest {
        score,
        time_seconds: time,
        distance_meters: distance,
        participation_id: parse_optional_id(
            participation_id.as_deref(),
            FieldName::new("participationId"),
        )?,
    };
    Ok(web::Json(state.scores.update_score(id, request).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/scores/{id}",
    params(("id" = String, Path, format = "uuid")),
    responses(
        (status = 200, description = "Score deleted", body = DeletedBody),
        (status = 404, description = "Unknown score", body = Error)
    ),
    tags = ["scores"],
    operation_id = "deleteScore",
    security(("BearerToken" = []))
)]
#[delete("/scores/{id}")]
pub async fn delete_score(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<DeletedBody>> {
    let id = score_id(&path)?;
    state.scores.delete_score(id).await?;
    Ok(web::Json(DeletedBody::new("Score deleted", id)))
}

#[cfg(test)]
#[path = "scores_tests.rs"]
mod tests;
