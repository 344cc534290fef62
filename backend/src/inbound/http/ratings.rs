//! Ratings API handlers.
//!
//! ```text
//! POST /api/v1/ratings {"journeyId":"…","value":4,"comment":"Lovely"}
//! GET  /api/v1/ratings?journeyId=…&userId=…
//! GET  /api/v1/ratings/average/{journeyId}
//! ```

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::RatingRequest;
use crate::domain::{Error, JourneyId, Rating, RatingAverage, RatingEntry, RatingFilter};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{AuthenticatedUser, OptionalUser};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id, parse_optional_id};

/// Rating body; `userId` may only name the caller.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RateJourneyBody {
    #[schema(format = "uuid")]
    pub journey_id: String,
    #[schema(minimum = 1, maximum = 5)]
    pub value: i64,
    pub comment: Option<String>,
    #[schema(format = "uuid")]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RatingSavedBody {
    pub message: String,
    pub rating: Rating,
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingQuery {
    pub journey_id: Option<String>,
    pub user_id: Option<String>,
}

/// Rating joined with its author's name.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingListEntry {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub user_id: String,
    /// `null` once the author is gone.
    pub username: Option<String>,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<RatingEntry> for RatingListEntry {
    fn from(entry: RatingEntry) -> Self {
        let RatingEntry { rating, username } = entry;
        Self {
            id: rating.id.to_string(),
            user_id: rating.user_id.to_string(),
            username,
            rating: rating.value.get(),
            comment: rating.comment,
            created_at: rating.created_at,
        }
    }
}

/// Rate a journey for the caller, replacing any earlier rating.
#[utoipa::path(
    post,
    path = "/api/v1/ratings",
    request_body = RateJourneyBody,
    responses(
        (status = 201, description = "Rating saved", body = RatingSavedBody),
        (status = 400, description = "Value out of range", body = Error),
        (status = 403, description = "userId is not the caller", body = Error),
        (status = 404, description = "Unknown journey", body = Error)
    ),
    tags = ["ratings"],
    operation_id = "rateJourney",
    security(("BearerToken" = []))
)]
#[post("/ratings")]
pub async fn rate_journey(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<RateJourneyBody>,
) -> ApiResult<HttpResponse> {
    let RateJourneyBody {
        journey_id,
        value,
        comment,
        user_id,
    } = payload.into_inner();
    let request = RatingRequest {
        journey_id: parse_id(&journey_id, FieldName::new("journeyId"))?,
        value,
        comment,
        user_id: parse_optional_id(user_id.as_deref(), FieldName::new("userId"))?,
    };
    let rating = state.ratings.rate(caller.principal(), request).await?;
    Ok(HttpResponse::Created().json(RatingSavedBody {
        message: "Rating saved".to_owned(),
        rating,
    }))
}

/// Ratings newest first.
#[utoipa::path(
    get,
    path = "/api/v1/ratings",
    params(
        ("journeyId" = Option<String>, Query, description = "Only ratings of this journey"),
        ("userId" = Option<String>, Query, description = "Only ratings by this user")
    ),
    responses(
        (status = 200, description = "Ratings", body = [RatingListEntry]),
        (status = 400, description = "Malformed filter", body = Error)
    ),
    tags = ["ratings"],
    operation_id = "listRatings"
)]
#[get("/ratings")]
pub async fn list_ratings(
    state: web::Data<HttpState>,
    _viewer: OptionalUser,
    query: web::Query<RatingQuery>,
) -> ApiResult<web::Json<Vec<RatingListEntry>>> {
    let RatingQuery {
        journey_id,
        user_id,
    } = query.into_inner();
    let filter = RatingFilter {
        journey_id: parse_optional_id(journey_id.as_deref(), FieldName::new("journeyId"))?,
        user_id: parse_optional_id(user_id.as_deref(), FieldName::new("userId"))?,
    };
    let entries = state.ratings.list_ratings(filter).await?;
    Ok(web::Json(entries.into_iter().map(Into::into).collect()))
}

/// Mean rating of a journey; zero when unrated.
#[utoipa::path(
    get,
    path = "/api/v1/ratings/average/{journeyId}",
    params(("journeyId" = String, Path, format = "uuid")),
    responses((status = 200, description = "Average", body = RatingAverage)),
    tags = ["ratings"],
    operation_id = "averageRating"
)]
#[get("/ratings/average/{journey_id}")]
pub async fn average_rating(
    state: web::Data<HttpState>,
    _viewer: OptionalUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<RatingAverage>> {
    let journey: JourneyId = parse_id(&path, FieldName::new("journeyId"))?;
    Ok(web::Json(state.ratings.average(journey).await?))
}

#[cfg(test)]
#[path = "ratings_tests.rs"]
mod tests;
