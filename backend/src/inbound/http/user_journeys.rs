//! Saved journeys, mounted at `/api/v1/user-journeys`.
//!
//! ```text
//! GET    /api/v1/user-journeys?userId=…
//! POST   /api/v1/user-journeys {"userId":"…","journeyId":"…"}
//! PUT    /api/v1/user-journeys/{id} {"journeyId":"…"}
//! DELETE /api/v1/user-journeys/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, JourneyAudience, UserJourney, UserJourneyId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{AuthenticatedUser, OptionalUser};
use crate::inbound::http::schemas::DeletedBody;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id, parse_optional_id};

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserJourneyQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SaveJourneyBody {
    #[schema(format = "uuid")]
    pub user_id: String,
    #[schema(format = "uuid")]
    pub journey_id: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MoveJourneyBody {
    #[schema(format = "uuid")]
    pub journey_id: String,
}

fn entry_id(raw: &str) -> Result<UserJourneyId, Error> {
    parse_id(raw, FieldName::new("id"))
}

/// Saved journeys grouped by journey.
#[utoipa::path(
    get,
    path = "/api/v1/user-journeys",
    params(("userId" = Option<String>, Query, description = "Only this user's saved journeys")),
    responses(
        (status = 200, description = "Journeys with their users", body = [JourneyAudience]),
        (status = 400, description = "Malformed filter", body = Error)
    ),
    tags = ["user-journeys"],
    operation_id = "listUserJourneys"
)]
#[get("/user-journeys")]
pub async fn list_user_journeys(
    state: web::Data<HttpState>,
    _viewer: OptionalUser,
    query: web::Query<UserJourneyQuery>,
) -> ApiResult<web::Json<Vec<JourneyAudience>>> {
    let user = parse_optional_id(query.user_id.as_deref(), FieldName::new("userId"))?;
    Ok(web::Json(state.enrolment.saved_journeys(user).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/user-journeys",
    request_body = SaveJourneyBody,
    responses(
        (status = 201, description = "Journey saved", body = UserJourney),
        (status = 404, description = "Unknown user or journey", body = Error),
        (status = 409, description = "Already saved", body = Error)
    ),
    tags = ["user-journeys"],
    operation_id = "saveUserJourney",
    security(("BearerToken" = []))
)]
#[post("/user-journeys")]
pub async fn save_journey(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
    payload: web::Json<SaveJourneyBody>,
) -> ApiResult<HttpResponse> {
    let SaveJourneyBody {
        user_id,
        journey_id,
    } = payload.into_inner();
    let user = parse_id(&user_id, FieldName::new("userId"))?;
    let journey = parse_id(&journey_id, FieldName::new("journeyId"))?;
    let saved = state.enrolment.save_journey(user, journey).await?;
    Ok(HttpResponse::Created().json(saved))
}

#[utoipa::path(
    put,
    path = "/api/v1/user-journeys/{id}",
    params(("id" = String, Path, format = "uuid")),
    request_body = MoveJourneyBody,
    responses(
        (status = 200, description = "Saved entry updated", body = UserJourney),
        (status = 404, description = "Unknown entry or journey", body = Error),
        (status = 409, description = "Target journey already saved", body = Error)
    ),
    tags = ["user-journeys"],
    operation_id = "updateUserJourney",
    security(("BearerToken" = []))
)]
#[put("/user-journeys/{id}")]
pub async fn move_journey(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<MoveJourneyBody>,
) -> ApiResult<web::Json<UserJourney>> {
    let id = entry_id(&path)?;
    let journey = parse_id(&payload.journey_id, FieldName::new("journeyId"))?;
    Ok(web::Json(state.enrolment.move_saved_journey(id, journey).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/user-journeys/{id}",
    params(("id" = String, Path, format = "uuid")),
    responses(
        (status = 200, description = "Saved entry deleted", body = DeletedBody),
        (status = 404, description = "Unknown entry", body = Error)
    ),
    tags = ["user-journeys"],
    operation_id = "deleteUserJourney",
    security(("BearerToken" = []))
)]
#[delete("/user-journeys/{id}")]
pub async fn delete_saved_journey(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<DeletedBody>> {
    let id = entry_id(&path)?;
    state.enrolment.delete_saved_journey(id).await?;
    Ok(web::Json(DeletedBody::new("User journey deleted", id)))
}

#[cfg(test)]
#[path = "user_journeys_tests.rs"]
mod tests;
