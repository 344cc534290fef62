//! Journeys API handlers.
//!
//! ```text
//! GET    /api/v1/journeys
//! POST   /api/v1/journeys {"name":"Old town","description":"…","target":{"lat":45.76,"lng":4.83}}
//! GET    /api/v1/journeys/{id}
//! PUT    /api/v1/journeys/{id}
//! DELETE /api/v1/journeys/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::geo::GeoPoint;
use crate::domain::{Error, Journey, JourneyDraft, JourneyId, JourneyPatch};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{AuthenticatedUser, OptionalUser};
use crate::inbound::http::schemas::{DeletedBody, PointBody};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id, parse_optional_id};

/// Journey creation body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateJourneyBody {
    pub name: String,
    pub description: String,
    pub town: Option<String>,
    pub image: Option<String>,
    pub target: Option<PointBody>,
    #[schema(format = "uuid")]
    pub group_id: Option<String>,
}

/// Journey update body; absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateJourneyBody {
    pub name: Option<String>,
    pub description: Option<String>,
    pub town: Option<String>,
    pub image: Option<String>,
    pub target: Option<PointBody>,
    #[schema(format = "uuid")]
    pub group_id: Option<String>,
}

fn target(point: Option<PointBody>) -> Result<Option<GeoPoint>, Error> {
    Ok(point.map(PointBody::into_point).transpose()?)
}

fn journey_id(raw: &str) -> Result<JourneyId, Error> {
    parse_id(raw, FieldName::new("id"))
}

impl TryFrom<CreateJourneyBody> for JourneyDraft {
    type Error = Error;

    fn try_from(body: CreateJourneyBody) -> Result<Self, Self::Error> {
        Ok(Self {
            name: body.name,
            description: body.description,
            town: body.town,
            image: body.image,
            target: target(body.target)?,
            group_id: parse_optional_id(body.group_id.as_deref(), FieldName::new("groupId"))?,
        })
    }
}

impl TryFrom<UpdateJourneyBody> for JourneyPatch {
    type Error = Error;

    fn try_from(body: UpdateJourneyBody) -> Result<Self, Self::Error> {
        Ok(Self {
            name: body.name,
            description: body.description,
            town: body.town,
            image: body.image,
            target: target(body.target)?,
            group_id: parse_optional_id(body.group_id.as_deref(), FieldName::new("groupId"))?,
        })
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/journeys",
    responses((status = 200, description = "Journeys", body = [Journey])),
    tags = ["journeys"],
    operation_id = "listJourneys"
)]
#[get("/journeys")]
pub async fn list_journeys(
    state: web::Data<HttpState>,
    _viewer: OptionalUser,
) -> ApiResult<web::Json<Vec<Journey>>> {
    Ok(web::Json(state.journeys.list_journeys().await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/journeys",
    request_body = CreateJourneyBody,
    responses(
        (status = 201, description = "Journey created", body = Journey),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Unknown group", body = Error)
    ),
    tags = ["journeys"],
    operation_id = "createJourney",
    security(("BearerToken" = []))
)]
#[post("/journeys")]
pub async fn create_journey(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
    payload: web::Json<CreateJourneyBody>,
) -> ApiResult<HttpResponse> {
    let draft = JourneyDraft::try_from(payload.into_inner())?;
    let journey = state.journeys.create_journey(draft).await?;
    Ok(HttpResponse::Created().json(journey))
}

#[utoipa::path(
    get,
    path = "/api/v1/journeys/{id}",
    params(("id" = String, Path, format = "uuid")),
    responses(
        (status = 200, description = "Journey", body = Journey),
        (status = 404, description = "Unknown journey", body = Error)
    ),
    tags = ["journeys"],
    operation_id = "getJourney"
)]
#[get("/journeys/{id}")]
pub async fn get_journey(
    state: web::Data<HttpState>,
    _viewer: OptionalUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<Journey>> {
    let id = journey_id(&path)?;
    Ok(web::Json(state.journeys.get_journey(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/journeys/{id}",
    params(("id" = String, Path, format = "uuid")),
    request_body = UpdateJourneyBody,
    responses(
        (status = 200, description = "Updated journey", body = Journey),
        (status = 404, description = "Unknown journey", body = Error)
    ),
    tags = ["journeys"],
    operation_id = "updateJourney",
    security(("BearerToken" = []))
)]
#[put("/journeys/{id}")]
pub async fn update_journey(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<UpdateJourneyBody>,
) -> ApiResult<web::Json<Journey>> {
    let id = journey_id(&path)?;
    let patch = JourneyPatch::try_from(payload.into_inner())?;
    Ok(web::Json(state.journeys.update_journey(id, patch).await?))
}

/// Delete a journey with its steps, participations, ratings and scores.
#[utoipa::path(
    delete,
    path = "/api/v1/journeys/{id}",
    params(("id" = String, Path, format = "uuid")),
    responses(
        (status = 200, description = "Journey deleted", body = DeletedBody),
        (status = 404, description = "Unknown journey", body = Error)
    ),
    tags = ["journeys"],
    operation_id = "deleteJourney",
    security(("BearerToken" = []))
)]
#[delete("/journeys/{id}")]
pub async fn delete_journey(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<DeletedBody>> {
    let id = journey_id(&path)?;
    state.journeys.delete_journey(id).await?;
    Ok(web::Json(DeletedBody::new("Journey deleted", id)))
}

#[cfg(test)]
#[path = "journeys_tests.rs"]
mod tests;
