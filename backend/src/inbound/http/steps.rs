//! Steps API handlers.
//!
//! ```text
//! GET    /api/v1/steps
//! POST   /api/v1/steps {"journeyId":"…","title":"Fountain","lat":45.76,"lng":4.83}
//! GET    /api/v1/steps/journey/{journeyId}
//! GET    /api/v1/steps/{id}
//! PUT    /api/v1/steps/{id}
//! DELETE /api/v1/steps/{id}
//! POST   /api/v1/steps/{id}/guess {"lat":45.76,"lng":4.83}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::geo::{GeoPoint, ScoreTier, format_distance};
use crate::domain::{
    Error, FieldError, JourneyId, Step, StepDraft, StepId, StepPatch, StepReadings,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{AuthenticatedUser, OptionalUser};
use crate::inbound::http::schemas::{DeletedBody, PointBody};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_id, parse_optional_rfc3339_timestamp,
};

/// Step creation body with a flat coordinate.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateStepBody {
    #[schema(format = "uuid")]
    pub journey_id: String,
    /// Appended after the last step when absent.
    pub position: Option<i32>,
    pub title: String,
    pub description: Option<String>,
    pub riddle: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub image: Option<String>,
    pub accuracy: Option<f64>,
    pub altitude: Option<f64>,
    pub speed: Option<f64>,
    pub note: Option<String>,
    #[schema(format = "date-time")]
    pub recorded_at: Option<String>,
}

/// Step update body; `lat` and `lng` travel together.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateStepBody {
    pub position: Option<i32>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub riddle: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub image: Option<String>,
    pub accuracy: Option<f64>,
    pub altitude: Option<f64>,
    pub speed: Option<f64>,
    pub note: Option<String>,
    #[schema(format = "date-time")]
    pub recorded_at: Option<String>,
}

/// Scored guess for a step.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GuessBody {
    #[schema(format = "uuid")]
    pub step_id: String,
    pub distance_meters: f64,
    #[schema(example = "1.2 km")]
    pub formatted_distance: String,
    pub tier: ScoreTier,
}

fn step_id(raw: &str) -> Result<StepId, Error> {
    parse_id(raw, FieldName::new("id"))
}

fn recorded_at(raw: Option<&str>) -> Result<Option<chrono::DateTime<chrono::Utc>>, Error> {
    parse_optional_rfc3339_timestamp(raw, FieldName::new("recordedAt"))
}

fn partial_location(lat: Option<f64>, lng: Option<f64>) -> Result<Option<GeoPoint>, FieldError> {
    match (lat, lng) {
        (None, None) => Ok(None),
        (Some(lat), Some(lng)) => GeoPoint::new(lat, lng).map(Some),
        (Some(_), None) => Err(FieldError::Empty { field: "lng" }),
        (None, Some(_)) => Err(FieldError::Empty { field: "lat" }),
    }
}

impl TryFrom<CreateStepBody> for StepDraft {
    type Error = Error;

    fn try_from(body: CreateStepBody) -> Result<Self, Self::Error> {
        Ok(Self {
            journey_id: parse_id(&body.journey_id, FieldName::new("journeyId"))?,
            position: body.position,
            title: body.title,
            description: body.description,
            riddle: body.riddle,
            location: GeoPoint::new(body.lat, body.lng)?,
            image: body.image,
            readings: StepReadings::try_new(body.accuracy, body.altitude, body.speed)?,
            note: body.note,
            recorded_at: recorded_at(body.recorded_at.as_deref())?,
        })
    }
}

impl TryFrom<UpdateStepBody> for StepPatch {
    type Error = Error;

    fn try_from(body: UpdateStepBody) -> Result<Self, Self::Error> {
        Ok(Self {
            position: body.position,
            title: body.title,
            description: body.description,
            riddle: body.riddle,
            location: partial_location(body.lat, body.lng)?,
            image: body.image,
            readings: StepReadings::try_new(body.accuracy, body.altitude, body.speed)?,
            note: body.note,
            recorded_at: recorded_at(body.recorded_at.as_deref())?,
        })
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/steps",
    responses((status = 200, description = "Steps", body = [Step])),
    tags = ["steps"],
    operation_id = "listSteps"
)]
#[get("/steps")]
pub async fn list_steps(
    state: web::Data<HttpState>,
    _viewer: OptionalUser,
) -> ApiResult<web::Json<Vec<Step>>> {
    Ok(web::Json(state.journeys.list_steps().await?))
}

/// Steps of one journey ordered by position.
#[utoipa::path(
    get,
    path = "/api/v1/steps/journey/{journeyId}",
    params(("journeyId" = String, Path, format = "uuid")),
    responses((status = 200, description = "Ordered steps", body = [Step])),
    tags = ["steps"],
    operation_id = "stepsOfJourney"
)]
#[get("/steps/journey/{journey_id}")]
pub async fn steps_of_journey(
    state: web::Data<HttpState>,
    _viewer: OptionalUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<Step>>> {
    let journey: JourneyId = parse_id(&path, FieldName::new("journeyId"))?;
    Ok(web::Json(state.journeys.steps_of(journey).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/steps",
    request_body = CreateStepBody,
    responses(
        (status = 201, description = "Step created", body = Step),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Unknown journey", body = Error)
    ),
    tags = ["steps"],
    operation_id = "createStep",
    security(("BearerToken" = []))
)]
#[post("/steps")]
pub async fn create_step(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
    payload: web::Json<CreateStepBody>,
) -> ApiResult<HttpResponse> {
    let draft = StepDraft::try_from(payload.into_inner())?;
    let step = state.journeys.create_step(draft).await?;
    Ok(HttpResponse::Created().json(step))
}

#[utoipa::path(
    get,
    path = "/api/v1/steps/{id}",
    params(("id" = String, Path, format = "uuid")),
    responses(
        (status = 200, description = "Step", body = Step),
        (status = 404, description = "Unknown step", body = Error)
    ),
    tags = ["steps"],
    operation_id = "getStep"
)]
#[get("/steps/{id}")]
pub async fn get_step(
    state: web::Data<HttpState>,
    _viewer: OptionalUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<Step>> {
    let id = step_id(&path)?;
    Ok(web::Json(state.journeys.get_step(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/steps/{id}",
    params(("id" = String, Path, format = "uuid")),
    request_body = UpdateStepBody,
    responses(
        (status = 200, description = "Updated step", body = Step),
        (status = 404, description = "Unknown step", body = Error)
    ),
    tags = ["steps"],
    operation_id = "updateStep",
    security(("BearerToken" = []))
)]
#[put("/steps/{id}")]
pub async fn update_step(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<UpdateStepBody>,
) -> ApiResult<web::Json<Step>> {
    let id = step_id(&path)?;
    let patch = StepPatch::try_from(payload.into_inner())?;
    Ok(web::Json(state.journeys.update_step(id, patch).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/steps/{id}",
    params(("id" = String, Path, format = "uuid")),
    responses(
        (status = 200, description = "Step deleted", body = DeletedBody),
        (status = 404, description = "Unknown step", body = Error)
    ),
    tags = ["steps"],
    operation_id = "deleteStep",
    security(("BearerToken" = []))
)]
#[delete("/steps/{id}")]
pub async fn delete_step(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<DeletedBody>> {
    let id = step_id(&path)?;
    state.journeys.delete_step(id).await?;
    Ok(web::Json(DeletedBody::new("Step deleted", id)))
}

/// Score a guessed position against the step location.
#[utoipa::path(
    post,
    path = "/api/v1/steps/{id}/guess",
    params(("id" = String, Path, format = "uuid")),
    request_body = PointBody,
    responses(
        (status = 200, description = "Guess scored", body = GuessBody),
        (status = 400, description = "Coordinate out of range", body = Error),
        (status = 404, description = "Unknown step", body = Error)
    ),
    tags = ["steps"],
    operation_id = "guessStep"
)]
#[post("/steps/{id}/guess")]
pub async fn guess_step(
    state: web::Data<HttpState>,
    _viewer: OptionalUser,
    path: web::Path<String>,
    payload: web::Json<PointBody>,
) -> ApiResult<web::Json<GuessBody>> {
    let id = step_id(&path)?;
    let guess = payload.into_inner().into_point()?;
    let evaluation = state.journeys.guess(id, guess).await?;
    Ok(web::Json(GuessBody {
        step_id: id.to_string(),
        distance_meters: evaluation.distance_meters,
        formatted_distance: format_distance(evaluation.distance_meters),
        tier: evaluation.tier,
    }))
}

#[cfg(test)]
#[path = "steps_tests.rs"]
mod tests;
