//! Participations API handlers.
//!
//! ```text
//! GET    /api/v1/participations?userId=…&journeyId=…
//! POST   /api/v1/participations {"userId":"…","journeyId":"…","status":"invited"}
//! GET    /api/v1/participations/{id}
//! PUT    /api/v1/participations/{id} {"status":"accepted"}
//! DELETE /api/v1/participations/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::ParticipationRequest;
use crate::domain::{
    Error, Participation, ParticipationFilter, ParticipationId, ParticipationStatus,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{AuthenticatedUser, OptionalUser};
use crate::inbound::http::schemas::DeletedBody;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id, parse_optional_id};

/// Optional listing filters.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParticipationQuery {
    pub user_id: Option<String>,
    pub journey_id: Option<String>,
}

impl TryFrom<ParticipationQuery> for ParticipationFilter {
    type Error = Error;

    fn try_from(query: ParticipationQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: parse_optional_id(query.user_id.as_deref(), FieldName::new("userId"))?,
            journey_id: parse_optional_id(
                query.journey_id.as_deref(),
                FieldName::new("journeyId"),
            )?,
        })
    }
}

/// Participation creation body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateParticipationBody {
    #[schema(format = "uuid")]
    pub user_id: String,
    #[schema(format = "uuid")]
    pub journey_id: String,
    /// Defaults to `invited`.
    pub status: Option<String>,
}

/// Status change body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateParticipationBody {
    pub status: String,
}

fn participation_id(raw: &str) -> Result<ParticipationId, Error> {
    parse_id(raw, FieldName::new("id"))
}

fn parse_status(raw: &str) -> Result<ParticipationStatus, Error> {
    Ok(raw.parse::<ParticipationStatus>()?)
}

#[utoipa::path(
    get,
    path = "/api/v1/participations",
    params(
        ("userId" = Option<String>, Query, description = "Only this user's participations"),
        ("journeyId" = Option<String>, Query, description = "Only this journey's participations")
    ),
    responses(
        (status = 200, description = "Participations", body = [Participation]),
        (status = 400, description = "Malformed filter", body = Error)
    ),
    tags = ["participations"],
    operation_id = "listParticipations"
)]
#[get("/participations")]
pub async fn list_participations(
    state: web::Data<HttpState>,
    _viewer: OptionalUser,
    query: web::Query<ParticipationQuery>,
) -> ApiResult<web::Json<Vec<Participation>>> {
    let filter = ParticipationFilter::try_from(query.into_inner())?;
    Ok(web::Json(state.enrolment.list_participations(filter).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/participations",
    request_body = CreateParticipationBody,
    responses(
        (status = 201, description = "Participation created", body = Participation),
        (status = 404, description = "Unknown user or journey", body = Error),
        (status = 409, description = "Already participating", body = Error)
    ),
    tags = ["participations"],
    operation_id = "createParticipation",
    security(("BearerToken" = []))
)]
#[post("/participations")]
pub async fn create_participation(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
    payload: web::Json<CreateParticipationBody>,
) -> ApiResult<HttpResponse> {
    let CreateParticipationBody {
        user_id,
        journey_id,
        status,
    } = payload.into_inner();
    let request = ParticipationRequest {
        user_id: parse_id(&user_id, FieldName::new("userId"))?,
        journey_id: parse_id(&journey_id, FieldName::new("journeyId"))?,
        status: status.as_deref().map(parse_status).transpose()?,
    };
    let participation = state.enrolment.create_participation(request).await?;
    Ok(HttpResponse::Created().json(participation))
}

#[utoipa::path(
    get,
    path = "/api/v1/participations/{id}",
    params(("id" = String, Path, format = "uuid")),
    responses(
        (status = 200, description = "Participation", body = Participation),
        (status = 404, description = "Unknown participation", body = Error)
    ),
    tags = ["participations"],
    operation_id = "getParticipation"
)]
#[get("/participations/{id}")]
pub async fn get_participation(
    state: web::Data<HttpState>,
    _viewer: OptionalUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<Participation>> {
    let id = participation_id(&path)?;
    Ok(web::Json(state.enrolment.get_participation(id).await?))
}

/// Change a participation's status and stamp the response time.
#[utoipa::path(
    put,
    path = "/api/v1/participations/{id}",
    params(("id" = String, Path, format = "uuid")),
    request_body = UpdateParticipationBody,
    responses(
        (status = 200, description = "Updated participation", body = Participation),
        (status = 400, description = "Unknown status", body = Error),
        (status = 404, description = "Unknown participation", body = Error)
    ),
    tags = ["participations"],
    operation_id = "updateParticipation",
    security(("BearerToken" = []))
)]
#[put("/participations/{id}")]
pub async fn update_participation(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<UpdateParticipationBody>,
) -> ApiResult<web::Json<Participation>> {
    let id = participation_id(&path)?;
    let status = parse_status(&payload.status)?;
    Ok(web::Json(
        state.enrolment.update_participation(id, status).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/participations/{id}",
    params(("id" = String, Path, format = "uuid")),
    responses(
        (status = 200, description = "Participation deleted", body = DeletedBody),
        (status = 404, description = "Unknown participation", body = Error)
    ),
    tags = ["participations"],
    operation_id = "deleteParticipation",
    security(("BearerToken" = []))
)]
#[delete("/participations/{id}")]
pub async fn delete_participation(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<DeletedBody>> {
    let id = participation_id(&path)?;
    state.enrolment.delete_participation(id).await?;
    Ok(web::Json(DeletedBody::new("Participation deleted", id)))
}

#[cfg(test)]
#[path = "participations_tests.rs"]
mod tests;
