//! Groups API handlers.
//!
//! ```text
//! GET    /api/v1/groups
//! POST   /api/v1/groups {"name":"Hikers","isPrivate":true}
//! GET    /api/v1/groups/user/{userId}
//! GET    /api/v1/groups/{id}
//! PUT    /api/v1/groups/{id}
//! DELETE /api/v1/groups/{id}
//! GET    /api/v1/groups/{id}/members
//! DELETE /api/v1/groups/{id}/members/{userId}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Error, Group, GroupDraft, GroupId, GroupPatch, GroupRef, GroupRoster, MembershipRole, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{AuthenticatedUser, OptionalUser};
use crate::inbound::http::schemas::{DeletedBody, MessageBody};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id, parse_optional_id};

/// Group creation body; the owner defaults to the caller.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateGroupBody {
    pub name: String,
    pub description: Option<String>,
    pub is_private: Option<bool>,
    pub image: Option<String>,
    #[schema(format = "uuid")]
    pub owner_id: Option<String>,
}

/// Group update body; absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateGroupBody {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_private: Option<bool>,
    pub image: Option<String>,
}

impl From<UpdateGroupBody> for GroupPatch {
    fn from(body: UpdateGroupBody) -> Self {
        Self {
            name: body.name,
            description: body.description,
            is_private: body.is_private,
            image: body.image,
        }
    }
}

/// Created group with a confirmation message.
#[derive(Debug, Serialize, ToSchema)]
pub struct GroupCreatedBody {
    pub message: String,
    pub group: Group,
}

/// One member in a roster.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RosterMember {
    /// The member's user id.
    #[schema(format = "uuid")]
    pub id: String,
    pub username: String,
    pub profile_picture: Option<String>,
    pub role: MembershipRole,
}

/// Group with its members.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RosterBody {
    #[schema(format = "uuid")]
    pub group_id: String,
    pub group_name: String,
    pub members: Vec<RosterMember>,
}

impl From<GroupRoster> for RosterBody {
    fn from(roster: GroupRoster) -> Self {
        Self {
            group_id: roster.group_id.to_string(),
            group_name: roster.group_name,
            members: roster
                .members
                .into_iter()
                .map(|member| RosterMember {
                    id: member.user_id.to_string(),
                    username: member.username,
                    profile_picture: member.profile_picture,
                    role: member.role,
                })
                .collect(),
        }
    }
}

fn group_id(raw: &str) -> Result<GroupId, Error> {
    parse_id(raw, FieldName::new("id"))
}

/// List every group.
#[utoipa::path(
    get,
    path = "/api/v1/groups",
    responses((status = 200, description = "Groups", body = [Group])),
    tags = ["groups"],
    operation_id = "listGroups"
)]
#[get("/groups")]
pub async fn list_groups(
    state: web::Data<HttpState>,
    _viewer: OptionalUser,
) -> ApiResult<web::Json<Vec<Group>>> {
    Ok(web::Json(state.groups.list_groups().await?))
}

/// Create a group and enrol its owner as admin.
#[utoipa::path(
    post,
    path = "/api/v1/groups",
    request_body = CreateGroupBody,
    responses(
        (status = 201, description = "Group created", body = GroupCreatedBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Missing token", body = Error)
    ),
    tags = ["groups"],
    operation_id = "createGroup",
    security(("BearerToken" = []))
)]
#[post("/groups")]
pub async fn create_group(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<CreateGroupBody>,
) -> ApiResult<HttpResponse> {
    let CreateGroupBody {
        name,
        description,
        is_private,
        image,
        owner_id,
    } = payload.into_inner();
    let draft = GroupDraft {
        name,
        description,
        owner_id: parse_optional_id(owner_id.as_deref(), FieldName::new("ownerId"))?,
        is_private,
        image,
    };
    let group = state.groups.create_group(caller.principal(), draft).await?;
    Ok(HttpResponse::Created().json(GroupCreatedBody {
        message: "Group created".to_owned(),
        group,
    }))
}

/// Groups a user owns or actively belongs to.
#[utoipa::path(
    get,
    path = "/api/v1/groups/user/{userId}",
    params(("userId" = String, Path, format = "uuid")),
    responses((status = 200, description = "Groups of the user", body = [GroupRef])),
    tags = ["groups"],
    operation_id = "groupsOfUser"
)]
#[get("/groups/user/{user_id}")]
pub async fn groups_of_user(
    state: web::Data<HttpState>,
    _viewer: OptionalUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<GroupRef>>> {
    let user: UserId = parse_id(&path, FieldName::new("userId"))?;
    Ok(web::Json(state.groups.groups_of(user).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/groups/{id}",
    params(("id" = String, Path, format = "uuid")),
    responses(
        (status = 200, description = "Group", body = Group),
        (status = 404, description = "Unknown group", body = Error)
    ),
    tags = ["groups"],
    operation_id = "getGroup"
)]
#[get("/groups/{id}")]
pub async fn get_group(
    state: web::Data<HttpState>,
    _viewer: OptionalUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<Group>> {
    let id = group_id(&path)?;
    Ok(web::Json(state.groups.get_group(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/groups/{id}",
    params(("id" = String, Path, format = "uuid")),
    request_body = UpdateGroupBody,
    responses(
        (status = 200, description = "Updated group", body = Group),
        (status = 404, description = "Unknown group", body = Error)
    ),
    tags = ["groups"],
    operation_id = "updateGroup",
    security(("BearerToken" = []))
)]
#[put("/groups/{id}")]
pub async fn update_group(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<UpdateGroupBody>,
) -> ApiResult<web::Json<Group>> {
    let id = group_id(&path)?;
    let group = state
        .groups
        .update_group(id, payload.into_inner().into())
        .await?;
    Ok(web::Json(group))
}

/// Delete a group and its memberships.
#[utoipa::path(
    delete,
    path = "/api/v1/groups/{id}",
    params(("id" = String, Path, format = "uuid")),
    responses(
        (status = 200, description = "Group deleted", body = DeletedBody),
        (status = 404, description = "Unknown group", body = Error)
    ),
    tags = ["groups"],
    operation_id = "deleteGroup",
    security(("BearerToken" = []))
)]
#[delete("/groups/{id}")]
pub async fn delete_group(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<DeletedBody>> {
    let id = group_id(&path)?;
    state.groups.delete_group(id).await?;
    Ok(web::Json(DeletedBody::new("Group deleted", id)))
}

/// Group roster with every membership role.
#[utoipa::path(
    get,
    path = "/api/v1/groups/{id}/members",
    params(("id" = String, Path, format = "uuid")),
    responses(
        (status = 200, description = "Roster", body = RosterBody),
        (status = 404, description = "Unknown group", body = Error)
    ),
    tags = ["groups"],
    operation_id = "groupMembers"
)]
#[get("/groups/{id}/members")]
pub async fn group_members(
    state: web::Data<HttpState>,
    _viewer: OptionalUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<RosterBody>> {
    let id = group_id(&path)?;
    Ok(web::Json(state.groups.roster(id).await?.into()))
}

/// Remove a user from a group.
#[utoipa::path(
    delete,
    path = "/api/v1/groups/{id}/members/{userId}",
    params(
        ("id" = String, Path, format = "uuid"),
        ("userId" = String, Path, format = "uuid")
    ),
    responses(
        (status = 200, description = "Member removed", body = MessageBody),
        (status = 404, description = "Not a member", body = Error)
    ),
    tags = ["groups"],
    operation_id = "removeGroupMember",
    security(("BearerToken" = []))
)]
#[delete("/groups/{id}/members/{user_id}")]
pub async fn remove_member(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<MessageBody>> {
    let (raw_group, raw_user) = path.into_inner();
    let group = group_id(&raw_group)?;
    let user: UserId = parse_id(&raw_user, FieldName::new("userId"))?;
    state.groups.remove_member(group, user).await?;
    Ok(web::Json(MessageBody::new("Member removed from group")))
}

#[cfg(test)]
#[path = "groups_tests.rs"]
mod tests;
