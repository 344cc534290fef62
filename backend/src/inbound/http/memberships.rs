//! Group membership handlers, mounted at `/api/v1/user-groups`.
//!
//! ```text
//! GET    /api/v1/user-groups
//! POST   /api/v1/user-groups {"userId":"…","groupId":"…","role":"pending"}
//! GET    /api/v1/user-groups/members/{groupId}
//! GET    /api/v1/user-groups/pending/{userId}
//! GET    /api/v1/user-groups/{id}
//! PUT    /api/v1/user-groups/{id} {"role":"moderator"}
//! DELETE /api/v1/user-groups/{id}
//! POST   /api/v1/user-groups/{id}/accept
//! POST   /api/v1/user-groups/{id}/decline
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::MembershipRequest;
use crate::domain::{
    Error, GroupId, GroupInvite, GroupRoster, Membership, MembershipId, MembershipRole, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{AuthenticatedUser, OptionalUser};
use crate::inbound::http::schemas::{DeletedBody, MessageBody};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

/// Membership creation body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateMembershipBody {
    #[schema(format = "uuid")]
    pub user_id: String,
    #[schema(format = "uuid")]
    pub group_id: String,
    /// Defaults to `pending`.
    pub role: Option<String>,
}

/// Role change body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateMembershipBody {
    pub role: String,
}

/// Member status inside a group.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberStatus {
    #[schema(format = "uuid")]
    pub user_id: String,
    pub username: String,
    pub status: MembershipRole,
}

/// Membership listing for a group.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupMembersBody {
    #[schema(format = "uuid")]
    pub group_id: String,
    pub group_name: String,
    pub members: Vec<MemberStatus>,
}

impl From<GroupRoster> for GroupMembersBody {
    fn from(roster: GroupRoster) -> Self {
        Self {
            group_id: roster.group_id.to_string(),
            group_name: roster.group_name,
            members: roster
                .members
                .into_iter()
                .map(|member| MemberStatus {
                    user_id: member.user_id.to_string(),
                    username: member.username,
                    status: member.role,
                })
                .collect(),
        }
    }
}

/// Pending group invitation, shaped for notification lists.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InviteNotification {
    #[schema(format = "uuid")]
    pub id: String,
    pub name: String,
    #[schema(format = "uuid")]
    pub group_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub category: String,
}

impl From<GroupInvite> for InviteNotification {
    fn from(invite: GroupInvite) -> Self {
        Self {
            id: invite.membership_id.to_string(),
            name: invite.group_name,
            group_id: invite.group_id.to_string(),
            kind: "invite".to_owned(),
            category: "group".to_owned(),
        }
    }
}

/// Membership wrapped with a confirmation message.
#[derive(Debug, Serialize, ToSchema)]
pub struct MembershipBody {
    pub message: String,
    pub membership: Membership,
}

fn membership_id(raw: &str) -> Result<MembershipId, Error> {
    parse_id(raw, FieldName::new("id"))
}

fn parse_role(raw: &str) -> Result<MembershipRole, Error> {
    Ok(raw.parse::<MembershipRole>()?)
}

#[utoipa::path(
    get,
    path = "/api/v1/user-groups",
    responses((status = 200, description = "Memberships", body = [Membership])),
    tags = ["memberships"],
    operation_id = "listMemberships"
)]
#[get("/user-groups")]
pub async fn list_memberships(
    state: web::Data<HttpState>,
    _viewer: OptionalUser,
) -> ApiResult<web::Json<Vec<Membership>>> {
    Ok(web::Json(state.groups.list_memberships().await?))
}

/// Invite or enrol a user in a group.
#[utoipa::path(
    post,
    path = "/api/v1/user-groups",
    request_body = CreateMembershipBody,
    responses(
        (status = 201, description = "Membership created", body = Membership),
        (status = 400, description = "Invalid role or id", body = Error),
        (status = 404, description = "Unknown user or group", body = Error),
        (status = 409, description = "Already a member", body = Error)
    ),
    tags = ["memberships"],
    operation_id = "createMembership",
    security(("BearerToken" = []))
)]
#[post("/user-groups")]
pub async fn create_membership(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
    payload: web::Json<CreateMembershipBody>,
) -> ApiResult<HttpResponse> {
    let CreateMembershipBody {
        user_id,
        group_id,
        role,
    } = payload.into_inner();
    let request = MembershipRequest {
        user_id: parse_id(&user_id, FieldName::new("userId"))?,
        group_id: parse_id(&group_id, FieldName::new("groupId"))?,
        role: role.as_deref().map(parse_role).transpose()?,
    };
    let membership = state.groups.create_membership(request).await?;
    Ok(HttpResponse::Created().json(membership))
}

/// Members of a group with their role as status.
#[utoipa::path(
    get,
    path = "/api/v1/user-groups/members/{groupId}",
    params(("groupId" = String, Path, format = "uuid")),
    responses(
        (status = 200, description = "Members", body = GroupMembersBody),
        (status = 404, description = "Unknown group", body = Error)
    ),
    tags = ["memberships"],
    operation_id = "membershipsOfGroup"
)]
#[get("/user-groups/members/{group_id}")]
pub async fn members_of_group(
    state: web::Data<HttpState>,
    _viewer: OptionalUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<GroupMembersBody>> {
    let group: GroupId = parse_id(&path, FieldName::new("groupId"))?;
    Ok(web::Json(state.groups.roster(group).await?.into()))
}

/// Pending invitations addressed to a user.
#[utoipa::path(
    get,
    path = "/api/v1/user-groups/pending/{userId}",
    params(("userId" = String, Path, format = "uuid")),
    responses((status = 200, description = "Invitations", body = [InviteNotification])),
    tags = ["memberships"],
    operation_id = "pendingGroupInvites"
)]
#[get("/user-groups/pending/{user_id}")]
pub async fn pending_invites(
    state: web::Data<HttpState>,
    _viewer: OptionalUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<InviteNotification>>> {
    let user: UserId = parse_id(&path, FieldName::new("userId"))?;
    let invites = state.groups.pending_invites(user).await?;
    Ok(web::Json(invites.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/user-groups/{id}",
    params(("id" = String, Path, format = "uuid")),
    responses(
        (status = 200, description = "Membership", body = Membership),
        (status = 404, description = "Unknown membership", body = Error)
    ),
    tags = ["memberships"],
    operation_id = "getMembership"
)]
#[get("/user-groups/{id}")]
pub async fn get_membership(
    state: web::Data<HttpState>,
    _viewer: OptionalUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<Membership>> {
    let id = membership_id(&path)?;
    Ok(web::Json(state.groups.get_membership(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/user-groups/{id}",
    params(("id" = String, Path, format = "uuid")),
    request_body = UpdateMembershipBody,
    responses(
        (status = 200, description = "Updated membership", body = Membership),
        (status = 400, description = "Unknown role", body = Error),
        (status = 404, description = "Unknown membership", body = Error)
    ),
    tags = ["memberships"],
    operation_id = "updateMembership",
    security(("BearerToken" = []))
)]
#[put("/user-groups/{id}")]
pub async fn update_membership(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<UpdateMembershipBody>,
) -> ApiResult<web::Json<Membership>> {
    let id = membership_id(&path)?;
    let role = parse_role(&payload.role)?;
    Ok(web::Json(state.groups.set_role(id, role).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/user-groups/{id}",
    params(("id" = String, Path, format = "uuid")),
    responses(
        (status = 200, description = "Membership deleted", body = DeletedBody),
        (status = 404, description = "Unknown membership", body = Error)
    ),
    tags = ["memberships"],
    operation_id = "deleteMembership",
    security(("BearerToken" = []))
)]
#[delete("/user-groups/{id}")]
pub async fn delete_membership(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<DeletedBody>> {
    let id = membership_id(&path)?;
    state.groups.delete_membership(id).await?;
    Ok(web::Json(DeletedBody::new("Membership deleted", id)))
}

/// Accept an invitation addressed to the caller.
#[utoipa::path(
    post,
    path = "/api/v1/user-groups/{id}/accept",
    params(("id" = String, Path, format = "uuid")),
    responses(
        (status = 200, description = "Invitation accepted", body = MembershipBody),
        (status = 403, description = "Caller is not the invitee", body = Error),
        (status = 409, description = "Invitation already answered", body = Error)
    ),
    tags = ["memberships"],
    operation_id = "acceptGroupInvite",
    security(("BearerToken" = []))
)]
#[post("/user-groups/{id}/accept")]
pub async fn accept_invite(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<MembershipBody>> {
    let id = membership_id(&path)?;
    let membership = state.groups.accept_invite(caller.principal(), id).await?;
    Ok(web::Json(MembershipBody {
        message: "Invitation accepted".to_owned(),
        membership,
    }))
}

/// Decline an invitation addressed to the caller.
#[utoipa::path(
    post,
    path = "/api/v1/user-groups/{id}/decline",
    params(("id" = String, Path, format = "uuid")),
    responses(
        (status = 200, description = "Invitation declined", body = MessageBody),
        (status = 403, description = "Caller is not the invitee", body = Error),
        (status = 409, description = "Invitation already answered", body = Error)
    ),
    tags = ["memberships"],
    operation_id = "declineGroupInvite",
    security(("BearerToken" = []))
)]
#[post("/user-groups/{id}/decline")]
pub async fn decline_invite(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<MessageBody>> {
    let id = membership_id(&path)?;
    state.groups.decline_invite(caller.principal(), id).await?;
    Ok(web::Json(MessageBody::new("Invitation declined")))
}

#[cfg(test)]
#[path = "memberships_tests.rs"]
mod tests;
