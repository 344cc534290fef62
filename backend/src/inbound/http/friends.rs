//! Friends API handlers.
//!
//! ```text
//! GET    /api/v1/friends
//! POST   /api/v1/friends/requests {"userId":"…","friendUserId":"…"}
//! POST   /api/v1/friends/requests/{id}/accept
//! POST   /api/v1/friends/requests/{id}/refuse
//! GET    /api/v1/friends/requests/pending/{userId}
//! GET    /api/v1/friends/requests/sent/{userId}
//! GET    /api/v1/friends/unfriends/{userId}
//! GET    /api/v1/friends/list/{userId}
//! DELETE /api/v1/friends/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::FriendResponse;
use crate::domain::{
    Error, FriendEntry, Friendship, FriendshipId, FriendshipStatus, PendingFriendRequest, UserId,
    UserSummary,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{AuthenticatedUser, OptionalUser};
use crate::inbound::http::schemas::DeletedBody;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

/// Friend request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FriendRequestBody {
    #[schema(format = "uuid")]
    pub user_id: String,
    #[schema(format = "uuid")]
    pub friend_user_id: String,
}

/// Friendship wrapped with a confirmation message.
#[derive(Debug, Serialize, ToSchema)]
pub struct FriendshipBody {
    pub message: String,
    pub friendship: Friendship,
}

/// Incoming pending request, shaped for notification lists.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IncomingRequest {
    #[schema(format = "uuid")]
    pub id: String,
    pub name: String,
    #[schema(format = "uuid")]
    pub sender_id: String,
    pub profile_picture: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub category: String,
}

impl From<PendingFriendRequest> for IncomingRequest {
    fn from(value: PendingFriendRequest) -> Self {
        Self {
            id: value.friendship_id.to_string(),
            name: value.other.username,
            sender_id: value.other.id.to_string(),
            profile_picture: value.other.profile_picture,
            kind: "invite".to_owned(),
            category: "friend".to_owned(),
        }
    }
}

/// Outgoing pending request.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingRequest {
    #[schema(format = "uuid")]
    pub id: String,
    pub name: String,
    #[schema(format = "uuid")]
    pub recipient_id: String,
    pub profile_picture: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
}

impl From<PendingFriendRequest> for OutgoingRequest {
    fn from(value: PendingFriendRequest) -> Self {
        Self {
            id: value.friendship_id.to_string(),
            name: value.other.username,
            recipient_id: value.other.id.to_string(),
            profile_picture: value.other.profile_picture,
            kind: "pending-sent".to_owned(),
        }
    }
}

/// A user with no friendship to the subject in either direction.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Stranger {
    #[schema(format = "uuid")]
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub profile_picture: Option<String>,
}

impl From<UserSummary> for Stranger {
    fn from(value: UserSummary) -> Self {
        Self {
            user_id: value.id.to_string(),
            username: value.username,
            email: value.email,
            profile_picture: value.profile_picture,
        }
    }
}

/// Accepted friendship seen from one side.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FriendListEntry {
    #[schema(format = "uuid")]
    pub friendship_id: String,
    #[schema(format = "uuid")]
    pub friend_id: String,
    pub friend_name: String,
    pub profile_picture: Option<String>,
    pub status: FriendshipStatus,
}

impl From<FriendEntry> for FriendListEntry {
    fn from(value: FriendEntry) -> Self {
        Self {
            friendship_id: value.friendship_id.to_string(),
            friend_id: value.friend.id.to_string(),
            friend_name: value.friend.username,
            profile_picture: value.friend.profile_picture,
            status: value.status,
        }
    }
}

fn friendship_id(raw: &str) -> Result<FriendshipId, Error> {
    parse_id(raw, FieldName::new("id"))
}

fn subject_id(raw: &str) -> Result<UserId, Error> {
    parse_id(raw, FieldName::new("userId"))
}

/// List every friendship.
#[utoipa::path(
    get,
    path = "/api/v1/friends",
    responses((status = 200, description = "Friendships", body = [Friendship])),
    tags = ["friends"],
    operation_id = "listFriendships"
)]
#[get("/friends")]
pub async fn list_friendships(
    state: web::Data<HttpState>,
    _viewer: OptionalUser,
) -> ApiResult<web::Json<Vec<Friendship>>> {
    Ok(web::Json(state.friends.list_friendships().await?))
}

/// Send a friend request.
#[utoipa::path(
    post,
    path = "/api/v1/friends/requests",
    request_body = FriendRequestBody,
    responses(
        (status = 201, description = "Request created", body = FriendshipBody),
        (status = 400, description = "Self request or malformed id", body = Error),
        (status = 403, description = "Caller is not the requester", body = Error),
        (status = 404, description = "Unknown user", body = Error),
        (status = 409, description = "Pair already related", body = Error)
    ),
    tags = ["friends"],
    operation_id = "sendFriendRequest",
    security(("BearerToken" = []))
)]
#[post("/friends/requests")]
pub async fn send_request(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<FriendRequestBody>,
) -> ApiResult<HttpResponse> {
    let FriendRequestBody {
        user_id,
        friend_user_id,
    } = payload.into_inner();
    let requester = parse_id(&user_id, FieldName::new("userId"))?;
    let recipient = parse_id(&friend_user_id, FieldName::new("friendUserId"))?;
    let friendship = state
        .friends
        .send_request(caller.principal(), requester, recipient)
        .await?;
    Ok(HttpResponse::Created().json(FriendshipBody {
        message: "Friend request created".to_owned(),
        friendship,
    }))
}

async fn answer(
    state: &HttpState,
    caller: &AuthenticatedUser,
    raw_id: &str,
    response: FriendResponse,
) -> ApiResult<web::Json<FriendshipBody>> {
    let id = friendship_id(raw_id)?;
    let friendship = state
        .friends
        .respond(caller.principal(), id, response)
        .await?;
    let message = match response {
        FriendResponse::Accept => "Friend request accepted",
        FriendResponse::Refuse => "Friend request refused",
    };
    Ok(web::Json(FriendshipBody {
        message: message.to_owned(),
        friendship,
    }))
}

/// Accept a request addressed to the caller.
#[utoipa::path(
    post,
    path = "/api/v1/friends/requests/{id}/accept",
    params(("id" = String, Path, format = "uuid")),
    responses(
        (status = 200, description = "Accepted", body = FriendshipBody),
        (status = 403, description = "Caller is not the recipient", body = Error),
        (status = 404, description = "Unknown request", body = Error)
    ),
    tags = ["friends"],
    operation_id = "acceptFriendRequest",
    security(("BearerToken" = []))
)]
#[post("/friends/requests/{id}/accept")]
pub async fn accept_request(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<FriendshipBody>> {
    answer(&state, &caller, &path, FriendResponse::Accept).await
}

/// Refuse a request addressed to the caller.
#[utoipa::path(
    post,
    path = "/api/v1/friends/requests/{id}/refuse",
    params(("id" = String, Path, format = "uuid")),
    responses(
        (status = 200, description = "Refused", body = FriendshipBody),
        (status = 403, description = "Caller is not the recipient", body = Error),
        (status = 404, description = "Unknown request", body = Error)
    ),
    tags = ["friends"],
    operation_id = "refuseFriendRequest",
    security(("BearerToken" = []))
)]
#[post("/friends/requests/{id}/refuse")]
pub async fn refuse_request(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<FriendshipBody>> {
    answer(&state, &caller, &path, FriendResponse::Refuse).await
}

/// Pending requests addressed to a user.
#[utoipa::path(
    get,
    path = "/api/v1/friends/requests/pending/{userId}",
    params(("userId" = String, Path, format = "uuid")),
    responses((status = 200, description = "Incoming requests", body = [IncomingRequest])),
    tags = ["friends"],
    operation_id = "pendingFriendRequests"
)]
#[get("/friends/requests/pending/{user_id}")]
pub async fn pending_requests(
    state: web::Data<HttpState>,
    _viewer: OptionalUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<IncomingRequest>>> {
    let user = subject_id(&path)?;
    let pending = state.friends.pending_for(user).await?;
    Ok(web::Json(pending.into_iter().map(Into::into).collect()))
}

/// Pending requests sent by a user.
#[utoipa::path(
    get,
    path = "/api/v1/friends/requests/sent/{userId}",
    params(("userId" = String, Path, format = "uuid")),
    responses((status = 200, description = "Outgoing requests", body = [OutgoingRequest])),
    tags = ["friends"],
    operation_id = "sentFriendRequests"
)]
#[get("/friends/requests/sent/{user_id}")]
pub async fn sent_requests(
    state: web::Data<HttpState>,
    _viewer: OptionalUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<OutgoingRequest>>> {
    let user = subject_id(&path)?;
    let sent = state.friends.sent_by(user).await?;
    Ok(web::Json(sent.into_iter().map(Into::into).collect()))
}

/// Users the subject has no relation with.
#[utoipa::path(
    get,
    path = "/api/v1/friends/unfriends/{userId}",
    params(("userId" = String, Path, format = "uuid")),
    responses((status = 200, description = "Unrelated users", body = [Stranger])),
    tags = ["friends"],
    operation_id = "listUnfriends"
)]
#[get("/friends/unfriends/{user_id}")]
pub async fn unfriends(
    state: web::Data<HttpState>,
    _viewer: OptionalUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<Stranger>>> {
    let user = subject_id(&path)?;
    let strangers = state.friends.strangers_of(user).await?;
    Ok(web::Json(strangers.into_iter().map(Into::into).collect()))
}

/// Accepted friends of a user.
#[utoipa::path(
    get,
    path = "/api/v1/friends/list/{userId}",
    params(("userId" = String, Path, format = "uuid")),
    responses((status = 200, description = "Friends", body = [FriendListEntry])),
    tags = ["friends"],
    operation_id = "listFriends"
)]
#[get("/friends/list/{user_id}")]
pub async fn friend_list(
    state: web::Data<HttpState>,
    _viewer: OptionalUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<FriendListEntry>>> {
    let user = subject_id(&path)?;
    let friends = state.friends.friends_of(user).await?;
    Ok(web::Json(friends.into_iter().map(Into::into).collect()))
}

/// Remove a friendship the caller belongs to.
#[utoipa::path(
    delete,
    path = "/api/v1/friends/{id}",
    params(("id" = String, Path, format = "uuid")),
    responses(
        (status = 200, description = "Friend deleted", body = DeletedBody),
        (status = 403, description = "Caller is not a party", body = Error),
        (status = 404, description = "Unknown friendship", body = Error)
    ),
    tags = ["friends"],
    operation_id = "deleteFriend",
    security(("BearerToken" = []))
)]
#[delete("/friends/{id}")]
pub async fn delete_friend(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<DeletedBody>> {
    let id = friendship_id(&path)?;
    state.friends.remove(caller.principal(), id).await?;
    Ok(web::Json(DeletedBody::new("Friend deleted", id)))
}

#[cfg(test)]
#[path = "friends_tests.rs"]
mod tests;
