//! Users API handlers.
//!
//! ```text
//! POST   /api/v1/users/login {"email":"ann@example.com","password":"secret"}
//! GET    /api/v1/users
//! POST   /api/v1/users {"username":"ann","email":"ann@example.com","password":"secret"}
//! GET    /api/v1/users/{id}
//! PUT    /api/v1/users/{id}
//! DELETE /api/v1/users/{id}
//! POST   /api/v1/users/{id}/upload-profile   (raw image body)
//! DELETE /api/v1/users/{id}/profile-picture
//! ```

use actix_web::{HttpMessage, HttpRequest, HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{ProfilePictureUpload, SignUpRequest, UpdateAccountRequest};
use crate::domain::{Error, LoginCredentials, User, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{AuthenticatedUser, OptionalUser};
use crate::inbound::http::schemas::{DeletedBody, MessageBody};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

/// Login request body for `POST /api/v1/users/login`.
///
/// `email` also accepts a username.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoginRequest {
    #[serde(default, alias = "username")]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Successful login payload.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    /// Bearer token for the `Authorization` header.
    pub token: String,
    pub user: User,
}

/// Sign-up request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SignUpBody {
    pub username: String,
    pub email: String,
    pub password: String,
    pub bio: Option<String>,
}

/// Account update body; absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateUserBody {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub bio: Option<String>,
}

/// Payload returned after a profile picture upload.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePictureBody {
    pub message: String,
    pub profile_picture: String,
}

fn user_id(raw: &str) -> Result<UserId, Error> {
    parse_id(raw, FieldName::new("id"))
}

/// Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/api/v1/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = LoginResponse),
        (status = 400, description = "Missing e-mail or password", body = Error),
        (status = 401, description = "Invalid credentials", body = Error)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/users/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<LoginResponse>> {
    let LoginRequest { email, password } = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(&email, &password)?;
    let outcome = state.accounts.login(credentials).await?;
    Ok(web::Json(LoginResponse {
        message: "Login successful".to_owned(),
        token: outcome.token,
        user: outcome.user,
    }))
}

/// List registered users.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Users", body = [User]),
        (status = 403, description = "Invalid token", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    _viewer: OptionalUser,
) -> ApiResult<web::Json<Vec<User>>> {
    Ok(web::Json(state.accounts.list_users().await?))
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = SignUpBody,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Username or e-mail taken", body = Error)
    ),
    tags = ["users"],
    operation_id = "signUp",
    security([])
)]
#[post("/users")]
pub async fn sign_up(
    state: web::Data<HttpState>,
    payload: web::Json<SignUpBody>,
) -> ApiResult<HttpResponse> {
    let SignUpBody {
        username,
        email,
        password,
        bio,
    } = payload.into_inner();
    let user = state
        .accounts
        .sign_up(SignUpRequest {
            username,
            email,
            password,
            bio,
        })
        .await?;
    Ok(HttpResponse::Created().json(user))
}

/// Fetch one user.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, format = "uuid")),
    responses(
        (status = 200, description = "User", body = User),
        (status = 400, description = "Malformed id", body = Error),
        (status = 404, description = "Unknown user", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    _viewer: OptionalUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<User>> {
    let id = user_id(&path)?;
    Ok(web::Json(state.accounts.get_user(id).await?))
}

/// Update the caller's own account.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, format = "uuid")),
    request_body = UpdateUserBody,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 401, description = "Missing or expired token", body = Error),
        (status = 403, description = "Not the caller's account", body = Error),
        (status = 409, description = "Username or e-mail taken", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUser",
    security(("BearerToken" = []))
)]
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<UpdateUserBody>,
) -> ApiResult<web::Json<User>> {
    let id = user_id(&path)?;
    let UpdateUserBody {
        username,
        email,
        password,
        bio,
    } = payload.into_inner();
    let request = UpdateAccountRequest {
        username,
        email,
        password,
        bio,
    };
    let user = state
        .accounts
        .update_user(caller.principal(), id, request)
        .await?;
    Ok(web::Json(user))
}

/// Delete the caller's own account.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, format = "uuid")),
    responses(
        (status = 200, description = "User deleted", body = DeletedBody),
        (status = 403, description = "Not the caller's account", body = Error),
        (status = 404, description = "Unknown user", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteUser",
    security(("BearerToken" = []))
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<DeletedBody>> {
    let id = user_id(&path)?;
    state.accounts.delete_user(caller.principal(), id).await?;
    Ok(web::Json(DeletedBody::new("User deleted", id)))
}

/// Replace the caller's profile picture with the raw image body.
#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/upload-profile",
    params(("id" = String, Path, format = "uuid")),
    request_body(content = Vec<u8>, content_type = "image/*"),
    responses(
        (status = 200, description = "Picture stored", body = ProfilePictureBody),
        (status = 400, description = "Empty body or not an image", body = Error),
        (status = 404, description = "Unknown user", body = Error),
        (status = 503, description = "Image host unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "uploadProfilePicture",
    security(("BearerToken" = []))
)]
#[post("/users/{id}/upload-profile")]
pub async fn upload_profile_picture(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    req: HttpRequest,
    body: web::Bytes,
) -> ApiResult<web::Json<ProfilePictureBody>> {
    let id = user_id(&path)?;
    let upload = ProfilePictureUpload {
        bytes: body.to_vec(),
        content_type: req.content_type().to_owned(),
    };
    let url = state
        .accounts
        .upload_profile_picture(caller.principal(), id, upload)
        .await?;
    Ok(web::Json(ProfilePictureBody {
        message: "Profile picture updated".to_owned(),
        profile_picture: url,
    }))
}

/// Clear the caller's profile picture.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}/profile-picture",
    params(("id" = String, Path, format = "uuid")),
    responses(
        (status = 200, description = "Picture removed", body = MessageBody),
        (status = 403, description = "Not the caller's account", body = Error)
    ),
    tags = ["users"],
    operation_id = "removeProfilePicture",
    security(("BearerToken" = []))
)]
#[delete("/users/{id}/profile-picture")]
pub async fn remove_profile_picture(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<MessageBody>> {
    let id = user_id(&path)?;
    state
        .accounts
        .remove_profile_picture(caller.principal(), id)
        .await?;
    Ok(web::Json(MessageBody::new("Profile picture removed")))
}

#[cfg(test)]
mod tests;
