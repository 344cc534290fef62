//! Account management and login.
//!
//! Implements [`UserAccounts`] on top of the user repository, the password
//! hasher, the token service and the image host. Callers may only modify
//! their own account.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    ImageHost, ImageHostError, ImageUpload, LoginOutcome, PasswordHashError, PasswordHasher,
    ProfilePictureUpload, SignUpRequest, TokenError, TokenService, UpdateAccountRequest,
    UserAccounts, UserPersistenceError, UserRepository,
};
use crate::domain::user::bio;
use crate::domain::{
    EmailAddress, Error, LoginCredentials, NewUser, Password, Principal, User, UserChanges,
    UserId, Username,
};

/// Folder that profile pictures are uploaded into.
pub const PROFILE_PICTURE_FOLDER: &str = "profile_pictures";

const INVALID_CREDENTIALS: &str = "Invalid credentials";

pub(crate) fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::Duplicate { field } => {
            Error::conflict(format!("{field} already taken")).with_details(json!({
                "field": field,
                "code": "duplicate",
            }))
        }
    }
}

fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(format!("password hashing failed: {error}"))
}

fn map_image_error(error: ImageHostError) -> Error {
    match error {
        ImageHostError::NotConfigured => {
            Error::service_unavailable("image uploads are not configured")
        }
        ImageHostError::Transport { message } => {
            Error::service_unavailable(format!("image host unavailable: {message}"))
        }
        ImageHostError::Rejected { message } => {
            Error::invalid_request(format!("image rejected: {message}"))
        }
    }
}

fn ensure_self(caller: &Principal, id: UserId) -> Result<(), Error> {
    if caller.is(id) {
        Ok(())
    } else {
        Err(Error::forbidden("You can only modify your own account"))
    }
}

fn user_not_found() -> Error {
    Error::not_found("User not found")
}

/// Account service implementing [`UserAccounts`].
#[derive(Clone)]
pub struct UserAccountService<R> {
    users: Arc<R>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
    images: Arc<dyn ImageHost>,
    clock: Arc<dyn Clock>,
}

impl<R> UserAccountService<R> {
    /// Create the service from its collaborators.
    pub fn new(
        users: Arc<R>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenService>,
        images: Arc<dyn ImageHost>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            images,
            clock,
        }
    }
}

impl<R> UserAccountService<R>
where
    R: UserRepository,
{
    async fn existing(&self, id: UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(user_not_found)
    }

    /// Remove a hosted picture; failures are logged and swallowed.
    async fn discard_picture(&self, url: &str) {
        let Some(public_id) = self.images.public_id_from_url(url) else {
            return;
        };
        if let Err(error) = self.images.destroy(&public_id).await {
            warn!(%public_id, %error, "failed to delete hosted profile picture");
        }
    }

    async fn changes_from(&self, request: UpdateAccountRequest) -> Result<UserChanges, Error> {
        let username = request.username.map(Username::new).transpose()?;
        let email = request.email.map(EmailAddress::new).transpose()?;
        let password_hash = match request.password {
            Some(raw) => {
                let password = Password::new(&raw)?;
                Some(
                    self.hasher
                        .hash(password.expose())
                        .await
                        .map_err(map_hash_error)?,
                )
            }
            None => None,
        };
        Ok(UserChanges {
            username,
            email,
            password_hash,
            bio: bio(request.bio.as_deref())?,
        })
    }
}

#[async_trait]
impl<R> UserAccounts for UserAccountService<R>
where
    R: UserRepository,
{
    async fn login(&self, credentials: LoginCredentials) -> Result<LoginOutcome, Error> {
        let Some(stored) = self
            .users
            .find_credentials(credentials.identifier())
            .await
            .map_err(map_user_error)?
        else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        let matches = self
            .hasher
            .verify(credentials.password(), &stored.password_hash)
            .await
            .map_err(map_hash_error)?;
        if !matches {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        let principal = Principal {
            user_id: stored.user.id,
            email: stored.user.email.to_string(),
        };
        let token = self
            .tokens
            .issue(&principal)
            .map_err(|error: TokenError| Error::internal(error.to_string()))?;
        info!(user_id = %principal.user_id, "user logged in");
        Ok(LoginOutcome {
            token,
            user: stored.user,
        })
    }

    async fn list_users(&self) -> Result<Vec<User>, Error> {
        self.users.list().await.map_err(map_user_error)
    }

    async fn get_user(&self, id: UserId) -> Result<User, Error> {
        self.existing(id).await
    }

    async fn sign_up(&self, request: SignUpRequest) -> Result<User, Error> {
        let username = Username::new(request.username)?;
        let email = EmailAddress::new(&request.email)?;
        let password = Password::new(&request.password)?;
        let bio = bio(request.bio.as_deref())?;
        let password_hash = self
            .hasher
            .hash(password.expose())
            .await
            .map_err(map_hash_error)?;

        let new_user = NewUser {
            id: UserId::random(),
            username,
            email,
            password_hash,
            bio,
        };
        let user = self
            .users
            .create(&new_user, self.clock.utc())
            .await
            .map_err(map_user_error)?;
        info!(user_id = %user.id, "user signed up");
        Ok(user)
    }

    async fn update_user(
        &self,
        caller: &Principal,
        id: UserId,
        request: UpdateAccountRequest,
    ) -> Result<User, Error> {
        ensure_self(caller, id)?;
        let changes = self.changes_from(request).await?;
        if changes.is_empty() {
            return self.existing(id).await;
        }
        self.users
            .update(id, &changes, self.clock.utc())
            .await
            .map_err(map_user_error)?
            .ok_or_else(user_not_found)
    }

    async fn delete_user(&self, caller: &Principal, id: UserId) -> Result<(), Error> {
        ensure_self(caller, id)?;
        let deleted = self
            .users
            .delete(id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(user_not_found)?;
        if let Some(url) = deleted.profile_picture.as_deref() {
            self.discard_picture(url).await;
        }
        info!(user_id = %id, "user deleted");
        Ok(())
    }

    async fn upload_profile_picture(
        &self,
        caller: &Principal,
        id: UserId,
        upload: ProfilePictureUpload,
    ) -> Result<String, Error> {
        ensure_self(caller, id)?;
        if upload.bytes.is_empty() {
            return Err(Error::invalid_request("No image provided").with_details(json!({
                "field": "image",
                "code": "missing_field",
            })));
        }
        if !upload.content_type.starts_with("image/") {
            return Err(Error::invalid_request("Only image uploads are accepted")
                .with_details(json!({
                    "field": "image",
                    "value": upload.content_type,
                    "code": "invalid_format",
                })));
        }
        let previous = self.existing(id).await?.profile_picture;

        let hosted = self
            .images
            .upload(ImageUpload {
                bytes: upload.bytes,
                content_type: upload.content_type,
                folder: PROFILE_PICTURE_FOLDER.to_owned(),
            })
            .await
            .map_err(map_image_error)?;
        self.users
            .set_profile_picture(id, Some(hosted.url.clone()), self.clock.utc())
            .await
            .map_err(map_user_error)?
            .ok_or_else(user_not_found)?;

        if let Some(old) = previous.as_deref().filter(|old| *old != hosted.url) {
            self.discard_picture(old).await;
        }
        Ok(hosted.url)
    }

    async fn remove_profile_picture(&self, caller: &Principal, id: UserId) -> Result<(), Error> {
        ensure_self(caller, id)?;
        let previous = self.existing(id).await?.profile_picture;
        self.users
            .set_profile_picture(id, None, self.clock.utc())
            .await
            .map_err(map_user_error)?
            .ok_or_else(user_not_found)?;
        if let Some(old) = previous.as_deref() {
            self.discard_picture(old).await;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "user_account_service_tests.rs"]
mod tests;
