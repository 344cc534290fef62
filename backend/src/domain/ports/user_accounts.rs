//! Driving port for account management and authentication.
//!
//! Inbound adapters call this port with raw, unvalidated fields; the domain
//! service validates them, talks to persistence and the password hasher,
//! and enforces that callers only touch their own account.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, Principal, User, UserId};

/// Raw sign-up fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub bio: Option<String>,
}

/// Raw account update fields. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateAccountRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub bio: Option<String>,
}

/// Image bytes received for a profile picture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfilePictureUpload {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Successful login: a bearer token and the authenticated user.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginOutcome {
    pub token: String,
    pub user: User,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAccounts: Send + Sync {
    /// Verify credentials and issue a token.
    async fn login(&self, credentials: LoginCredentials) -> Result<LoginOutcome, Error>;

    /// Every account.
    async fn list_users(&self) -> Result<Vec<User>, Error>;

    /// One account, or `not_found`.
    async fn get_user(&self, id: UserId) -> Result<User, Error>;

    /// Register a new account.
    async fn sign_up(&self, request: SignUpRequest) -> Result<User, Error>;

    /// Update the caller's own account.
    async fn update_user(
        &self,
        caller: &Principal,
        id: UserId,
        request: UpdateAccountRequest,
    ) -> Result<User, Error>;

    /// Delete the caller's own account and its hosted picture.
    async fn delete_user(&self, caller: &Principal, id: UserId) -> Result<(), Error>;

    /// Replace the caller's profile picture; returns the new URL.
    async fn upload_profile_picture(
        &self,
        caller: &Principal,
        id: UserId,
        upload: ProfilePictureUpload,
    ) -> Result<String, Error>;

    /// Remove the caller's profile picture.
    async fn remove_profile_picture(&self, caller: &Principal, id: UserId) -> Result<(), Error>;
}
