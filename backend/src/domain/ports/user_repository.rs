//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{NewUser, User, UserChanges, UserCredentials, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Username or e-mail already belongs to another user.
        Duplicate { field: String } => "user {field} already taken",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// All users, oldest first.
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Look a user up by lowercase e-mail or exact username, with their hash.
    async fn find_credentials(
        &self,
        identifier: &str,
    ) -> Result<Option<UserCredentials>, UserPersistenceError>;

    /// Insert a new account.
    async fn create(
        &self,
        user: &NewUser,
        now: DateTime<Utc>,
    ) -> Result<User, UserPersistenceError>;

    /// Apply partial changes; `None` when the user does not exist.
    async fn update(
        &self,
        id: UserId,
        changes: &UserChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Replace or clear the profile picture URL.
    async fn set_profile_picture(
        &self,
        id: UserId,
        url: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Delete a user and, through cascades, every relation referencing it.
    /// Returns the deleted row.
    async fn delete(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;
}
