//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{
    EmailAddress, NewUser, User, UserChanges, UserCredentials, UserId, Username,
};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error, pool_error_message};
use super::models::{NewUserRow, UserRow, UserUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    UserPersistenceError::connection(pool_error_message(error))
}

/// Name the user column behind a unique violation.
fn duplicate_field(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some(name) if name.contains("username") => "username",
        Some(name) if name.contains("email") => "email",
        _ => "username or email",
    }
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => UserPersistenceError::connection(message),
        failure @ DieselFailure::UniqueViolation { .. } => {
            UserPersistenceError::duplicate(duplicate_field(failure.constraint()))
        }
        DieselFailure::Query(message) => UserPersistenceError::query(message),
        DieselFailure::ForeignKeyViolation { .. } => {
            UserPersistenceError::query("foreign key violation")
        }
    }
}

fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let username = Username::new(row.username).map_err(|error| {
        warn!(user_id = %row.id, %error, "stored username fails validation");
        UserPersistenceError::query("stored user row is invalid")
    })?;
    let email = EmailAddress::new(&row.email).map_err(|error| {
        warn!(user_id = %row.id, %error, "stored e-mail fails validation");
        UserPersistenceError::query("stored user row is invalid")
    })?;
    Ok(User {
        id: UserId::from_uuid(row.id),
        username,
        email,
        bio: row.bio,
        profile_picture: row.profile_picture,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn row_to_credentials(row: UserRow) -> Result<UserCredentials, UserPersistenceError> {
    let password_hash = row.password_hash.clone();
    Ok(UserCredentials {
        user: row_to_user(row)?,
        password_hash,
    })
}

fn rows_to_users(rows: Vec<UserRow>) -> Result<Vec<User>, UserPersistenceError> {
    rows.into_iter().map(row_to_user).collect()
}

fn changes_to_update(changes: &UserChanges, now: DateTime<Utc>) -> UserUpdate<'_> {
    UserUpdate {
        username: changes.username.as_ref().map(AsRef::as_ref),
        email: changes.email.as_ref().map(AsRef::as_ref),
        password_hash: changes.password_hash.as_deref(),
        bio: changes.bio.as_deref(),
        updated_at: now,
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = users::table
            .order((users::created_at.asc(), users::id.asc()))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_users(rows)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_user)
            .transpose()
    }

    async fn find_credentials(
        &self,
        identifier: &str,
    ) -> Result<Option<UserCredentials>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let email = identifier.trim().to_lowercase();
        users::table
            .filter(users::email.eq(email).or(users::username.eq(identifier.trim())))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_credentials)
            .transpose()
    }

    async fn create(&self, user: &NewUser, now: DateTime<Utc>) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewUserRow {
            id: *user.id.as_uuid(),
            username: user.username.as_ref(),
            email: user.email.as_ref(),
            password_hash: &user.password_hash,
            bio: user.bio.as_deref(),
            created_at: now,
            updated_at: now,
        };
        let stored = diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_user(stored)
    }

    async fn update(
        &self,
        id: UserId,
        changes: &UserChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(users::table.find(id.as_uuid()))
            .set(&changes_to_update(changes, now))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_user)
            .transpose()
    }

    async fn set_profile_picture(
        &self,
        id: UserId,
        url: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(users::table.find(id.as_uuid()))
            .set((users::profile_picture.eq(url), users::updated_at.eq(now)))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_user)
            .transpose()
    }

    async fn delete(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(users::table.find(id.as_uuid()))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_user)
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::result::{DatabaseErrorKind, Error as DieselError};
    use rstest::{fixture, rstest};
    use uuid::Uuid;

    #[fixture]
    fn row() -> UserRow {
        let now = Utc::now();
        UserRow {
            id: Uuid::new_v4(),
            username: "ann_42".to_owned(),
            email: "ann@example.com".to_owned(),
            password_hash: "$argon2id$stub".to_owned(),
            bio: Some("hiker".to_owned()),
            profile_picture: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    fn converts_rows_without_leaking_the_hash(row: UserRow) {
        let id = row.id;
        let credentials = row_to_credentials(row).expect("valid row");
        assert_eq!(credentials.user.id, UserId::from_uuid(id));
        assert_eq!(credentials.user.username.as_ref(), "ann_42");
        assert_eq!(credentials.password_hash, "$argon2id$stub");
    }

    #[rstest]
    fn corrupt_rows_surface_as_query_errors(mut row: UserRow) {
        row.username = "no spaces allowed".to_owned();
        assert!(matches!(
            row_to_user(row),
            Err(UserPersistenceError::Query { .. })
        ));
    }

    #[rstest]
    #[case(Some("users_username_key"), "username")]
    #[case(Some("users_email_key"), "email")]
    #[case(None, "username or email")]
    fn names_the_duplicated_column(#[case] constraint: Option<&str>, #[case] field: &str) {
        assert_eq!(duplicate_field(constraint), field);
    }

    #[rstest]
    fn unique_violations_map_to_duplicate() {
        let error = map_diesel_error(DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key".to_owned()),
        ));
        assert_eq!(error, UserPersistenceError::duplicate("username or email"));
    }

    #[rstest]
    fn pool_errors_map_to_connection() {
        let error = map_pool_error(PoolError::checkout("refused"));
        assert_eq!(error, UserPersistenceError::connection("refused"));
    }

    #[rstest]
    fn changesets_only_carry_supplied_columns() {
        let changes = UserChanges {
            bio: Some("new bio".to_owned()),
            ..UserChanges::default()
        };
        let update = changes_to_update(&changes, Utc::now());
        assert_eq!(update.bio, Some("new bio"));
        assert!(update.username.is_none());
        assert!(update.email.is_none());
        assert!(update.password_hash.is_none());
    }
}
