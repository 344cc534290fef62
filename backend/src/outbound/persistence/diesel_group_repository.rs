//! PostgreSQL-backed `GroupRepository` implementation.
//!
//! Group creation (with the owner's admin membership) and group deletion run
//! in a transaction so a group never exists without its owner row and no
//! membership outlives its group.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use tracing::warn;
use uuid::Uuid;

use crate::domain::ports::{GroupPersistenceError, GroupRepository};
use crate::domain::{
    Group, GroupChanges, GroupId, GroupInvite, GroupMember, GroupRef, GroupRoster, Membership,
    MembershipId, MembershipRole, NewGroup, UserId,
};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error, pool_error_message};
use super::models::{GroupRow, GroupUpdate, MembershipRow, NewGroupRow};
use super::pool::{DbPool, PoolError};
use super::schema::{group_memberships, groups, users};

/// Diesel-backed implementation of the `GroupRepository` port.
#[derive(Clone)]
pub struct DieselGroupRepository {
    pool: DbPool,
}

impl DieselGroupRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> GroupPersistenceError {
    GroupPersistenceError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> GroupPersistenceError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => GroupPersistenceError::connection(message),
        DieselFailure::Query(message) => GroupPersistenceError::query(message),
        DieselFailure::UniqueViolation { .. } => {
            GroupPersistenceError::duplicate("user already has a membership in this group")
        }
        DieselFailure::ForeignKeyViolation { .. } => {
            GroupPersistenceError::missing_reference("user or group")
        }
    }
}

fn parse_role(raw: &str, row_id: Uuid) -> Result<MembershipRole, GroupPersistenceError> {
    raw.parse::<MembershipRole>().map_err(|error| {
        warn!(membership_id = %row_id, %error, "stored membership role is unknown");
        GroupPersistenceError::query("stored membership row is invalid")
    })
}

fn row_to_group(row: GroupRow) -> Group {
    Group {
        id: GroupId::from_uuid(row.id),
        name: row.name,
        description: row.description,
        owner_id: row.owner_id.map(UserId::from_uuid),
        is_private: row.is_private,
        image: row.image,
        created_at: row.created_at,
    }
}

fn row_to_membership(row: MembershipRow) -> Result<Membership, GroupPersistenceError> {
    Ok(Membership {
        id: MembershipId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        group_id: GroupId::from_uuid(row.group_id),
        role: parse_role(&row.role, row.id)?,
        created_at: row.created_at,
    })
}

fn membership_to_row(membership: &Membership) -> MembershipRow {
    MembershipRow {
        id: *membership.id.as_uuid(),
        user_id: *membership.user_id.as_uuid(),
        group_id: *membership.group_id.as_uuid(),
        role: membership.role.as_str().to_owned(),
        created_at: membership.created_at,
    }
}

fn changes_to_update(changes: &GroupChanges) -> GroupUpdate<'_> {
    GroupUpdate {
        name: changes.name.as_deref(),
        description: changes.description.as_deref(),
        is_private: changes.is_private,
        image: changes.image.as_deref(),
    }
}

type RosterRow = (Uuid, Uuid, String, Option<String>, String);

fn roster_member(row: RosterRow) -> Result<GroupMember, GroupPersistenceError> {
    let (membership_id, user_id, username, profile_picture, role) = row;
    Ok(GroupMember {
        membership_id: MembershipId::from_uuid(membership_id),
        user_id: UserId::from_uuid(user_id),
        username,
        profile_picture,
        role: parse_role(&role, membership_id)?,
    })
}

async fn find_group_row(
    conn: &mut AsyncPgConnection,
    id: Uuid,
) -> Result<Option<GroupRow>, diesel::result::Error> {
    groups::table
        .find(id)
        .select(GroupRow::as_select())
        .first(conn)
        .await
        .optional()
}

#[async_trait]
impl GroupRepository for DieselGroupRepository {
    async fn list_groups(&self) -> Result<Vec<Group>, GroupPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = groups::table
            .order((groups::created_at.desc(), groups::id.asc()))
            .select(GroupRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(row_to_group).collect())
    }

    async fn find_group(&self, id: GroupId) -> Result<Option<Group>, GroupPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = find_group_row(&mut conn, *id.as_uuid())
            .await
            .map_err(map_diesel_error)?;
        Ok(row.map(row_to_group))
    }

    async fn create_group(
        &self,
        group: &NewGroup,
        owner: Option<Membership>,
    ) -> Result<Group, GroupPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let conn: &mut AsyncPgConnection = &mut conn;
        let row = NewGroupRow {
            id: *group.id.as_uuid(),
            name: &group.name,
            description: group.description.as_deref(),
            owner_id: group.owner_id.map(|id| *id.as_uuid()),
            is_private: group.is_private,
            image: group.image.as_deref(),
            created_at: group.created_at,
        };
        let owner_row = owner.as_ref().map(membership_to_row);

        let stored = conn
            .transaction(|conn| {
                async move {
                    let stored = diesel::insert_into(groups::table)
                        .values(&row)
                        .returning(GroupRow::as_returning())
                        .get_result(conn)
                        .await?;
                    if let Some(owner_row) = owner_row {
                        diesel::insert_into(group_memberships::table)
                            .values(&owner_row)
                            .execute(conn)
                            .await?;
                    }
                    Ok(stored)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        Ok(row_to_group(stored))
    }

    async fn update_group(
        &self,
        id: GroupId,
        changes: &GroupChanges,
    ) -> Result<Option<Group>, GroupPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let update = changes_to_update(changes);
        let row = if update.is_empty() {
            find_group_row(&mut conn, *id.as_uuid()).await
        } else {
            diesel::update(groups::table.find(id.as_uuid()))
                .set(&update)
                .returning(GroupRow::as_returning())
                .get_result(&mut conn)
                .await
                .optional()
        }
        .map_err(map_diesel_error)?;
        Ok(row.map(row_to_group))
    }

    async fn delete_group(&self, id: GroupId) -> Result<bool, GroupPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let conn: &mut AsyncPgConnection = &mut conn;
        let group_id = *id.as_uuid();
        let deleted = conn
            .transaction(|conn| {
                async move {
                    diesel::delete(
                        group_memberships::table.filter(group_memberships::group_id.eq(group_id)),
                    )
                    .execute(conn)
                    .await?;
                    diesel::delete(groups::table.find(group_id))
                        .execute(conn)
                        .await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn groups_of(&self, user: UserId) -> Result<Vec<GroupRef>, GroupPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let active_memberships = group_memberships::table
            .filter(group_memberships::user_id.eq(*user.as_uuid()))
            .filter(group_memberships::role.ne(MembershipRole::Pending.as_str()))
            .select(group_memberships::group_id);
        let rows = groups::table
            .filter(
                groups::owner_id
                    .eq(user.as_uuid())
                    .or(groups::id.eq_any(active_memberships)),
            )
            .order((groups::name.asc(), groups::id.asc()))
            .select((groups::id, groups::name))
            .load::<(Uuid, String)>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows
            .into_iter()
            .map(|(id, name)| GroupRef {
                id: GroupId::from_uuid(id),
                name,
            })
            .collect())
    }

    async fn roster(&self, id: GroupId) -> Result<Option<GroupRoster>, GroupPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let Some(group) = find_group_row(&mut conn, *id.as_uuid())
            .await
            .map_err(map_diesel_error)?
        else {
            return Ok(None);
        };
        let rows = group_memberships::table
            .inner_join(users::table)
            .filter(group_memberships::group_id.eq(id.as_uuid()))
            .order((group_memberships::created_at.asc(), group_memberships::id.asc()))
            .select((
                group_memberships::id,
                users::id,
                users::username,
                users::profile_picture,
                group_memberships::role,
            ))
            .load::<RosterRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let members = rows
            .into_iter()
            .map(roster_member)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(GroupRoster {
            group_id: id,
            group_name: group.name,
            members,
        }))
    }

    async fn remove_member(
        &self,
        group: GroupId,
        user: UserId,
    ) -> Result<bool, GroupPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            group_memberships::table
                .filter(group_memberships::group_id.eq(group.as_uuid()))
                .filter(group_memberships::user_id.eq(user.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn list_memberships(&self) -> Result<Vec<Membership>, GroupPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = group_memberships::table
            .order(group_memberships::created_at.desc())
            .select(MembershipRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_membership).collect()
    }

    async fn find_membership(
        &self,
        id: MembershipId,
    ) -> Result<Option<Membership>, GroupPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        group_memberships::table
            .find(id.as_uuid())
            .select(MembershipRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_membership)
            .transpose()
    }

    async fn create_membership(
        &self,
        membership: &Membership,
    ) -> Result<Membership, GroupPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let stored = diesel::insert_into(group_memberships::table)
            .values(&membership_to_row(membership))
            .returning(MembershipRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_membership(stored)
    }

    async fn set_role(
        &self,
        id: MembershipId,
        role: MembershipRole,
    ) -> Result<Option<Membership>, GroupPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(group_memberships::table.find(id.as_uuid()))
            .set(group_memberships::role.eq(role.as_str()))
            .returning(MembershipRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_membership)
            .transpose()
    }

    async fn delete_membership(&self, id: MembershipId) -> Result<bool, GroupPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(group_memberships::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn pending_invites(
        &self,
        user: UserId,
    ) -> Result<Vec<GroupInvite>, GroupPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = group_memberships::table
            .inner_join(groups::table)
            .filter(group_memberships::user_id.eq(user.as_uuid()))
            .filter(group_memberships::role.eq(MembershipRole::Pending.as_str()))
            .order(group_memberships::created_at.desc())
            .select((group_memberships::id, groups::id, groups::name))
            .load::<(Uuid, Uuid, String)>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows
            .into_iter()
            .map(|(membership_id, group_id, group_name)| GroupInvite {
                membership_id: MembershipId::from_uuid(membership_id),
                group_id: GroupId::from_uuid(group_id),
                group_name,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use diesel::result::{DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;

    #[rstest]
    fn memberships_round_trip_through_rows() {
        let membership = Membership::new(
            UserId::random(),
            GroupId::random(),
            MembershipRole::Moderator,
            Utc::now(),
        );
        let row = membership_to_row(&membership);
        assert_eq!(row.role, "moderator");
        assert_eq!(row_to_membership(row).expect("valid row"), membership);
    }

    #[rstest]
    fn roster_rows_with_unknown_roles_are_rejected() {
        let row: RosterRow = (
            Uuid::new_v4(),
            Uuid::new_v4(),
            "ann".to_owned(),
            None,
            "overlord".to_owned(),
        );
        assert!(matches!(
            roster_member(row),
            Err(GroupPersistenceError::Query { .. })
        ));
    }

    #[rstest]
    fn empty_changes_produce_an_empty_changeset() {
        assert!(changes_to_update(&GroupChanges::default()).is_empty());
        let changes = GroupChanges {
            is_private: Some(true),
            ..GroupChanges::default()
        };
        assert!(!changes_to_update(&changes).is_empty());
    }

    #[rstest]
    #[case(
        DatabaseErrorKind::UniqueViolation,
        GroupPersistenceError::duplicate("user already has a membership in this group")
    )]
    #[case(
        DatabaseErrorKind::ForeignKeyViolation,
        GroupPersistenceError::missing_reference("user or group")
    )]
    fn violations_map_to_port_errors(
        #[case] kind: DatabaseErrorKind,
        #[case] expected: GroupPersistenceError,
    ) {
        let error = map_diesel_error(DieselError::DatabaseError(kind, Box::new("x".to_owned())));
        assert_eq!(error, expected);
    }
}
