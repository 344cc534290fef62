//! Groups of users and their memberships.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::macros::define_text_enum;
use super::validation::{optional_text, required_text, FieldError};
use super::{GroupId, MembershipId, UserId};

/// Maximum group name length.
pub const GROUP_NAME_MAX: usize = 100;
/// Maximum group description length.
pub const GROUP_DESCRIPTION_MAX: usize = 500;

define_text_enum! {
    /// Role of a user inside a group. `Pending` marks an unanswered invite.
    pub enum MembershipRole ("role") {
        Admin => "admin",
        Moderator => "moderator",
        Member => "member",
        Pending => "pending",
    }
}

impl MembershipRole {
    /// Whether the role counts as belonging to the group.
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Stored group.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    #[schema(value_type = String, format = "uuid")]
    pub id: GroupId,
    pub name: String,
    pub description: Option<String>,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub owner_id: Option<UserId>,
    pub is_private: bool,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Validated group creation payload.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGroup {
    pub id: GroupId,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: Option<UserId>,
    pub is_private: bool,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Raw group fields supplied by a caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupDraft {
    pub name: String,
    pub description: Option<String>,
    pub owner_id: Option<UserId>,
    pub is_private: Option<bool>,
    pub image: Option<String>,
}

impl NewGroup {
    /// Validate a draft into a new group stamped at `created_at`.
    pub fn try_from_draft(
        draft: GroupDraft,
        created_at: DateTime<Utc>,
    ) -> Result<Self, FieldError> {
        Ok(Self {
            id: GroupId::random(),
            name: required_text("name", &draft.name, GROUP_NAME_MAX)?,
            description: optional_text(
                "description",
                draft.description.as_deref(),
                GROUP_DESCRIPTION_MAX,
            )?,
            owner_id: draft.owner_id,
            is_private: draft.is_private.unwrap_or(false),
            image: optional_text("image", draft.image.as_deref(), usize::MAX)?,
            created_at,
        })
    }
}

/// Partial group update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_private: Option<bool>,
    pub image: Option<String>,
}

/// Raw partial group fields supplied by a caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_private: Option<bool>,
    pub image: Option<String>,
}

impl GroupChanges {
    /// Validate optional replacement values.
    pub fn try_from_patch(patch: GroupPatch) -> Result<Self, FieldError> {
        Ok(Self {
            name: patch
                .name
                .map(|value| required_text("name", &value, GROUP_NAME_MAX))
                .transpose()?,
            description: optional_text(
                "description",
                patch.description.as_deref(),
                GROUP_DESCRIPTION_MAX,
            )?,
            is_private: patch.is_private,
            image: optional_text("image", patch.image.as_deref(), usize::MAX)?,
        })
    }
}

/// Stored membership row.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    #[schema(value_type = String, format = "uuid")]
    pub id: MembershipId,
    #[schema(value_type = String, format = "uuid")]
    pub user_id: UserId,
    #[schema(value_type = String, format = "uuid")]
    pub group_id: GroupId,
    pub role: MembershipRole,
    pub created_at: DateTime<Utc>,
}

impl Membership {
    /// Build a new membership row.
    pub fn new(
        user_id: UserId,
        group_id: GroupId,
        role: MembershipRole,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: MembershipId::random(),
            user_id,
            group_id,
            role,
            created_at,
        }
    }
}

/// Member of a group joined with their profile.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMember {
    pub membership_id: MembershipId,
    pub user_id: UserId,
    pub username: String,
    pub profile_picture: Option<String>,
    pub role: MembershipRole,
}

/// Group with its full member list.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRoster {
    pub group_id: GroupId,
    pub group_name: String,
    pub members: Vec<GroupMember>,
}

/// Pending invitation joined with the inviting group's name.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupInvite {
    pub membership_id: MembershipId,
    pub group_id: GroupId,
    pub group_name: String,
}

/// Identifier and name of a group a user belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct GroupRef {
    #[schema(value_type = String, format = "uuid")]
    pub id: GroupId,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn drafts_trim_and_default() {
        let group = NewGroup::try_from_draft(
            GroupDraft {
                name: "  Hikers  ".into(),
                description: Some("   ".into()),
                ..GroupDraft::default()
            },
            Utc::now(),
        )
        .expect("valid draft");
        assert_eq!(group.name, "Hikers");
        assert_eq!(group.description, None);
        assert!(!group.is_private);
    }

    #[rstest]
    #[case("", "name")]
    #[case("   ", "name")]
    fn drafts_require_a_name(#[case] name: &str, #[case] field: &str) {
        let err = NewGroup::try_from_draft(
            GroupDraft {
                name: name.into(),
                ..GroupDraft::default()
            },
            Utc::now(),
        )
        .expect_err("missing name");
        assert_eq!(err.field(), field);
    }

    #[rstest]
    fn overlong_names_are_rejected() {
        let name = "x".repeat(GROUP_NAME_MAX + 1);
        let patch = GroupPatch {
            name: Some(name),
            ..GroupPatch::default()
        };
        let err = GroupChanges::try_from_patch(patch).expect_err("too long");
        assert_eq!(
            err,
            FieldError::TooLong {
                field: "name",
                max: GROUP_NAME_MAX
            }
        );
    }

    #[rstest]
    #[case(MembershipRole::Admin, true)]
    #[case(MembershipRole::Member, true)]
    #[case(MembershipRole::Pending, false)]
    fn pending_roles_are_not_active(#[case] role: MembershipRole, #[case] active: bool) {
        assert_eq!(role.is_active(), active);
    }
}
