//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{
    friendships, group_memberships, groups, journeys, participations, ratings, scores, steps,
    user_journeys, users,
};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public columns of a user embedded in relation listings.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserSummaryRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub profile_picture: Option<String>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub bio: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset for partial account updates; `None` columns are left alone.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserUpdate<'a> {
    pub username: Option<&'a str>,
    pub email: Option<&'a str>,
    pub password_hash: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Friendships
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = friendships)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct FriendshipRow {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub recipient_id: Uuid,
    pub status: String,
    pub requested_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Groups and memberships
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = groups)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct GroupRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: Option<Uuid>,
    pub is_private: bool,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = groups)]
pub(crate) struct NewGroupRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub owner_id: Option<Uuid>,
    pub is_private: bool,
    pub image: Option<&'a str>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = groups)]
pub(crate) struct GroupUpdate<'a> {
    pub name: Option<&'a str>,
    pub description: Option<&'a str>,
    pub is_private: Option<bool>,
    pub image: Option<&'a str>,
}

impl GroupUpdate<'_> {
    /// True when the changeset would not touch any column.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.is_private.is_none()
            && self.image.is_none()
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = group_memberships)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MembershipRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub group_id: Uuid,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Journeys and steps
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = journeys)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct JourneyRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub town: Option<String>,
    pub image: Option<String>,
    pub target_lat: Option<f64>,
    pub target_lng: Option<f64>,
    pub group_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = journeys)]
pub(crate) struct NewJourneyRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub description: &'a str,
    pub town: Option<&'a str>,
    pub image: Option<&'a str>,
    pub target_lat: Option<f64>,
    pub target_lng: Option<f64>,
    pub group_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = journeys)]
pub(crate) struct JourneyUpdate<'a> {
    pub name: Option<&'a str>,
    pub description: Option<&'a str>,
    pub town: Option<&'a str>,
    pub image: Option<&'a str>,
    pub target_lat: Option<f64>,
    pub target_lng: Option<f64>,
    pub group_id: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = steps)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct StepRow {
    pub id: Uuid,
    pub journey_id: Uuid,
    pub position: i32,
    pub title: String,
    pub description: Option<String>,
    pub riddle: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub image: Option<String>,
    pub accuracy: Option<f64>,
    pub altitude: Option<f64>,
    pub speed: Option<f64>,
    pub note: Option<String>,
    pub recorded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = steps)]
pub(crate) struct NewStepRow<'a> {
    pub id: Uuid,
    pub journey_id: Uuid,
    pub position: i32,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub riddle: Option<&'a str>,
    pub lat: f64,
    pub lng: f64,
    pub image: Option<&'a str>,
    pub accuracy: Option<f64>,
    pub altitude: Option<f64>,
    pub speed: Option<f64>,
    pub note: Option<&'a str>,
    pub recorded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = steps)]
pub(crate) struct StepUpdate<'a> {
    pub position: Option<i32>,
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub riddle: Option<&'a str>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub image: Option<&'a str>,
    pub accuracy: Option<f64>,
    pub altitude: Option<f64>,
    pub speed: Option<f64>,
    pub note: Option<&'a str>,
    pub recorded_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Enrolment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = participations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ParticipationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub journey_id: Uuid,
    pub status: String,
    pub invited_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

/// A journey saved by a user.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = user_journeys)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserJourneyLinkRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub journey_id: Uuid,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Ratings and scores
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = ratings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RatingRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub journey_id: Uuid,
    pub value: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = ratings)]
pub(crate) struct NewRatingRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub journey_id: Uuid,
    pub value: i16,
    pub comment: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = scores)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ScoreRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub journey_id: Uuid,
    pub participation_id: Option<Uuid>,
    pub score: i32,
    pub time_seconds: i32,
    pub distance_meters: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset overwriting the mutable columns of a score.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = scores)]
pub(crate) struct ScoreUpdate {
    pub score: Option<i32>,
    pub time_seconds: Option<i32>,
    pub distance_meters: Option<f64>,
    pub participation_id: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}

impl UserSummaryRow {
    pub fn into_summary(self) -> crate::domain::UserSummary {
        crate::domain::UserSummary {
            id: crate::domain::UserId::from_uuid(self.id),
            username: self.username,
            email: self.email,
            profile_picture: self.profile_picture,
        }
    }
}
