//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. The
//! `diesel print-schema` command can regenerate them from a live database.

diesel::table! {
    /// Registered accounts. `username` and `email` are unique; e-mail is
    /// stored lowercase.
    users (id) {
        id -> Uuid,
        username -> Varchar,
        email -> Text,
        password_hash -> Text,
        bio -> Nullable<Varchar>,
        profile_picture -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Directed friend requests, unique per unordered user pair.
    friendships (id) {
        id -> Uuid,
        requester_id -> Uuid,
        recipient_id -> Uuid,
        /// `pending`, `accepted`, `refused` or `blocked`.
        status -> Text,
        requested_at -> Timestamptz,
        responded_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    groups (id) {
        id -> Uuid,
        name -> Varchar,
        description -> Nullable<Varchar>,
        owner_id -> Nullable<Uuid>,
        is_private -> Bool,
        image -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// One row per (user, group); role `pending` marks an open invitation.
    group_memberships (id) {
        id -> Uuid,
        user_id -> Uuid,
        group_id -> Uuid,
        role -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Journeys with an optional hidden target for the guessing game.
    journeys (id) {
        id -> Uuid,
        name -> Varchar,
        description -> Varchar,
        town -> Nullable<Varchar>,
        image -> Nullable<Text>,
        target_lat -> Nullable<Float8>,
        target_lng -> Nullable<Float8>,
        group_id -> Nullable<Uuid>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    steps (id) {
        id -> Uuid,
        journey_id -> Uuid,
        position -> Int4,
        title -> Varchar,
        description -> Nullable<Varchar>,
        riddle -> Nullable<Varchar>,
        lat -> Float8,
        lng -> Float8,
        image -> Nullable<Text>,
        accuracy -> Nullable<Float8>,
        altitude -> Nullable<Float8>,
        speed -> Nullable<Float8>,
        note -> Nullable<Varchar>,
        recorded_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    participations (id) {
        id -> Uuid,
        user_id -> Uuid,
        journey_id -> Uuid,
        /// `invited`, `accepted`, `declined` or `completed`.
        status -> Text,
        invited_at -> Timestamptz,
        responded_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Journeys saved by users, unique per (user, journey).
    user_journeys (id) {
        id -> Uuid,
        user_id -> Uuid,
        journey_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    ratings (id) {
        id -> Uuid,
        user_id -> Uuid,
        journey_id -> Uuid,
        value -> Int2,
        comment -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Best result per (user, journey).
    scores (id) {
        id -> Uuid,
        user_id -> Uuid,
        journey_id -> Uuid,
        participation_id -> Nullable<Uuid>,
        score -> Int4,
        time_seconds -> Int4,
        distance_meters -> Float8,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(friendships -> users (requester_id));
diesel::joinable!(group_memberships -> groups (group_id));
diesel::joinable!(group_memberships -> users (user_id));
diesel::joinable!(journeys -> groups (group_id));
diesel::joinable!(steps -> journeys (journey_id));
diesel::joinable!(participations -> journeys (journey_id));
diesel::joinable!(participations -> users (user_id));
diesel::joinable!(user_journeys -> journeys (journey_id));
diesel::joinable!(user_journeys -> users (user_id));
diesel::joinable!(ratings -> journeys (journey_id));
diesel::joinable!(ratings -> users (user_id));
diesel::joinable!(scores -> journeys (journey_id));
diesel::joinable!(scores -> users (user_id));
diesel::joinable!(scores -> participations (participation_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    friendships,
    groups,
    group_memberships,
    journeys,
    steps,
    participations,
    user_journeys,
    ratings,
    scores,
);
