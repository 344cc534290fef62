//! Domain primitives, aggregates and services.
//!
//! Purpose: define the strongly typed entities of the journey game and the
//! services enforcing its relationship rules. Types are validated on
//! construction; services map port failures into the transport-agnostic
//! [`Error`].
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable error identifier.
//! - Entities: users, friendships, groups, journeys, steps, participations,
//!   ratings, scores.
//! - `geo`: distance and guess scoring.
//! - Services implementing the driving ports in [`ports`].

pub mod error;
pub mod geo;
pub mod ports;

mod auth;
mod friendship;
mod group;
mod ids;
mod journey;
mod leaderboard;
mod location;
mod macros;
mod participation;
mod rating;
mod score;
mod step;
mod trace_id;
mod user;
mod validation;

#[cfg(test)]
mod service_test_support;

mod enrolment_service;
mod friendship_service;
mod group_service;
mod journey_service;
mod rating_service;
mod score_service;
mod user_account_service;

pub use self::auth::{LoginCredentials, PASSWORD_MAX, PASSWORD_MIN, Password, Principal};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::friendship::{
    FriendEntry, FriendRequest, Friendship, FriendshipStatus, PendingFriendRequest,
};
pub use self::group::{
    GROUP_DESCRIPTION_MAX, GROUP_NAME_MAX, Group, GroupChanges, GroupDraft, GroupInvite,
    GroupMember, GroupPatch, GroupRef, GroupRoster, Membership, MembershipRole, NewGroup,
};
pub use self::ids::{
    FriendshipId, GroupId, JourneyId, MembershipId, ParticipationId, RatingId, ScoreId, StepId,
    UserId, UserJourneyId,
};
pub use self::journey::{
    JOURNEY_DESCRIPTION_MAX, JOURNEY_NAME_MAX, Journey, JourneyChanges, JourneyDraft,
    JourneyPatch, NewJourney, TOWN_MAX,
};
pub use self::leaderboard::{
    Highlight, Leaderboard, LeaderboardEntry, LeaderboardRow, PODIUM_SIZE, build_leaderboard,
    rank_rows,
};
pub use self::location::{
    DEFAULT_ROOM_CAPACITY, DEFAULT_ROOM_USERNAME, LocationUpdate, ROOM_NAME_MAX, RoomName,
    room_username,
};
pub use self::participation::{
    AudienceMember, JourneyAudience, Participation, ParticipationFilter, ParticipationStatus,
    UserJourney, UserJourneyRow, group_by_journey, responded_at_for,
};
pub use self::rating::{
    COMMENT_MAX, RATING_MAX, RATING_MIN, Rating, RatingAverage, RatingEntry, RatingFilter,
    RatingSubmission, RatingValue,
};
pub use self::score::{
    BestScore, JourneyScoreEntry, Score, ScoreCategories, ScoreCategory, ScoreChanges,
    ScoreFilter, ScoreSubmission, ScoreTotals, SummaryFilter, SummaryWindow, UserScoreEntry,
    UserScoreTotals, apply_best_score,
};
pub use self::step::{
    NOTE_MAX, NewStep, RIDDLE_MAX, STEP_DESCRIPTION_MAX, STEP_TITLE_MAX, Step, StepChanges,
    StepDraft, StepPatch, StepReadings,
};
pub use self::trace_id::TraceId;
pub use self::user::{
    BIO_MAX, EmailAddress, NewUser, USERNAME_MAX, USERNAME_MIN, User, UserChanges,
    UserCredentials, UserSummary, Username,
};
pub use self::validation::FieldError;

pub use self::enrolment_service::EnrolmentService;
pub use self::friendship_service::FriendshipService;
pub use self::group_service::GroupService;
pub use self::journey_service::JourneyService;
pub use self::rating_service::RatingService;
pub use self::score_service::ScoreService;
pub use self::user_account_service::{PROFILE_PICTURE_FOLDER, UserAccountService};

