//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories and collaborators) are implemented by
//! outbound adapters; driving ports (use-case traits) are implemented by
//! domain services and called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod enrolment_repository;
mod friend_network;
mod friendship_repository;
mod group_directory;
mod group_repository;
mod image_host;
mod journey_catalogue;
mod journey_enrolment;
mod journey_ratings;
mod journey_repository;
mod location_rooms;
mod password_hasher;
mod rating_repository;
mod score_board;
mod score_repository;
mod token_service;
mod user_accounts;
mod user_repository;

#[cfg(test)]
pub use enrolment_repository::{MockParticipationRepository, MockUserJourneyRepository};
pub use enrolment_repository::{
    EnrolmentPersistenceError, ParticipationRepository, UserJourneyRepository,
};
#[cfg(test)]
pub use friend_network::MockFriendNetwork;
pub use friend_network::{FriendNetwork, FriendResponse};
#[cfg(test)]
pub use friendship_repository::MockFriendshipRepository;
pub use friendship_repository::{FriendshipPersistenceError, FriendshipRepository};
#[cfg(test)]
pub use group_directory::MockGroupDirectory;
pub use group_directory::{GroupDirectory, MembershipRequest};
#[cfg(test)]
pub use group_repository::MockGroupRepository;
pub use group_repository::{GroupPersistenceError, GroupRepository};
#[cfg(test)]
pub use image_host::MockImageHost;
pub use image_host::{HostedImage, ImageHost, ImageHostError, ImageUpload};
#[cfg(test)]
pub use journey_catalogue::MockJourneyCatalogue;
pub use journey_catalogue::JourneyCatalogue;
#[cfg(test)]
pub use journey_enrolment::MockJourneyEnrolment;
pub use journey_enrolment::{JourneyEnrolment, ParticipationRequest};
#[cfg(test)]
pub use journey_ratings::MockJourneyRatings;
pub use journey_ratings::{JourneyRatings, RatingRequest};
#[cfg(test)]
pub use journey_repository::{MockJourneyRepository, MockStepRepository};
pub use journey_repository::{JourneyPersistenceError, JourneyRepository, StepRepository};
#[cfg(test)]
pub use location_rooms::MockLocationRooms;
pub use location_rooms::{LocationRooms, RoomError, RoomSubscription};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use rating_repository::MockRatingRepository;
pub use rating_repository::{RatingPersistenceError, RatingRepository};
#[cfg(test)]
pub use score_board::MockScoreBoard;
pub use score_board::{
    ScoreBoard, ScoreRequest, ScoreSummaryEntry, ScoreUpdateRequest, SummaryRequest,
};
#[cfg(test)]
pub use score_repository::MockScoreRepository;
pub use score_repository::{ScorePersistenceError, ScoreRepository};
#[cfg(test)]
pub use token_service::MockTokenService;
pub use token_service::{TokenError, TokenService};
#[cfg(test)]
pub use user_accounts::MockUserAccounts;
pub use user_accounts::{
    LoginOutcome, ProfilePictureUpload, SignUpRequest, UpdateAccountRequest, UserAccounts,
};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
