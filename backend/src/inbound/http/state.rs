//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    FriendNetwork, GroupDirectory, JourneyCatalogue, JourneyEnrolment, JourneyRatings, ScoreBoard,
    TokenService, UserAccounts,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub accounts: Arc<dyn UserAccounts>,
    pub friends: Arc<dyn FriendNetwork>,
    pub groups: Arc<dyn GroupDirectory>,
    pub journeys: Arc<dyn JourneyCatalogue>,
    pub enrolment: Arc<dyn JourneyEnrolment>,
    pub ratings: Arc<dyn JourneyRatings>,
    pub scores: Arc<dyn ScoreBoard>,
    pub tokens: Arc<dyn TokenService>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn UserAccounts>,
    pub friends: Arc<dyn FriendNetwork>,
    pub groups: Arc<dyn GroupDirectory>,
    pub journeys: Arc<dyn JourneyCatalogue>,
    pub enrolment: Arc<dyn JourneyEnrolment>,
    pub ratings: Arc<dyn JourneyRatings>,
    pub scores: Arc<dyn ScoreBoard>,
    /// Verifies bearer tokens for the auth extractors.
    pub tokens: Arc<dyn TokenService>,
}

impl HttpState {
    /// Construct state from a ports bundle.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            accounts,
            friends,
            groups,
            journeys,
            enrolment,
            ratings,
            scores,
            tokens,
        } = ports;
        Self {
            accounts,
            friends,
            groups,
            journeys,
            enrolment,
            ratings,
            scores,
            tokens,
        }
    }
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}
