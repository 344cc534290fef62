//! Builders wiring Diesel repositories and outbound adapters into the
//! domain services behind the HTTP and WebSocket state.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};

use snaptrack::domain::ports::{ImageHost, PasswordHasher, TokenService};
use snaptrack::domain::{
    EnrolmentService, FriendshipService, GroupService, JourneyService, RatingService,
    ScoreService, UserAccountService,
};
use snaptrack::inbound::http::state::{HttpState, HttpStatePorts};
use snaptrack::inbound::ws::state::WsState;
use snaptrack::outbound::images::CloudinaryImageHost;
use snaptrack::outbound::persistence::{
    DbPool, DieselFriendshipRepository, DieselGroupRepository, DieselJourneyRepository,
    DieselParticipationRepository, DieselRatingRepository, DieselScoreRepository,
    DieselStepRepository, DieselUserJourneyRepository, DieselUserRepository,
};
use snaptrack::outbound::rooms::InMemoryLocationRooms;
use snaptrack::outbound::security::{Argon2PasswordHasher, JwtTokenService};

use super::ServerConfig;

/// Collaborators of the account service that live outside the database.
struct AccountAdapters {
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
    images: Arc<dyn ImageHost>,
}

fn build_account_adapters(
    config: &ServerConfig,
    clock: &Arc<dyn Clock>,
) -> std::io::Result<AccountAdapters> {
    let api_base = config
        .cloudinary_api_base()
        .map_err(|e| std::io::Error::other(format!("invalid Cloudinary API base: {e}")))?;
    let images = CloudinaryImageHost::new(config.cloudinary.clone(), api_base, clock.clone())
        .map_err(|e| std::io::Error::other(format!("image host client failed: {e}")))?;
    Ok(AccountAdapters {
        hasher: Arc::new(Argon2PasswordHasher::new()),
        tokens: Arc::new(JwtTokenService::new(&config.token_secret, clock.clone())),
        images: Arc::new(images),
    })
}

fn build_ports(pool: &DbPool, adapters: AccountAdapters, clock: &Arc<dyn Clock>) -> HttpStatePorts {
    let AccountAdapters {
        hasher,
        tokens,
        images,
    } = adapters;
    let users = Arc::new(DieselUserRepository::new(pool.clone()));

    HttpStatePorts {
        accounts: Arc::new(UserAccountService::new(
            users.clone(),
            hasher,
            tokens.clone(),
            images,
            clock.clone(),
        )),
        friends: Arc::new(FriendshipService::new(
            Arc::new(DieselFriendshipRepository::new(pool.clone())),
            clock.clone(),
        )),
        groups: Arc::new(GroupService::new(
            Arc::new(DieselGroupRepository::new(pool.clone())),
            clock.clone(),
        )),
        journeys: Arc::new(JourneyService::new(
            Arc::new(DieselJourneyRepository::new(pool.clone())),
            Arc::new(DieselStepRepository::new(pool.clone())),
            clock.clone(),
        )),
        enrolment: Arc::new(EnrolmentService::new(
            Arc::new(DieselParticipationRepository::new(pool.clone())),
            Arc::new(DieselUserJourneyRepository::new(pool.clone())),
            clock.clone(),
        )),
        ratings: Arc::new(RatingService::new(
            Arc::new(DieselRatingRepository::new(pool.clone())),
            clock.clone(),
        )),
        scores: Arc::new(ScoreService::new(
            Arc::new(DieselScoreRepository::new(pool.clone())),
            users,
            clock.clone(),
        )),
        tokens,
    }
}

/// Build the HTTP handler state from the configured pool and adapters.
///
/// # Errors
///
/// Returns [`std::io::Error`] when the image host client cannot be built.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let adapters = build_account_adapters(config, &clock)?;
    let ports = build_ports(&config.db_pool, adapters, &clock);
    Ok(web::Data::new(HttpState::new(ports)))
}

/// Build the WebSocket state with a fresh in-process room registry.
pub(super) fn build_ws_state(config: &ServerConfig) -> web::Data<WsState> {
    let rooms = Arc::new(InMemoryLocationRooms::new(config.room_capacity));
    web::Data::new(WsState::new(rooms, &config.ws_allowed_origins))
}
