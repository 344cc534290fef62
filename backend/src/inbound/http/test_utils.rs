//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{App, test as actix_test, web};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::domain::ports::{
    MockFriendNetwork, MockGroupDirectory, MockJourneyCatalogue, MockJourneyEnrolment,
    MockJourneyRatings, MockScoreBoard, MockTokenService, MockUserAccounts,
};
use crate::domain::{Principal, UserId, UserSummary};
use crate::inbound::http::routes::configure_api;
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::inbound::http::validation::{json_config, query_config};

/// Token accepted by [`TestPorts::authenticate`].
pub const TEST_TOKEN: &str = "test-token";

/// Mocked driving ports; configure expectations then call [`Self::into_state`].
#[derive(Default)]
pub struct TestPorts {
    pub accounts: MockUserAccounts,
    pub friends: MockFriendNetwork,
    pub groups: MockGroupDirectory,
    pub journeys: MockJourneyCatalogue,
    pub enrolment: MockJourneyEnrolment,
    pub ratings: MockJourneyRatings,
    pub scores: MockScoreBoard,
    pub tokens: MockTokenService,
}

impl TestPorts {
    /// Accept [`TEST_TOKEN`] as proof of `user_id`.
    pub fn authenticate(&mut self, user_id: UserId) -> Principal {
        let principal = Principal {
            user_id,
            email: "caller@example.com".to_owned(),
        };
        let verified = principal.clone();
        self.tokens
            .expect_verify()
            .withf(|token| token == TEST_TOKEN)
            .returning(move |_| Ok(verified.clone()));
        principal
    }

    pub fn into_state(self) -> HttpState {
        HttpState::new(HttpStatePorts {
            accounts: Arc::new(self.accounts),
            friends: Arc::new(self.friends),
            groups: Arc::new(self.groups),
            journeys: Arc::new(self.journeys),
            enrolment: Arc::new(self.enrolment),
            ratings: Arc::new(self.ratings),
            scores: Arc::new(self.scores),
            tokens: Arc::new(self.tokens),
        })
    }
}

/// `Authorization` header carrying [`TEST_TOKEN`].
pub fn bearer() -> (actix_web::http::header::HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {TEST_TOKEN}"))
}

/// Fixed instant used in handler fixtures.
pub fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, 12, 9, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

/// Public projection of a user called `name`.
pub fn summary(name: &str) -> UserSummary {
    UserSummary {
        id: UserId::random(),
        username: name.to_owned(),
        email: format!("{name}@example.com"),
        profile_picture: None,
    }
}

/// Full API surface mounted under `/api/v1` over mocked ports.
pub fn test_app(
    ports: TestPorts,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(ports.into_state()))
        .app_data(json_config())
        .app_data(query_config())
        .service(web::scope("/api/v1").configure(configure_api))
}

/// Run one request against [`test_app`] and decode the JSON reply.
///
/// Empty or non-JSON bodies decode as [`Value::Null`].
pub async fn send(ports: TestPorts, request: actix_test::TestRequest) -> (StatusCode, Value) {
    let app = actix_test::init_service(test_app(ports)).await;
    let response = actix_test::call_service(&app, request.to_request()).await;
    let status = response.status();
    let body = actix_test::read_body(response).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}
