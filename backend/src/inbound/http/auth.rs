//! Bearer-token extractors used by HTTP handlers.
//!
//! Handlers declare their authentication needs in their signature:
//! [`AuthenticatedUser`] rejects anonymous callers, [`OptionalUser`] lets
//! them through. Both reject a token that is present but unusable.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};
use tracing::debug;

use crate::domain::ports::TokenError;
use crate::domain::{Error, Principal};
use crate::inbound::http::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// Caller proven by a valid bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub Principal);

impl AuthenticatedUser {
    /// Borrow the verified principal.
    pub fn principal(&self) -> &Principal {
        &self.0
    }
}

/// Caller that may be anonymous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionalUser(pub Option<Principal>);

impl OptionalUser {
    /// Borrow the verified principal when one was supplied.
    pub fn principal(&self) -> Option<&Principal> {
        self.0.as_ref()
    }
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let header = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix(BEARER_PREFIX).unwrap_or(header).trim();
    (!token.is_empty()).then_some(token)
}

fn map_token_error(error: TokenError) -> Error {
    match error {
        TokenError::Expired => Error::unauthorized("Token expired"),
        TokenError::Invalid { message } => {
            debug!(%message, "bearer token rejected");
            Error::forbidden("Invalid token")
        }
        TokenError::Signing { message } => {
            Error::internal(format!("token service failed: {message}"))
        }
    }
}

fn resolve(req: &HttpRequest) -> Result<Option<Principal>, Error> {
    let Some(token) = bearer_token(req) else {
        return Ok(None);
    };
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("HTTP state is not configured"))?;
    state.tokens.verify(token).map(Some).map_err(map_token_error)
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(resolve(req).and_then(|principal| {
            principal
                .map(AuthenticatedUser)
                .ok_or_else(|| Error::unauthorized("Access token required"))
        }))
    }
}

impl FromRequest for OptionalUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(resolve(req).map(OptionalUser))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};
    use rstest::rstest;
    use serde_json::Value;

    use super::*;
    use crate::domain::UserId;
    use crate::inbound::http::test_utils::TestPorts;

    fn tokens_answering(result: Result<Principal, TokenError>) -> TestPorts {
        let mut ports = TestPorts::default();
        ports
            .tokens
            .expect_verify()
            .withf(|token| token == "abc")
            .return_once(move |_| result);
        ports
    }

    async fn call(ports: TestPorts, header: Option<&str>, route: &str) -> (StatusCode, Value) {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ports.into_state()))
                .route(
                    "/required",
                    web::get().to(|user: AuthenticatedUser| async move {
                        HttpResponse::Ok().body(user.principal().user_id.to_string())
                    }),
                )
                .route(
                    "/optional",
                    web::get().to(|user: OptionalUser| async move {
                        let label = if user.principal().is_some() {
                            "known"
                        } else {
                            "anon"
                        };
                        HttpResponse::Ok().body(label)
                    }),
                ),
        )
        .await;
        let mut request = test::TestRequest::get().uri(route);
        if let Some(value) = header {
            request = request.insert_header((AUTHORIZATION, value));
        }
        let response = test::call_service(&app, request.to_request()).await;
        let status = response.status();
        let body = test::read_body(response).await;
        let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, value)
    }

    #[actix_web::test]
    async fn missing_token_is_rejected_on_required_routes() {
        let (status, body) = call(TestPorts::default(), None, "/required").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Access token required");
    }

    #[actix_web::test]
    async fn missing_token_is_anonymous_on_optional_routes() {
        let (status, _) = call(TestPorts::default(), None, "/optional").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[rstest]
    #[case(TokenError::Expired, StatusCode::UNAUTHORIZED, "Token expired")]
    #[case(TokenError::invalid("bad signature"), StatusCode::FORBIDDEN, "Invalid token")]
    #[actix_web::test]
    async fn unusable_tokens_are_rejected_everywhere(
        #[case] error: TokenError,
        #[case] status: StatusCode,
        #[case] message: &str,
        #[values("/required", "/optional")] route: &str,
    ) {
        let ports = tokens_answering(Err(error));
        let (observed, body) = call(ports, Some("Bearer abc"), route).await;
        assert_eq!(observed, status);
        assert_eq!(body["message"], message);
    }

    #[actix_web::test]
    async fn valid_token_yields_principal() {
        let user_id = UserId::random();
        let ports = tokens_answering(Ok(Principal {
            user_id,
            email: "ann@example.com".to_owned(),
        }));
        let (status, _) = call(ports, Some("Bearer abc"), "/required").await;
        assert_eq!(status, StatusCode::OK);
    }
}
