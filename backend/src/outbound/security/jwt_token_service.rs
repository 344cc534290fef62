//! HS256 JSON Web Token adapter for the [`TokenService`] port.

use std::fmt;
use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{TokenError, TokenService};
use crate::domain::{Principal, UserId};

use super::TokenSecret;

/// Lifetime of an issued token.
pub const TOKEN_LIFETIME_DAYS: i64 = 7;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
    email: String,
    iat: i64,
    exp: i64,
}

/// Signs principals into HS256 tokens valid for seven days.
///
/// Expiry is checked against the injected clock rather than the system
/// time so tests can pin "now".
pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetime: Duration,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for JwtTokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtTokenService")
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

impl JwtTokenService {
    /// Service signing with `secret` and the default seven day lifetime.
    pub fn new(secret: &TokenSecret, clock: Arc<dyn Clock>) -> Self {
        Self::with_lifetime(secret, Duration::days(TOKEN_LIFETIME_DAYS), clock)
    }

    /// Service issuing tokens that live for `lifetime`.
    pub fn with_lifetime(secret: &TokenSecret, lifetime: Duration, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            lifetime,
            clock,
        }
    }
}

fn map_decode_error(error: jsonwebtoken::errors::Error) -> TokenError {
    match error.kind() {
        ErrorKind::ExpiredSignature => TokenError::expired(),
        _ => TokenError::invalid(error.to_string()),
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, principal: &Principal) -> Result<String, TokenError> {
        let issued_at = self.clock.utc();
        let subject = principal.user_id.to_string();
        let claims = Claims {
            sub: subject.clone(),
            user_id: Some(subject),
            email: principal.email.clone(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.lifetime).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|error| TokenError::signing(error.to_string()))
    }

    fn verify(&self, token: &str) -> Result<Principal, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|error| {
            debug!(error = %error, "bearer token rejected");
            map_decode_error(error)
        })?;
        let claims = data.claims;
        if claims.exp <= self.clock.utc().timestamp() {
            return Err(TokenError::expired());
        }
        let user_id = Uuid::parse_str(&claims.sub)
            .map(UserId::from_uuid)
            .map_err(|_| TokenError::invalid("subject is not a user id"))?;
        Ok(Principal {
            user_id,
            email: claims.email,
        })
    }
}
