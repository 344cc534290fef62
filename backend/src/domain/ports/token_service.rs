//! Port for issuing and verifying bearer tokens.

use crate::domain::Principal;

use super::define_port_error;

define_port_error! {
    /// Errors raised by token adapters.
    pub enum TokenError {
        /// The token was well formed but its lifetime has ended.
        Expired => "token expired",
        /// The token is malformed or its signature does not match.
        Invalid { message: String } => "invalid token: {message}",
        /// A token could not be produced.
        Signing { message: String } => "token signing failed: {message}",
    }
}

/// Signs principals into opaque bearer tokens and back.
#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    /// Issue a token for `principal`.
    fn issue(&self, principal: &Principal) -> Result<String, TokenError>;

    /// Verify `token` and recover the principal it was issued for.
    fn verify(&self, token: &str) -> Result<Principal, TokenError>;
}
