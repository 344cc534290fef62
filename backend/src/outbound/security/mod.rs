//! Credential adapters: password hashing, bearer tokens and the token
//! signing secret they share.

mod argon2_password_hasher;
mod jwt_token_service;
mod token_secret;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use jwt_token_service::{JwtTokenService, TOKEN_LIFETIME_DAYS};
pub use token_secret::{BuildMode, TokenSecret, TokenSecretError, token_secret_from_env};
