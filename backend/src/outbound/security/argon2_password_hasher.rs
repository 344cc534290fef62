//! Argon2id adapter for the [`PasswordHasher`] port.

use argon2::Argon2;
use argon2::password_hash::{
    self, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use async_trait::async_trait;
use rand::rngs::OsRng;
use tokio::task;
use zeroize::Zeroizing;

use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// Hashes passwords into PHC strings with Argon2id default parameters.
///
/// Work runs on the blocking pool so a login burst cannot stall the
/// executor.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2PasswordHasher;

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self
    }
}

fn hash_blocking(password: &[u8]) -> Result<String, PasswordHashError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password, &salt)
        .map(|hash| hash.to_string())
        .map_err(|error| PasswordHashError::hash(error.to_string()))
}

fn verify_blocking(password: &[u8], stored_hash: &str) -> Result<bool, PasswordHashError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|error| PasswordHashError::malformed(error.to_string()))?;
    match Argon2::default().verify_password(password, &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(error) => Err(PasswordHashError::hash(error.to_string())),
    }
}

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        let password = Zeroizing::new(password.as_bytes().to_vec());
        task::spawn_blocking(move || hash_blocking(&password))
            .await
            .map_err(|error| PasswordHashError::hash(error.to_string()))?
    }

    async fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, PasswordHashError> {
        let password = Zeroizing::new(password.as_bytes().to_vec());
        let stored_hash = stored_hash.to_owned();
        task::spawn_blocking(move || verify_blocking(&password, &stored_hash))
            .await
            .map_err(|error| PasswordHashError::hash(error.to_string()))?
    }
}
