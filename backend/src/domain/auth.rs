//! Authentication primitives: login credentials, plaintext passwords and the
//! authenticated principal carried by bearer tokens.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use zeroize::Zeroizing;

use super::validation::FieldError;
use super::UserId;

/// Minimum accepted password length.
pub const PASSWORD_MIN: usize = 6;
/// Maximum accepted password length.
pub const PASSWORD_MAX: usize = 128;

/// Plaintext password, wiped from memory on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Validate a new password's length. Whitespace is preserved.
    pub fn new(raw: &str) -> Result<Self, FieldError> {
        if raw.is_empty() {
            return Err(FieldError::Empty { field: "password" });
        }
        let length = raw.chars().count();
        if length < PASSWORD_MIN {
            return Err(FieldError::TooShort {
                field: "password",
                min: PASSWORD_MIN,
            });
        }
        if length > PASSWORD_MAX {
            return Err(FieldError::TooLong {
                field: "password",
                max: PASSWORD_MAX,
            });
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// Expose the secret for hashing or verification.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `identifier` is trimmed and non-empty; it may be an e-mail address or
///   a username.
/// - `password` is non-empty but keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use snaptrack::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" ann@example.com ", "secret").unwrap();
/// assert_eq!(creds.identifier(), "ann@example.com");
/// assert_eq!(creds.password(), "secret");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    identifier: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw identifier/password inputs.
    pub fn try_from_parts(identifier: &str, password: &str) -> Result<Self, FieldError> {
        let normalized = identifier.trim();
        if normalized.is_empty() {
            return Err(FieldError::Empty { field: "email" });
        }
        if password.is_empty() {
            return Err(FieldError::Empty { field: "password" });
        }
        Ok(Self {
            identifier: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// E-mail address or username supplied by the caller.
    pub fn identifier(&self) -> &str {
        self.identifier.as_str()
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl std::fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("identifier", &self.identifier)
            .finish_non_exhaustive()
    }
}

/// Identity proven by a valid bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub email: String,
}

impl Principal {
    /// True when the principal is `user_id`.
    pub fn is(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }
}
