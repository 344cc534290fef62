//! User accounts.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::validation::{optional_text, FieldError};
use super::UserId;

/// Minimum allowed length for a username.
pub const USERNAME_MIN: usize = 3;
/// Maximum allowed length for a username.
pub const USERNAME_MAX: usize = 32;
/// Maximum biography length.
pub const BIO_MAX: usize = 500;

static USERNAME_RE: OnceLock<Regex> = OnceLock::new();

fn username_regex() -> &'static Regex {
    USERNAME_RE.get_or_init(|| {
        // Length is enforced separately; this regex constrains allowed characters.
        Regex::new("^[A-Za-z0-9_.-]+$")
            .unwrap_or_else(|error| panic!("username regex failed to compile: {error}"))
    })
}

/// Public handle of a user.
///
/// # Examples
/// ```
/// use snaptrack::domain::Username;
///
/// assert!(Username::new("ann_42").is_ok());
/// assert!(Username::new("a b").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`].
    pub fn new(value: impl Into<String>) -> Result<Self, FieldError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(FieldError::Empty { field: "username" });
        }
        let length = trimmed.chars().count();
        if length < USERNAME_MIN {
            return Err(FieldError::TooShort {
                field: "username",
                min: USERNAME_MIN,
            });
        }
        if length > USERNAME_MAX {
            return Err(FieldError::TooLong {
                field: "username",
                max: USERNAME_MAX,
            });
        }
        if !username_regex().is_match(trimmed) {
            return Err(FieldError::InvalidFormat {
                field: "username",
                reason: "may only contain letters, digits, '_', '.' or '-'",
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = FieldError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Lowercase-normalised e-mail address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and normalise an address: one `@` with non-empty sides.
    pub fn new(value: impl AsRef<str>) -> Result<Self, FieldError> {
        let normalised = value.as_ref().trim().to_lowercase();
        if normalised.is_empty() {
            return Err(FieldError::Empty { field: "email" });
        }
        let valid = matches!(
            normalised.split_once('@'),
            Some((local, domain))
                if !local.is_empty() && !domain.is_empty() && !domain.contains('@')
                    && !normalised.chars().any(char::is_whitespace)
        );
        if !valid {
            return Err(FieldError::InvalidFormat {
                field: "email",
                reason: "must be a valid e-mail address",
            });
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = FieldError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Application user as exposed over the API. The password hash is never
/// part of this type.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[schema(value_type = String, format = "uuid")]
    pub id: UserId,
    #[schema(value_type = String, example = "ann_42")]
    pub username: Username,
    #[schema(value_type = String, example = "ann@example.com")]
    pub email: EmailAddress,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stored user together with its password hash, used only for login.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

/// Validated signup payload, password already hashed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub id: UserId,
    pub username: Username,
    pub email: EmailAddress,
    pub password_hash: String,
    pub bio: Option<String>,
}

/// Partial account update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserChanges {
    pub username: Option<Username>,
    pub email: Option<EmailAddress>,
    pub password_hash: Option<String>,
    pub bio: Option<String>,
}

impl UserChanges {
    /// True when nothing would be written.
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.password_hash.is_none()
            && self.bio.is_none()
    }
}

/// Validate an optional biography.
pub fn bio(value: Option<&str>) -> Result<Option<String>, FieldError> {
    optional_text("bio", value, BIO_MAX)
}

/// Username and picture of a user, embedded in relation listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    #[schema(value_type = String, format = "uuid")]
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub profile_picture: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ann", true)]
    #[case("  ann.b-c_1  ", true)]
    #[case("an", false)]
    #[case("ann b", false)]
    #[case("ann!", false)]
    #[case("", false)]
    fn usernames_are_validated(#[case] raw: &str, #[case] valid: bool) {
        assert_eq!(Username::new(raw).is_ok(), valid);
    }

    #[rstest]
    fn username_rejects_overlong_values() {
        let raw = "a".repeat(USERNAME_MAX + 1);
        assert_eq!(
            Username::new(raw),
            Err(FieldError::TooLong {
                field: "username",
                max: USERNAME_MAX
            })
        );
    }

    #[rstest]
    #[case("Ann@Example.COM", Some("ann@example.com"))]
    #[case("ann@", None)]
    #[case("@example.com", None)]
    #[case("ann@a@b", None)]
    #[case("an n@example.com", None)]
    #[case("plain", None)]
    fn emails_are_normalised(#[case] raw: &str, #[case] expected: Option<&str>) {
        let parsed = EmailAddress::new(raw).ok();
        assert_eq!(parsed.as_ref().map(AsRef::as_ref), expected);
    }

    #[rstest]
    fn empty_changes_are_detected() {
        assert!(UserChanges::default().is_empty());
        let changes = UserChanges {
            bio: Some("hi".into()),
            ..UserChanges::default()
        };
        assert!(!changes.is_empty());
    }
}
