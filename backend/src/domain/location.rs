//! Real-time location sharing rooms.

use std::fmt;

use serde::Serialize;

use super::validation::FieldError;

/// Default maximum number of members in one room.
pub const DEFAULT_ROOM_CAPACITY: usize = 50;
/// Maximum room name length.
pub const ROOM_NAME_MAX: usize = 64;
/// Username used when a client joins without one.
pub const DEFAULT_ROOM_USERNAME: &str = "User";

/// Name of a location room chosen by the clients that join it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomName(String);

impl RoomName {
    /// Validate a room name: trimmed, non-empty, bounded.
    pub fn new(raw: &str) -> Result<Self, FieldError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(FieldError::Empty { field: "room" });
        }
        if trimmed.chars().count() > ROOM_NAME_MAX {
            return Err(FieldError::TooLong {
                field: "room",
                max: ROOM_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for RoomName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display name inside a room, defaulting to [`DEFAULT_ROOM_USERNAME`].
pub fn room_username(raw: Option<&str>) -> String {
    raw.map(str::trim)
        .filter(|name| !name.is_empty())
        .map_or_else(|| DEFAULT_ROOM_USERNAME.to_owned(), |name| name.chars().take(64).collect())
}

/// Position shared with every member of a room, the sender included.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationUpdate {
    pub username: String,
    pub lat: f64,
    pub lng: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(" r1 ", true)]
    #[case("", false)]
    #[case("   ", false)]
    fn room_names_are_validated(#[case] raw: &str, #[case] valid: bool) {
        assert_eq!(RoomName::new(raw).is_ok(), valid);
    }

    #[rstest]
    #[case(None, "User")]
    #[case(Some("  "), "User")]
    #[case(Some(" Ann "), "Ann")]
    fn usernames_default(#[case] raw: Option<&str>, #[case] expected: &str) {
        assert_eq!(room_username(raw), expected);
    }
}
