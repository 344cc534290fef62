//! Strongly typed UUID identifiers for every persisted entity.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_id {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(
                Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
            )]
            #[serde(transparent)]
            pub struct $name(Uuid);

            impl $name {
                /// Wrap an existing UUID.
                #[must_use]
                pub const fn from_uuid(uuid: Uuid) -> Self {
                    Self(uuid)
                }

                /// Generate a new random identifier.
                #[must_use]
                pub fn random() -> Self {
                    Self(Uuid::new_v4())
                }

                /// Access the underlying UUID.
                #[must_use]
                pub const fn as_uuid(&self) -> &Uuid {
                    &self.0
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    self.0.fmt(f)
                }
            }

            impl std::str::FromStr for $name {
                type Err = uuid::Error;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    Uuid::parse_str(s).map(Self)
                }
            }

            impl From<$name> for Uuid {
                fn from(value: $name) -> Self {
                    value.0
                }
            }
        )*
    };
}

define_id! {
    /// Registered user.
    UserId,
    /// Friend request or friendship between two users.
    FriendshipId,
    /// Group of users.
    GroupId,
    /// A user's membership row in a group.
    MembershipId,
    /// Scavenger-hunt course.
    JourneyId,
    /// Geolocated checkpoint within a journey.
    StepId,
    /// A user's enrolment in a journey.
    ParticipationId,
    /// A journey saved by a user.
    UserJourneyId,
    /// A user's rating of a journey.
    RatingId,
    /// A user's best score on a journey.
    ScoreId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays_uuid_text() {
        let raw = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
        let id: JourneyId = raw.parse().expect("valid uuid");
        assert_eq!(id.to_string(), raw);
    }

    #[test]
    fn serialises_transparently() {
        let id = UserId::from_uuid(Uuid::nil());
        let value = serde_json::to_value(id).expect("serialise");
        assert_eq!(value, serde_json::json!(Uuid::nil().to_string()));
    }
}
