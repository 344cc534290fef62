//! Fixtures shared by the domain service tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{EmailAddress, Principal, User, UserId, UserSummary, Username};

pub(crate) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, 12, 9, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_timestamp(),
    })
}

pub(crate) fn principal(user_id: UserId) -> Principal {
    Principal {
        user_id,
        email: "caller@example.com".to_owned(),
    }
}

pub(crate) fn sample_user(username: &str) -> User {
    User {
        id: UserId::random(),
        username: Username::new(username).expect("fixture username"),
        email: EmailAddress::new(format!("{username}@example.com")).expect("fixture email"),
        bio: None,
        profile_picture: None,
        created_at: fixture_timestamp(),
        updated_at: fixture_timestamp(),
    }
}

pub(crate) fn summary_of(user: &User) -> UserSummary {
    UserSummary {
        id: user.id,
        username: user.username.to_string(),
        email: user.email.to_string(),
        profile_picture: user.profile_picture.clone(),
    }
}
