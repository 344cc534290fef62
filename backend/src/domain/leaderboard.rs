//! Global leaderboard ranking.
//!
//! Users are ranked by their total score across journeys. Only users with at
//! least one score are ranked; a known user without scores is placed just
//! after the last ranked user with a total of zero.

use serde::Serialize;
use utoipa::ToSchema;

use super::UserId;

/// Number of entries in the podium.
pub const PODIUM_SIZE: usize = 3;

/// Aggregated total for one user, before ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardRow {
    pub user_id: UserId,
    pub username: String,
    pub profile_picture: Option<String>,
    pub total_score: i64,
}

/// Ranked leaderboard line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    /// 1-based rank.
    pub rank: usize,
    #[schema(value_type = String, format = "uuid")]
    pub user_id: UserId,
    pub username: String,
    pub profile_picture: Option<String>,
    pub total_score: i64,
}

/// Podium plus the positions of up to two highlighted users.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Leaderboard {
    pub top3: Vec<LeaderboardEntry>,
    pub user_position: Option<LeaderboardEntry>,
    pub friend_position: Option<LeaderboardEntry>,
}

/// Sort rows by total descending (ties by username, then id) and assign
/// 1-based ranks.
///
/// # Examples
/// ```
/// use snaptrack::domain::{rank_rows, LeaderboardRow, UserId};
///
/// let row = |name: &str, total| LeaderboardRow {
///     user_id: UserId::random(),
///     username: name.into(),
///     profile_picture: None,
///     total_score: total,
/// };
/// let ranked = rank_rows(vec![row("b", 300), row("a", 500)]);
/// assert_eq!(ranked[0].username, "a");
/// assert_eq!(ranked[1].rank, 2);
/// ```
pub fn rank_rows(mut rows: Vec<LeaderboardRow>) -> Vec<LeaderboardEntry> {
    rows.sort_by(|a, b| {
        b.total_score
            .cmp(&a.total_score)
            .then_with(|| a.username.cmp(&b.username))
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| LeaderboardEntry {
            rank: index + 1,
            user_id: row.user_id,
            username: row.username,
            profile_picture: row.profile_picture,
            total_score: row.total_score,
        })
        .collect()
}

/// Who to highlight below the podium.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Highlight {
    /// No user requested.
    None,
    /// Requested user does not exist.
    Unknown,
    /// Requested user exists; profile used for an unranked entry.
    Known {
        user_id: UserId,
        username: String,
        profile_picture: Option<String>,
    },
}

fn position_of(ranked: &[LeaderboardEntry], highlight: Highlight) -> Option<LeaderboardEntry> {
    let Highlight::Known {
        user_id,
        username,
        profile_picture,
    } = highlight
    else {
        return None;
    };
    match ranked.iter().find(|entry| entry.user_id == user_id) {
        Some(entry) if entry.rank > PODIUM_SIZE => Some(entry.clone()),
        // Already visible in the podium.
        Some(_) => None,
        None => Some(LeaderboardEntry {
            rank: ranked.len() + 1,
            user_id,
            username,
            profile_picture,
            total_score: 0,
        }),
    }
}

/// Assemble the podium and highlighted positions from ranked entries.
pub fn build_leaderboard(
    ranked: Vec<LeaderboardEntry>,
    user: Highlight,
    friend: Highlight,
) -> Leaderboard {
    let user_position = position_of(&ranked, user);
    let friend_position = position_of(&ranked, friend);
    let top3 = ranked.into_iter().take(PODIUM_SIZE).collect();
    Leaderboard {
        top3,
        user_position,
        friend_position,
    }
}
