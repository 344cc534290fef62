//! Driving port for journey ratings.

use async_trait::async_trait;

use crate::domain::{
    Error, JourneyId, Principal, Rating, RatingAverage, RatingEntry, RatingFilter, UserId,
};

/// Raw rating fields. `user_id`, when present, must be the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingRequest {
    pub journey_id: JourneyId,
    pub value: i64,
    pub comment: Option<String>,
    pub user_id: Option<UserId>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JourneyRatings: Send + Sync {
    /// Rate a journey for the caller, replacing any earlier rating.
    async fn rate(&self, caller: &Principal, request: RatingRequest) -> Result<Rating, Error>;

    /// Ratings matching the filter, newest first.
    async fn list_ratings(&self, filter: RatingFilter) -> Result<Vec<RatingEntry>, Error>;

    /// Mean rating of a journey.
    async fn average(&self, journey: JourneyId) -> Result<RatingAverage, Error>;
}
