//! Port for journey rating persistence.

use async_trait::async_trait;

use crate::domain::{JourneyId, Rating, RatingEntry, RatingFilter, RatingSubmission};

use super::define_port_error;

define_port_error! {
    /// Errors raised by rating repository adapters.
    pub enum RatingPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "rating repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "rating repository query failed: {message}",
        /// Referenced user or journey does not exist.
        MissingReference { message: String } => "rating references unknown row: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RatingRepository: Send + Sync {
    /// Insert, or overwrite value and comment of the (user, journey) pair.
    async fn upsert(&self, submission: &RatingSubmission) -> Result<Rating, RatingPersistenceError>;

    /// Ratings matching the filter, newest first, with author usernames.
    async fn list(&self, filter: RatingFilter) -> Result<Vec<RatingEntry>, RatingPersistenceError>;

    /// Sum and count of a journey's rating values.
    async fn totals(&self, journey: JourneyId) -> Result<(i64, i64), RatingPersistenceError>;
}
