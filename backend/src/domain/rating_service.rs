//! Rating service implementing [`JourneyRatings`].
//!
//! A user rates a journey once; rating it again overwrites the value and
//! comment of the existing row.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::ports::{
    JourneyRatings, RatingPersistenceError, RatingRepository, RatingRequest,
};
use crate::domain::{
    Error, JourneyId, Principal, Rating, RatingAverage, RatingEntry, RatingFilter,
    RatingSubmission,
};

fn map_rating_error(error: RatingPersistenceError) -> Error {
    match error {
        RatingPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("rating repository unavailable: {message}"))
        }
        RatingPersistenceError::Query { message } => {
            Error::internal(format!("rating repository error: {message}"))
        }
        RatingPersistenceError::MissingReference { .. } => {
            Error::not_found("User or journey not found")
        }
    }
}

/// Rating service backed by a [`RatingRepository`].
#[derive(Clone)]
pub struct RatingService<R> {
    ratings: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> RatingService<R> {
    pub fn new(ratings: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { ratings, clock }
    }
}

#[async_trait]
impl<R> JourneyRatings for RatingService<R>
where
    R: RatingRepository,
{
    async fn rate(&self, caller: &Principal, request: RatingRequest) -> Result<Rating, Error> {
        if request.user_id.is_some_and(|user| !caller.is(user)) {
            return Err(Error::forbidden("Ratings can only be submitted for yourself"));
        }
        let submission = RatingSubmission::try_new(
            caller.user_id,
            request.journey_id,
            request.value,
            request.comment.as_deref(),
            self.clock.utc(),
        )?;
        self.ratings
            .upsert(&submission)
            .await
            .map_err(map_rating_error)
    }

    async fn list_ratings(&self, filter: RatingFilter) -> Result<Vec<RatingEntry>, Error> {
        self.ratings.list(filter).await.map_err(map_rating_error)
    }

    async fn average(&self, journey: JourneyId) -> Result<RatingAverage, Error> {
        let (sum, count) = self
            .ratings
            .totals(journey)
            .await
            .map_err(map_rating_error)?;
        Ok(RatingAverage::from_totals(journey, sum, count))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;
    use crate::domain::ports::MockRatingRepository;
    use crate::domain::service_test_support::{fixture_clock, fixture_timestamp, principal};
    use crate::domain::{ErrorCode, RatingId, UserId};

    fn service(repo: MockRatingRepository) -> RatingService<MockRatingRepository> {
        RatingService::new(Arc::new(repo), fixture_clock())
    }

    fn request(value: i64, user_id: Option<UserId>) -> RatingRequest {
        RatingRequest {
            journey_id: JourneyId::random(),
            value,
            comment: Some(" Lovely ".to_owned()),
            user_id,
        }
    }

    fn stored(submission: &RatingSubmission) -> Rating {
        Rating {
            id: RatingId::random(),
            user_id: submission.user_id,
            journey_id: submission.journey_id,
            value: submission.value,
            comment: submission.comment.clone(),
            created_at: submission.submitted_at,
            updated_at: submission.submitted_at,
        }
    }

    #[tokio::test]
    async fn rating_is_upserted_for_the_caller() {
        let caller = UserId::random();
        let mut repo = MockRatingRepository::new();
        repo.expect_upsert()
            .withf(move |submission| {
                submission.user_id == caller
                    && submission.value.get() == 4
                    && submission.comment.as_deref() == Some("Lovely")
                    && submission.submitted_at == fixture_timestamp()
            })
            .times(1)
            .return_once(|submission| Ok(stored(submission)));

        let rating = service(repo)
            .rate(&principal(caller), request(4, None))
            .await
            .expect("rated");
        assert_eq!(rating.user_id, caller);
    }

    #[rstest]
    #[case(0)]
    #[case(6)]
    #[tokio::test]
    async fn values_outside_one_to_five_are_rejected(#[case] value: i64) {
        let error = service(MockRatingRepository::new())
            .rate(&principal(UserId::random()), request(value, None))
            .await
            .expect_err("out of range");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(error.details().expect("details")["field"], "value");
    }

    #[tokio::test]
    async fn rating_on_behalf_of_someone_else_is_forbidden() {
        let error = service(MockRatingRepository::new())
            .rate(
                &principal(UserId::random()),
                request(3, Some(UserId::random())),
            )
            .await
            .expect_err("forbidden");
        assert_eq!(error.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[case(12, 3, 4.0, 3)]
    #[case(0, 0, 0.0, 0)]
    #[case(9, 2, 4.5, 2)]
    #[tokio::test]
    async fn average_rounds_to_one_decimal(
        #[case] sum: i64,
        #[case] count: i64,
        #[case] expected: f64,
        #[case] expected_count: i64,
    ) {
        let mut repo = MockRatingRepository::new();
        repo.expect_totals().return_once(move |_| Ok((sum, count)));

        let average = service(repo)
            .average(JourneyId::random())
            .await
            .expect("average");
        assert_eq!(average.average_rating, expected);
        assert_eq!(average.count, expected_count);
    }
}
