//! PostgreSQL-backed participation and saved-journey repositories.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;
use uuid::Uuid;

use crate::domain::ports::{
    EnrolmentPersistenceError, ParticipationRepository, UserJourneyRepository,
};
use crate::domain::{
    JourneyId, Participation, ParticipationFilter, ParticipationId, ParticipationStatus, UserId,
    UserJourney, UserJourneyId, UserJourneyRow,
};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error, pool_error_message};
use super::models::{ParticipationRow, UserJourneyLinkRow};
use super::pool::{DbPool, PoolError};
use super::schema::{journeys, participations, user_journeys, users};

/// Diesel-backed implementation of the `ParticipationRepository` port.
#[derive(Clone)]
pub struct DieselParticipationRepository {
    pool: DbPool,
}

impl DieselParticipationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Diesel-backed implementation of the `UserJourneyRepository` port.
#[derive(Clone)]
pub struct DieselUserJourneyRepository {
    pool: DbPool,
}

impl DieselUserJourneyRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> EnrolmentPersistenceError {
    EnrolmentPersistenceError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> EnrolmentPersistenceError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => EnrolmentPersistenceError::connection(message),
        DieselFailure::Query(message) => EnrolmentPersistenceError::query(message),
        DieselFailure::UniqueViolation { .. } => {
            EnrolmentPersistenceError::duplicate("user is already linked to this journey")
        }
        DieselFailure::ForeignKeyViolation { .. } => {
            EnrolmentPersistenceError::missing_reference("user or journey")
        }
    }
}

fn row_to_participation(row: ParticipationRow) -> Result<Participation, EnrolmentPersistenceError> {
    let status = row.status.parse::<ParticipationStatus>().map_err(|error| {
        warn!(participation_id = %row.id, %error, "stored participation status is unknown");
        EnrolmentPersistenceError::query("stored participation row is invalid")
    })?;
    Ok(Participation {
        id: ParticipationId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        journey_id: JourneyId::from_uuid(row.journey_id),
        status,
        invited_at: row.invited_at,
        responded_at: row.responded_at,
    })
}

fn participation_to_row(participation: &Participation) -> ParticipationRow {
    ParticipationRow {
        id: *participation.id.as_uuid(),
        user_id: *participation.user_id.as_uuid(),
        journey_id: *participation.journey_id.as_uuid(),
        status: participation.status.as_str().to_owned(),
        invited_at: participation.invited_at,
        responded_at: participation.responded_at,
    }
}

fn row_to_link(row: UserJourneyLinkRow) -> UserJourney {
    UserJourney {
        id: UserJourneyId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        journey_id: JourneyId::from_uuid(row.journey_id),
        created_at: row.created_at,
    }
}

#[async_trait]
impl ParticipationRepository for DieselParticipationRepository {
    async fn list(
        &self,
        filter: ParticipationFilter,
    ) -> Result<Vec<Participation>, EnrolmentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = participations::table
            .select(ParticipationRow::as_select())
            .order((participations::invited_at.desc(), participations::id.asc()))
            .into_boxed();
        if let Some(user) = filter.user_id {
            query = query.filter(participations::user_id.eq(*user.as_uuid()));
        }
        if let Some(journey) = filter.journey_id {
            query = query.filter(participations::journey_id.eq(*journey.as_uuid()));
        }
        let rows = query.load(&mut conn).await.map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_participation).collect()
    }

    async fn find(
        &self,
        id: ParticipationId,
    ) -> Result<Option<Participation>, EnrolmentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        participations::table
            .find(id.as_uuid())
            .select(ParticipationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_participation)
            .transpose()
    }

    async fn create(
        &self,
        participation: &Participation,
    ) -> Result<Participation, EnrolmentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let stored = diesel::insert_into(participations::table)
            .values(&participation_to_row(participation))
            .returning(ParticipationRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_participation(stored)
    }

    async fn set_status(
        &self,
        id: ParticipationId,
        status: ParticipationStatus,
        responded_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Participation>, EnrolmentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(participations::table.find(id.as_uuid()))
            .set((
                participations::status.eq(status.as_str()),
                participations::responded_at.eq(responded_at),
            ))
            .returning(ParticipationRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_participation)
            .transpose()
    }

    async fn delete(&self, id: ParticipationId) -> Result<bool, EnrolmentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(participations::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}

#[async_trait]
impl UserJourneyRepository for DieselUserJourneyRepository {
    async fn rows(
        &self,
        user: Option<UserId>,
    ) -> Result<Vec<UserJourneyRow>, EnrolmentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = user_journeys::table
            .inner_join(journeys::table)
            .inner_join(users::table)
            .select((journeys::id, journeys::name, users::id, users::username))
            .order((
                journeys::name.asc(),
                journeys::id.asc(),
                user_journeys::created_at.asc(),
            ))
            .into_boxed();
        if let Some(user) = user {
            query = query.filter(user_journeys::user_id.eq(*user.as_uuid()));
        }
        let rows = query
            .load::<(Uuid, String, Uuid, String)>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows
            .into_iter()
            .map(|(journey_id, journey_name, user_id, username)| UserJourneyRow {
                journey_id: JourneyId::from_uuid(journey_id),
                journey_name,
                user_id: UserId::from_uuid(user_id),
                username,
            })
            .collect())
    }

    async fn create(&self, link: &UserJourney) -> Result<UserJourney, EnrolmentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = UserJourneyLinkRow {
            id: *link.id.as_uuid(),
            user_id: *link.user_id.as_uuid(),
            journey_id: *link.journey_id.as_uuid(),
            created_at: link.created_at,
        };
        let stored = diesel::insert_into(user_journeys::table)
            .values(&row)
            .returning(UserJourneyLinkRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(row_to_link(stored))
    }

    async fn set_journey(
        &self,
        id: UserJourneyId,
        journey: JourneyId,
    ) -> Result<Option<UserJourney>, EnrolmentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::update(user_journeys::table.find(id.as_uuid()))
            .set(user_journeys::journey_id.eq(journey.as_uuid()))
            .returning(UserJourneyLinkRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(row_to_link))
    }

    async fn delete(&self, id: UserJourneyId) -> Result<bool, EnrolmentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(user_journeys::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
