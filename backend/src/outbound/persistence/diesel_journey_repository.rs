//! PostgreSQL-backed journey and step repositories.
//!
//! Geographic points are stored as separate latitude and longitude columns;
//! a journey target is either fully present or absent.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use tracing::warn;
use uuid::Uuid;

use crate::domain::geo::GeoPoint;
use crate::domain::ports::{JourneyPersistenceError, JourneyRepository, StepRepository};
use crate::domain::{
    GroupId, Journey, JourneyChanges, JourneyId, NewJourney, NewStep, Step, StepChanges, StepId,
    StepReadings,
};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error, pool_error_message};
use super::models::{JourneyRow, JourneyUpdate, NewJourneyRow, NewStepRow, StepRow, StepUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::{journeys, steps};

/// Diesel-backed implementation of the `JourneyRepository` port.
#[derive(Clone)]
pub struct DieselJourneyRepository {
    pool: DbPool,
}

impl DieselJourneyRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Diesel-backed implementation of the `StepRepository` port.
#[derive(Clone)]
pub struct DieselStepRepository {
    pool: DbPool,
}

impl DieselStepRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> JourneyPersistenceError {
    JourneyPersistenceError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> JourneyPersistenceError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => JourneyPersistenceError::connection(message),
        DieselFailure::Query(message) => JourneyPersistenceError::query(message),
        failure @ DieselFailure::ForeignKeyViolation { .. } => {
            let target = match failure.constraint() {
                Some(name) if name.contains("group") => "group",
                _ => "journey",
            };
            JourneyPersistenceError::missing_reference(target)
        }
        DieselFailure::UniqueViolation { .. } => {
            JourneyPersistenceError::query("unique constraint violation")
        }
    }
}

fn stored_point(lat: f64, lng: f64, row_id: Uuid) -> Result<GeoPoint, JourneyPersistenceError> {
    GeoPoint::new(lat, lng).map_err(|error| {
        warn!(row_id = %row_id, %error, "stored coordinate out of range");
        JourneyPersistenceError::query("stored coordinate is invalid")
    })
}

fn row_to_journey(row: JourneyRow) -> Result<Journey, JourneyPersistenceError> {
    let target = match (row.target_lat, row.target_lng) {
        (Some(lat), Some(lng)) => Some(stored_point(lat, lng, row.id)?),
        _ => None,
    };
    Ok(Journey {
        id: JourneyId::from_uuid(row.id),
        name: row.name,
        description: row.description,
        town: row.town,
        image: row.image,
        target,
        group_id: row.group_id.map(GroupId::from_uuid),
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn rows_to_journeys(rows: Vec<JourneyRow>) -> Result<Vec<Journey>, JourneyPersistenceError> {
    rows.into_iter().map(row_to_journey).collect()
}

fn journey_update(changes: &JourneyChanges, now: DateTime<Utc>) -> JourneyUpdate<'_> {
    JourneyUpdate {
        name: changes.name.as_deref(),
        description: changes.description.as_deref(),
        town: changes.town.as_deref(),
        image: changes.image.as_deref(),
        target_lat: changes.target.map(|point| point.lat()),
        target_lng: changes.target.map(|point| point.lng()),
        group_id: changes.group_id.map(|id| *id.as_uuid()),
        updated_at: now,
    }
}

fn row_to_step(row: StepRow) -> Result<Step, JourneyPersistenceError> {
    Ok(Step {
        id: StepId::from_uuid(row.id),
        journey_id: JourneyId::from_uuid(row.journey_id),
        position: row.position,
        title: row.title,
        description: row.description,
        riddle: row.riddle,
        location: stored_point(row.lat, row.lng, row.id)?,
        image: row.image,
        readings: StepReadings {
            accuracy: row.accuracy,
            altitude: row.altitude,
            speed: row.speed,
        },
        note: row.note,
        recorded_at: row.recorded_at,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn rows_to_steps(rows: Vec<StepRow>) -> Result<Vec<Step>, JourneyPersistenceError> {
    rows.into_iter().map(row_to_step).collect()
}

fn step_update(changes: &StepChanges, now: DateTime<Utc>) -> StepUpdate<'_> {
    StepUpdate {
        position: changes.position,
        title: changes.title.as_deref(),
        description: changes.description.as_deref(),
        riddle: changes.riddle.as_deref(),
        lat: changes.location.map(|point| point.lat()),
        lng: changes.location.map(|point| point.lng()),
        image: changes.image.as_deref(),
        accuracy: changes.accuracy,
        altitude: changes.altitude,
        speed: changes.speed,
        note: changes.note.as_deref(),
        recorded_at: changes.recorded_at,
        updated_at: now,
    }
}

/// Position following the highest one in use, or zero for an empty journey.
fn next_position(highest: Option<i32>) -> i32 {
    highest.map_or(0, |position| position.saturating_add(1))
}

#[async_trait]
impl JourneyRepository for DieselJourneyRepository {
    async fn list(&self) -> Result<Vec<Journey>, JourneyPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = journeys::table
            .order((journeys::created_at.desc(), journeys::id.asc()))
            .select(JourneyRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_journeys(rows)
    }

    async fn find(&self, id: JourneyId) -> Result<Option<Journey>, JourneyPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        journeys::table
            .find(id.as_uuid())
            .select(JourneyRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_journey)
            .transpose()
    }

    async fn create(&self, journey: &NewJourney) -> Result<Journey, JourneyPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewJourneyRow {
            id: *journey.id.as_uuid(),
            name: &journey.name,
            description: &journey.description,
            town: journey.town.as_deref(),
            image: journey.image.as_deref(),
            target_lat: journey.target.map(|point| point.lat()),
            target_lng: journey.target.map(|point| point.lng()),
            group_id: journey.group_id.map(|id| *id.as_uuid()),
            created_at: journey.created_at,
            updated_at: journey.created_at,
        };
        let stored = diesel::insert_into(journeys::table)
            .values(&row)
            .returning(JourneyRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_journey(stored)
    }

    async fn update(
        &self,
        id: JourneyId,
        changes: &JourneyChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<Journey>, JourneyPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(journeys::table.find(id.as_uuid()))
            .set(&journey_update(changes, now))
            .returning(JourneyRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_journey)
            .transpose()
    }

    async fn delete(&self, id: JourneyId) -> Result<bool, JourneyPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(journeys::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}

#[async_trait]
impl StepRepository for DieselStepRepository {
    async fn list(&self) -> Result<Vec<Step>, JourneyPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = steps::table
            .order((steps::journey_id.asc(), steps::position.asc(), steps::created_at.asc()))
            .select(StepRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_steps(rows)
    }

    async fn list_for_journey(
        &self,
        journey: JourneyId,
    ) -> Result<Vec<Step>, JourneyPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = steps::table
            .filter(steps::journey_id.eq(journey.as_uuid()))
            .order((steps::position.asc(), steps::created_at.asc()))
            .select(StepRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_steps(rows)
    }

    async fn find(&self, id: StepId) -> Result<Option<Step>, JourneyPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        steps::table
            .find(id.as_uuid())
            .select(StepRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_step)
            .transpose()
    }

    async fn create(&self, step: &NewStep) -> Result<Step, JourneyPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let conn: &mut AsyncPgConnection = &mut conn;
        let journey_id = *step.journey_id.as_uuid();
        let requested = step.position;

        let stored = conn
            .transaction(|conn| {
                async move {
                    let position = match requested {
                        Some(position) => position,
                        None => {
                            let highest: Option<i32> = steps::table
                                .filter(steps::journey_id.eq(journey_id))
                                .select(diesel::dsl::max(steps::position))
                                .first(conn)
                                .await?;
                            next_position(highest)
                        }
                    };
                    let row = NewStepRow {
                        id: *step.id.as_uuid(),
                        journey_id,
                        position,
                        title: &step.title,
                        description: step.description.as_deref(),
                        riddle: step.riddle.as_deref(),
                        lat: step.location.lat(),
                        lng: step.location.lng(),
                        image: step.image.as_deref(),
                        accuracy: step.readings.accuracy,
                        altitude: step.readings.altitude,
                        speed: step.readings.speed,
                        note: step.note.as_deref(),
                        recorded_at: step.recorded_at,
                        created_at: step.created_at,
                        updated_at: step.created_at,
                    };
                    diesel::insert_into(steps::table)
                        .values(&row)
                        .returning(StepRow::as_returning())
                        .get_result(conn)
                        .await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        row_to_step(stored)
    }

    async fn update(
        &self,
        id: StepId,
        changes: &StepChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<Step>, JourneyPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(steps::table.find(id.as_uuid()))
            .set(&step_update(changes, now))
            .returning(StepRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_step)
            .transpose()
    }

    async fn delete(&self, id: StepId) -> Result<bool, JourneyPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(steps::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::result::{DatabaseErrorKind, Error as DieselError};
    use rstest::{fixture, rstest};

    #[fixture]
    fn journey_row() -> JourneyRow {
        let now = Utc::now();
        JourneyRow {
            id: Uuid::new_v4(),
            name: "Old town".to_owned(),
            description: "Cobbles and riddles".to_owned(),
            town: Some("Lyon".to_owned()),
            image: None,
            target_lat: Some(45.764),
            target_lng: Some(4.8357),
            group_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    #[case(None, 0)]
    #[case(Some(0), 1)]
    #[case(Some(7), 8)]
    fn next_position_follows_the_highest(#[case] highest: Option<i32>, #[case] expected: i32) {
        assert_eq!(next_position(highest), expected);
    }

    #[rstest]
    fn journey_rows_rebuild_the_target(journey_row: JourneyRow) {
        let journey = row_to_journey(journey_row).expect("valid row");
        let target = journey.target.expect("target present");
        assert_eq!((target.lat(), target.lng()), (45.764, 4.8357));
    }

    #[rstest]
    fn half_a_target_reads_as_no_target(mut journey_row: JourneyRow) {
        journey_row.target_lng = None;
        assert!(row_to_journey(journey_row).expect("valid row").target.is_none());
    }

    #[rstest]
    fn out_of_range_coordinates_are_query_errors(mut journey_row: JourneyRow) {
        journey_row.target_lat = Some(123.0);
        assert!(matches!(
            row_to_journey(journey_row),
            Err(JourneyPersistenceError::Query { .. })
        ));
    }

    #[rstest]
    fn step_changes_split_the_location() {
        let changes = StepChanges {
            location: Some(GeoPoint::new(1.5, -2.5).expect("valid point")),
            ..StepChanges::default()
        };
        let update = step_update(&changes, Utc::now());
        assert_eq!((update.lat, update.lng), (Some(1.5), Some(-2.5)));
        assert!(update.title.is_none());
    }

    #[rstest]
    fn foreign_key_violations_name_the_journey() {
        let error = map_diesel_error(DieselError::DatabaseError(
            DatabaseErrorKind::ForeignKeyViolation,
            Box::new("fk".to_owned()),
        ));
        assert_eq!(error, JourneyPersistenceError::missing_reference("journey"));
    }
}
