//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the driven repository ports, backed by
//! PostgreSQL through `diesel-async` and a `bb8` connection pool.
//!
//! - Repositories only translate between Diesel rows and domain types; the
//!   relationship rules live in the domain services.
//! - Row structs (`models.rs`) and table definitions (`schema.rs`) never
//!   leave this module.
//! - Every pool or Diesel failure becomes the owning port's error type;
//!   unique and foreign-key violations keep their meaning so services can
//!   answer 409 or 404.
//!
//! # Example
//!
//! ```ignore
//! use snaptrack::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/snaptrack")).await?;
//! let users = DieselUserRepository::new(pool);
//! ```

mod diesel_enrolment_repository;
mod diesel_error_mapping;
mod diesel_friendship_repository;
mod diesel_group_repository;
mod diesel_journey_repository;
mod diesel_rating_repository;
mod diesel_score_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_enrolment_repository::{DieselParticipationRepository, DieselUserJourneyRepository};
pub use diesel_friendship_repository::DieselFriendshipRepository;
pub use diesel_group_repository::DieselGroupRepository;
pub use diesel_journey_repository::{DieselJourneyRepository, DieselStepRepository};
pub use diesel_rating_repository::DieselRatingRepository;
pub use diesel_score_repository::DieselScoreRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DEFAULT_POOL_SIZE, DbPool, PoolConfig, PoolError};
