//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod error;
pub mod friends;
pub mod groups;
pub mod health;
pub mod journeys;
pub mod memberships;
pub mod participations;
pub mod ratings;
pub mod routes;
pub mod schemas;
pub mod scores;
pub mod state;
pub mod steps;
#[cfg(test)]
pub mod test_utils;
pub mod user_journeys;
pub mod users;
pub mod validation;

pub use error::ApiResult;
