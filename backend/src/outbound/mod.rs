//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL repositories using Diesel
//! - **security**: Argon2 password hashing and JWT bearer tokens
//! - **images**: Cloudinary-compatible image hosting over HTTP
//! - **rooms**: in-process location room registry
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod images;
pub mod persistence;
pub mod rooms;
pub mod security;
