//! Domain layer for the EventSnaps backend.
//!
//! This crate contains:
//! - Domain models (Event, Photo, moderation records, jukebox queue, plans)
//! - Business logic services (auto-resolution policy, feature resolution,
//!   jukebox ordering)
//! - Request/response DTOs

pub mod models;
pub mod services;
