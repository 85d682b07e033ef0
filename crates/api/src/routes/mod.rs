//! HTTP route handlers.

pub mod admin;
pub mod events;
pub mod features;
pub mod health;
pub mod jukebox;
pub mod moderation;
pub mod music;
pub mod photos;
