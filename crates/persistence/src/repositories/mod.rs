//! Repository implementations for database operations.

pub mod admin_config;
pub mod event;
pub mod jukebox;
pub mod moderation;
pub mod photo;
pub mod plan;

pub use admin_config::AdminConfigRepository;
pub use event::EventRepository;
pub use jukebox::{JukeboxQueueRepository, JukeboxSettingsRepository};
pub use moderation::{ModerationActionRepository, ModerationQueueRepository};
pub use photo::{ModerationResolution, PhotoRepository};
pub use plan::{PlanRepository, SubscriptionRepository, UserProfileRepository};
