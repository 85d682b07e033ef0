//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod admin_config;
pub mod event;
pub mod jukebox;
pub mod moderation;
pub mod photo;
pub mod plan;

pub use admin_config::AdminConfigEntity;
pub use event::EventEntity;
pub use jukebox::{JukeboxQueueEntity, JukeboxSettingsEntity};
pub use moderation::{ModerationActionEntity, ModerationQueueEntity};
pub use photo::PhotoEntity;
pub use plan::{PlanEntity, UserProfileEntity, UserSubscriptionEntity};
