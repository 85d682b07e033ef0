//! Domain models shared across the service.

pub mod event;
pub mod jukebox;
pub mod moderation;
pub mod photo;
pub mod plan;

pub use event::{
    CreateEventRequest, Event, EventDuration, EventResponse, EventStatus, ANONYMOUS_USER,
};
pub use jukebox::{
    AddTrackRequest, JukeboxQueueItem, JukeboxSettings, MusicProvider, QueueItemStatus, Track,
    UpdateJukeboxSettingsRequest,
};
pub use moderation::{
    AnalysisBatchResponse, ModerateRequest, ModerationAction, ModerationAnalysis,
    ModerationDecision, ModerationQueueEntry, ModerationQueueItemResponse, ModerationQueueResponse,
    MODERATOR_AUTO, MODERATOR_RETRY,
};
pub use photo::{ListPhotosResponse, Photo, PhotoResponse, PhotoStatus, RegisterPhotoRequest};
pub use plan::{
    Branding, Feature, FeatureCheckResponse, FeaturesResponse, Plan, PlanFeatures,
    SubscriptionStatus, TrialActivationResponse, UserProfile, UserSubscription,
};
