//! External service integrations and orchestration.

pub mod credentials;
pub mod moderation;
pub mod moderation_ai;
pub mod music_search;

pub use moderation_ai::{GeminiClient, PhotoAnalyzer};
pub use music_search::MusicSearchClient;
