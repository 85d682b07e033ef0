//! Pure domain policy, kept free of persistence and transport concerns
//! so it can be unit tested without a database.

pub mod audit;
pub mod auto_resolution;
pub mod feature_resolution;
pub mod queue_order;

pub use audit::ModerationActionBuilder;
pub use auto_resolution::{decide, AutoOutcome, AUTO_APPROVE_THRESHOLD};
pub use feature_resolution::{resolve, resolve_branding, ResolvedFeatures, DEFAULT_BRANDING_NAME};
