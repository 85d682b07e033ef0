//! Event domain models.
//!
//! An event is a time-boxed, code-addressable space guests join to share
//! photos and queue music. Expiry is a derived read-time predicate on
//! `expires_at`; the stored `status` only distinguishes deactivated events.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Uploader/creator identity used when no authenticated user is present.
pub const ANONYMOUS_USER: &str = "anonymous";

/// Stored event status. Expired-by-time events stay `active` in storage;
/// callers must also check [`Event::is_expired`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Active,
    Expired,
}

impl EventStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EventStatus::Active => "active",
            EventStatus::Expired => "expired",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(EventStatus::Active),
            "expired" => Some(EventStatus::Expired),
            _ => None,
        }
    }
}

/// How long an event accepts contributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventDuration {
    #[serde(rename = "24h")]
    Day,
    #[serde(rename = "72h")]
    ThreeDays,
}

impl EventDuration {
    pub fn as_duration(self) -> Duration {
        match self {
            EventDuration::Day => Duration::hours(24),
            EventDuration::ThreeDays => Duration::hours(72),
        }
    }
}

/// An event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Event {
    pub id: Uuid,
    pub code: String,
    pub creator_id: String,
    pub moderation_enabled: bool,
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Event {
    /// Whether the event is past its expiry instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Whether the event is past its expiry instant, evaluated now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Whether the event still accepts photo uploads and jukebox writes.
    pub fn is_writable_at(&self, now: DateTime<Utc>) -> bool {
        self.status == EventStatus::Active && !self.is_expired_at(now)
    }
}

/// Request to create a new event.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateEventRequest {
    pub duration: EventDuration,
    #[serde(default)]
    pub moderation_enabled: bool,
}

/// Event representation returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct EventResponse {
    pub id: Uuid,
    pub code: String,
    pub creator_id: String,
    pub moderation_enabled: bool,
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Derived, so clients don't have to compare clocks.
    pub expired: bool,
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        let expired = event.is_expired();
        Self {
            id: event.id,
            code: event.code,
            creator_id: event.creator_id,
            moderation_enabled: event.moderation_enabled,
            status: event.status,
            created_at: event.created_at,
            expires_at: event.expires_at,
            expired,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_event(expires_at: DateTime<Utc>) -> Event {
        Event {
            id: Uuid::new_v4(),
            code: "ABC123".to_string(),
            creator_id: "creator-1".to_string(),
            moderation_enabled: true,
            status: EventStatus::Active,
            created_at: Utc::now(),
            expires_at,
        }
    }

    #[test]
    fn test_duration_hours() {
        assert_eq!(EventDuration::Day.as_duration(), Duration::hours(24));
        assert_eq!(EventDuration::ThreeDays.as_duration(), Duration::hours(72));
    }

    #[test]
    fn test_duration_wire_names() {
        let d: EventDuration = serde_json::from_str("\"24h\"").unwrap();
        assert_eq!(d, EventDuration::Day);
        let d: EventDuration = serde_json::from_str("\"72h\"").unwrap();
        assert_eq!(d, EventDuration::ThreeDays);
    }

    #[test]
    fn test_expiry_is_derived() {
        let now = Utc::now();
        let live = test_event(now + Duration::hours(1));
        let dead = test_event(now - Duration::hours(1));

        assert!(!live.is_expired_at(now));
        assert!(dead.is_expired_at(now));
        assert!(live.is_writable_at(now));
        assert!(!dead.is_writable_at(now));
    }

    #[test]
    fn test_deactivated_event_not_writable() {
        let now = Utc::now();
        let mut event = test_event(now + Duration::hours(1));
        event.status = EventStatus::Expired;
        assert!(!event.is_writable_at(now));
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        // Exactly at expires_at the event is still writable; only strictly
        // past it counts as expired.
        let now = Utc::now();
        let event = test_event(now);
        assert!(!event.is_expired_at(now));
        assert!(event.is_expired_at(now + Duration::seconds(1)));
    }

    #[test]
    fn test_status_parse_round_trip() {
        assert_eq!(EventStatus::parse("active"), Some(EventStatus::Active));
        assert_eq!(EventStatus::parse("expired"), Some(EventStatus::Expired));
        assert_eq!(EventStatus::parse("deleted"), None);
        assert_eq!(EventStatus::Active.as_str(), "active");
    }

    #[test]
    fn test_response_carries_derived_expired_flag() {
        let event = test_event(Utc::now() - Duration::hours(2));
        let response: EventResponse = event.into();
        assert!(response.expired);
    }
}
