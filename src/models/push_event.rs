// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Webhook push-event rows and dispatch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Inbound webhook event from Strava. All fields are required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionEvent {
    pub aspect_type: String,
    pub event_time: i64,
    pub object_id: i64,
    pub object_type: String,
    pub owner_id: i64,
    pub subscription_id: i64,
    pub updates: serde_json::Value,
}

/// Stored push-event row, one per external object id.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PushEvent {
    pub id: i64,
    pub object_id: i64,
    pub object_type: String,
    pub aspect_type: String,
    pub owner_id: i64,
    pub event_time: i64,
    pub updates: Option<serde_json::Value>,
    pub status: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PushEvent {
    pub fn is_processed(&self) -> bool {
        self.status == PushStatus::Processed as i16
    }
}

/// Processing status of a push event. The transition is one-way:
/// unprocessed rows become processed exactly once, never the reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i16)]
pub enum PushStatus {
    Unprocessed = 0,
    Processed = 1,
}

/// Typed dispatch over the webhook's (object_type, aspect_type) pair.
///
/// New event kinds become a compile-time decision instead of a string
/// switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushEventKind {
    ActivityCreate,
    ActivityUpdate,
    AthleteEvent,
    Unknown,
}

impl PushEventKind {
    pub fn classify(object_type: &str, aspect_type: &str) -> Self {
        match (object_type, aspect_type) {
            ("activity", "create") => PushEventKind::ActivityCreate,
            ("activity", "update") => PushEventKind::ActivityUpdate,
            ("athlete", _) => PushEventKind::AthleteEvent,
            _ => PushEventKind::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_activity_create() {
        assert_eq!(
            PushEventKind::classify("activity", "create"),
            PushEventKind::ActivityCreate
        );
    }

    #[test]
    fn test_classify_athlete_any_aspect() {
        assert_eq!(
            PushEventKind::classify("athlete", "update"),
            PushEventKind::AthleteEvent
        );
        assert_eq!(
            PushEventKind::classify("athlete", "create"),
            PushEventKind::AthleteEvent
        );
    }

    #[test]
    fn test_classify_unknown_combinations() {
        assert_eq!(
            PushEventKind::classify("activity", "delete"),
            PushEventKind::Unknown
        );
        assert_eq!(
            PushEventKind::classify("segment", "create"),
            PushEventKind::Unknown
        );
    }

    #[test]
    fn test_subscription_event_rejects_missing_fields() {
        let payload = serde_json::json!({
            "aspect_type": "create",
            "object_id": 42,
        });
        assert!(serde_json::from_value::<SubscriptionEvent>(payload).is_err());
    }
}
