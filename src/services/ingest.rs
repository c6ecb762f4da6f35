// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Webhook-driven activity ingestion.
//!
//! Per external object id the pipeline is a small state machine:
//! unseen -> recorded/unprocessed -> processed (terminal). A failed
//! ingestion leaves the row unprocessed, so the webhook sender's
//! redelivery retries it; a processed row makes redelivery a no-op.

use crate::db::Db;
use crate::error::{AppError, Result};
use crate::models::{
    ActivityDetail, ActivityRaw, PushEventKind, StreamSet, SubscriptionEvent,
};
use crate::services::strava::{DetailedActivity, StravaClient};
use crate::services::token::{TokenStore, STRAVA_SOURCE};

/// Orchestrates token cache -> upstream client -> transform -> atomic write.
#[derive(Clone)]
pub struct IngestService {
    db: Db,
    tokens: TokenStore,
    strava: StravaClient,
}

impl IngestService {
    pub fn new(db: Db, tokens: TokenStore, strava: StravaClient) -> Self {
        Self { db, tokens, strava }
    }

    /// Handle one webhook delivery.
    pub async fn push(&self, event: &SubscriptionEvent) -> Result<()> {
        // The updates payload must serialize before anything is recorded.
        serde_json::to_vec(&event.updates)
            .map_err(|e| AppError::BadRequest(format!("unserializable updates: {}", e)))?;

        let row = self.db.record_push_event(event, &event.updates).await?;
        if row.is_processed() {
            tracing::debug!(
                object_id = event.object_id,
                "Push event already processed (idempotent skip)"
            );
            return Ok(());
        }

        match PushEventKind::classify(&event.object_type, &event.aspect_type) {
            PushEventKind::ActivityCreate => self.ingest_activity(event).await,
            // Athlete events carry nothing to ingest.
            PushEventKind::AthleteEvent => Ok(()),
            PushEventKind::ActivityUpdate => {
                Err(AppError::BadRequest("unknown aspect type".to_string()))
            }
            PushEventKind::Unknown => {
                Err(AppError::BadRequest("unknown object type".to_string()))
            }
        }
    }

    /// Fetch, transform, and atomically persist one created activity.
    async fn ingest_activity(&self, event: &SubscriptionEvent) -> Result<()> {
        tracing::info!(
            object_id = event.object_id,
            owner_id = event.owner_id,
            "Ingesting activity"
        );

        let strava = self.strava.clone();
        let token = self
            .tokens
            .get_token(STRAVA_SOURCE, event.owner_id, move |t| async move {
                strava.refresh_if_needed(t).await
            })
            .await?;

        // Detail and streams are independent reads.
        let ((detail, raw_body), streams) = futures_util::future::try_join(
            self.strava.activity(&token.access_token, event.object_id),
            self.strava.activity_streams(&token.access_token, event.object_id),
        )
        .await?;

        let (raw, detail_row, stream_doc) = build_records(&detail, raw_body, &streams, event)?;

        self.db
            .insert_activity_atomic(&raw, &detail_row, &stream_doc)
            .await
    }
}

/// Lower an upstream activity + stream set into storage records.
///
/// Present streams must agree on sample count; a disagreement is upstream
/// data corruption and fails the ingestion (retryable).
pub fn build_records(
    detail: &DetailedActivity,
    raw_body: String,
    streams: &StreamSet,
    event: &SubscriptionEvent,
) -> Result<(ActivityRaw, ActivityDetail, serde_json::Value)> {
    if let Some((expected, got)) = streams.sample_count_mismatch() {
        return Err(AppError::StravaApi(format!(
            "stream sample counts disagree: {} vs {}",
            expected, got
        )));
    }

    let start_date_local = chrono::DateTime::parse_from_rfc3339(&detail.start_date_local)
        .map_err(|e| {
            AppError::Internal(anyhow::anyhow!(
                "Invalid start_date_local for activity {}: {}",
                detail.id,
                e
            ))
        })?
        .naive_utc();

    let athlete_id = if detail.athlete.id != 0 {
        detail.athlete.id
    } else {
        event.owner_id
    };

    let now = chrono::Utc::now();
    let detail_row = ActivityDetail {
        id: detail.id,
        athlete_id,
        name: detail.name.clone(),
        activity_type: detail.activity_type.to_lowercase(),
        distance: detail.distance,
        moving_time: detail.moving_time,
        elapsed_time: detail.elapsed_time,
        total_elevation_gain: detail.total_elevation_gain,
        start_date_local,
        polyline: detail.map.polyline.clone().unwrap_or_default(),
        summary_polyline: detail.map.summary_polyline.clone().unwrap_or_default(),
        average_speed: detail.average_speed,
        max_speed: detail.max_speed,
        average_heartrate: detail.average_heartrate,
        max_heartrate: detail.max_heartrate,
        elev_high: detail.elev_high,
        elev_low: detail.elev_low,
        calories: detail.calories,
        splits_metric: detail.splits_metric.clone(),
        best_efforts: detail.best_efforts.clone(),
        device_name: detail.device_name.clone(),
        created_at: now,
        updated_at: now,
        deleted_at: 0,
    };

    let stream_doc = serde_json::to_value(streams)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Serialize stream set: {}", e)))?;

    let raw = ActivityRaw {
        id: detail.id,
        data: raw_body,
    };

    Ok((raw, detail_row, stream_doc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Stream;

    fn event(object_id: i64) -> SubscriptionEvent {
        SubscriptionEvent {
            aspect_type: "create".to_string(),
            event_time: 1767225600,
            object_id,
            object_type: "activity".to_string(),
            owner_id: 77,
            subscription_id: 1,
            updates: serde_json::json!({}),
        }
    }

    fn detail() -> DetailedActivity {
        serde_json::from_value(serde_json::json!({
            "id": 9901,
            "athlete": {"id": 77},
            "name": "Evening Ride",
            "type": "VirtualRide",
            "distance": 30000.0,
            "moving_time": 3600,
            "elapsed_time": 3700,
            "start_date_local": "2026-03-02T18:00:00Z",
            "average_speed": 8.3,
            "calories": 600.0,
            "map": {"summary_polyline": "xyz"}
        }))
        .unwrap()
    }

    fn stream<T: Clone>(data: &[T]) -> Option<Stream<T>> {
        Some(Stream {
            original_size: Some(data.len() as i64),
            resolution: None,
            series_type: None,
            data: data.to_vec(),
        })
    }

    #[test]
    fn test_build_records_lowers_type_and_polyline() {
        let streams = StreamSet {
            time: stream(&[0i64, 1, 2]),
            heartrate: stream(&[120i64, 130, 135]),
            ..Default::default()
        };

        let (raw, row, doc) = build_records(&detail(), "{}".to_string(), &streams, &event(9901))
            .expect("records should build");

        assert_eq!(raw.id, 9901);
        assert_eq!(row.activity_type, "virtualride");
        assert_eq!(row.athlete_id, 77);
        // No detailed polyline: the summary is not promoted, each column
        // keeps its own source field.
        assert_eq!(row.polyline, "");
        assert_eq!(row.summary_polyline, "xyz");
        assert_eq!(row.start_date_local.to_string(), "2026-03-02 18:00:00");
        assert!(doc.get("heartrate").is_some());
        assert!(doc.get("watts").is_none());
    }

    #[test]
    fn test_build_records_rejects_mismatched_streams() {
        let streams = StreamSet {
            time: stream(&[0i64, 1, 2]),
            distance: stream(&[0.0, 4.9]),
            ..Default::default()
        };

        let err = build_records(&detail(), "{}".to_string(), &streams, &event(9901)).unwrap_err();
        assert!(matches!(err, AppError::StravaApi(_)));
    }

    #[test]
    fn test_build_records_falls_back_to_event_owner() {
        let mut d = detail();
        d.athlete.id = 0;
        let (_, row, _) =
            build_records(&d, "{}".to_string(), &StreamSet::default(), &event(9901)).unwrap();
        assert_eq!(row.athlete_id, 77);
    }

    #[test]
    fn test_build_records_rejects_bad_start_date() {
        let mut d = detail();
        d.start_date_local = "not a date".to_string();
        let err =
            build_records(&d, "{}".to_string(), &StreamSet::default(), &event(9901)).unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
