// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Push-event deduplication rows.
//!
//! One row per external object id, enforced by a unique constraint so
//! concurrent duplicate deliveries converge on a single row. The status
//! flag only ever moves unprocessed -> processed, and only inside the
//! ingestion transaction.

use super::Db;
use crate::error::AppError;
use crate::models::{PushEvent, PushStatus, SubscriptionEvent};
use sqlx::Postgres;

impl Db {
    /// Record an inbound webhook event, returning the canonical row for
    /// its object id. Re-deliveries return the existing row untouched.
    pub async fn record_push_event(
        &self,
        event: &SubscriptionEvent,
        updates: &serde_json::Value,
    ) -> Result<PushEvent, AppError> {
        sqlx::query(
            "INSERT INTO push_event (object_id, object_type, aspect_type, owner_id, event_time, updates) \
             VALUES ($1, $2, $3, $4, $5, $6) ON CONFLICT (object_id) DO NOTHING",
        )
        .bind(event.object_id)
        .bind(&event.object_type)
        .bind(&event.aspect_type)
        .bind(event.owner_id)
        .bind(event.event_time)
        .bind(updates)
        .execute(self.pool())
        .await?;

        self.get_push_event(event.object_id)
            .await?
            .ok_or_else(|| AppError::Database("push event row missing after insert".to_string()))
    }

    /// Fetch the push-event row for an object id.
    pub async fn get_push_event(&self, object_id: i64) -> Result<Option<PushEvent>, AppError> {
        let row = sqlx::query_as::<_, PushEvent>(
            "SELECT id, object_id, object_type, aspect_type, owner_id, event_time, updates, \
                    status, created_at, updated_at \
             FROM push_event WHERE object_id = $1",
        )
        .bind(object_id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row)
    }

    /// Mark a push event processed, inside the ingestion transaction.
    pub async fn mark_push_event_processed(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        object_id: i64,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE push_event SET status = $1, updated_at = now() WHERE object_id = $2")
            .bind(PushStatus::Processed as i16)
            .bind(object_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}
