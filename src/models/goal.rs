// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-athlete numeric targets.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Goal row. The tuple (athlete_id, type, field, freq) is unique among
/// live rows.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Goal {
    pub id: i64,
    #[serde(skip_serializing)]
    pub athlete_id: i64,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub activity_type: String,
    pub field: String,
    pub freq: String,
    pub value: f64,
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: i64,
}
