// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Statistics read endpoints.

use crate::error::Result;
use crate::middleware::auth::AuthAthlete;
use crate::models::{ActivityType, AggMethod, AggStats, Freq, ProgressStats, StatsField};
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/strava/activities/progress", get(progress_stats))
        .route("/api/strava/activities/agg", get(agg_stats))
}

/// Dimensions parse straight into the whitelist enums; unknown values are
/// rejected before any query runs.
#[derive(Deserialize)]
struct ProgressQuery {
    #[serde(rename = "type")]
    activity_type: ActivityType,
    field: StatsField,
    method: AggMethod,
}

/// Goal-progress snapshot for the dashboard cards.
async fn progress_stats(
    State(state): State<Arc<AppState>>,
    Extension(athlete): Extension<AuthAthlete>,
    Query(q): Query<ProgressQuery>,
) -> Result<Json<ProgressStats>> {
    let stats = state
        .stats
        .progress_stats(athlete.athlete_id, q.activity_type, q.field, q.method)
        .await?;
    Ok(Json(stats))
}

#[derive(Deserialize)]
struct AggQuery {
    #[serde(rename = "type")]
    activity_type: ActivityType,
    field: StatsField,
    method: AggMethod,
    freq: Freq,
    #[serde(default)]
    size: usize,
}

/// Date-bucketed aggregate series for the charts.
async fn agg_stats(
    State(state): State<Arc<AppState>>,
    Extension(athlete): Extension<AuthAthlete>,
    Query(q): Query<AggQuery>,
) -> Result<Json<AggStats>> {
    let stats = state
        .stats
        .agg_stats(
            athlete.athlete_id,
            q.activity_type,
            q.field,
            q.method,
            q.freq,
            q.size,
        )
        .await?;
    Ok(Json(stats))
}
