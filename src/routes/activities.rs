// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity read endpoints.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthAthlete;
use crate::models::{ActivityType, StreamSet};
use crate::services::stats::transform_velocity;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

const DEFAULT_PAGE_SIZE: i64 = 20;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/strava/activities", get(list_activities))
        .route("/api/strava/activities/{id}", get(get_activity))
}

#[derive(Deserialize)]
struct ListQuery {
    #[serde(rename = "type")]
    activity_type: Option<ActivityType>,
    #[serde(default)]
    page: i64,
    #[serde(default)]
    page_size: i64,
}

/// Paged activity list, newest first.
async fn list_activities(
    State(state): State<Arc<AppState>>,
    Extension(athlete): Extension<AuthAthlete>,
    Query(q): Query<ListQuery>,
) -> Result<Json<serde_json::Value>> {
    let page_size = if q.page_size == 0 || q.page_size > DEFAULT_PAGE_SIZE {
        DEFAULT_PAGE_SIZE
    } else {
        q.page_size
    };
    let page = q.page.max(1);
    let offset = (page - 1) * page_size;

    let type_filter = match q.activity_type {
        None | Some(ActivityType::All) => None,
        Some(ty) => Some(ty.as_str()),
    };

    let (total, mut list) = state
        .db
        .list_activities(athlete.athlete_id, type_filter, page_size, offset)
        .await?;

    for item in &mut list {
        item.average_speed = transform_velocity(item.average_speed, &item.activity_type);
        item.max_speed = transform_velocity(item.max_speed, &item.activity_type);
    }

    Ok(Json(serde_json::json!({
        "total": total,
        "list": list,
    })))
}

/// One activity with the chart-relevant slices of its stream document.
async fn get_activity(
    State(state): State<Arc<AppState>>,
    Extension(athlete): Extension<AuthAthlete>,
    Path(activity_id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    let mut activity = state
        .db
        .get_activity(activity_id, athlete.athlete_id)
        .await?
        .ok_or_else(|| AppError::NotFound("activity not found".to_string()))?;

    let mut streams = StreamSet::default();
    if let Some(row) = state.db.get_activity_stream(activity_id).await? {
        streams = serde_json::from_value(row.series).map_err(|e| {
            AppError::Internal(anyhow::anyhow!(
                "Corrupt stream document for activity {}: {}",
                activity_id,
                e
            ))
        })?;
    }

    if let Some(vel) = &mut streams.velocity_smooth {
        for v in &mut vel.data {
            *v = transform_velocity(*v, &activity.activity_type);
        }
    }
    activity.average_speed = transform_velocity(activity.average_speed, &activity.activity_type);

    Ok(Json(serde_json::json!({
        "activity": activity,
        "distance": streams.distance,
        "velocity_smooth": streams.velocity_smooth,
        "heartrate": streams.heartrate,
        "altitude": streams.altitude,
    })))
}
