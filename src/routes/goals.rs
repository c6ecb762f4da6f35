// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Goal CRUD endpoints.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthAthlete;
use crate::models::{ActivityType, Freq, Goal, StatsField};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/strava/goals", get(query_goals).post(create_goal))
        .route("/api/strava/goals/{id}", put(update_goal).delete(delete_goal))
}

#[derive(Deserialize)]
struct CreateGoalReq {
    #[serde(rename = "type")]
    activity_type: ActivityType,
    field: StatsField,
    freq: Freq,
    value: f64,
}

/// Create a goal. A live goal for the same (type, field, freq) already
/// existing is a conflict.
async fn create_goal(
    State(state): State<Arc<AppState>>,
    Extension(athlete): Extension<AuthAthlete>,
    Json(req): Json<CreateGoalReq>,
) -> Result<Json<Goal>> {
    if req.value < 1.0 {
        return Err(AppError::BadRequest("goal value must be >= 1".to_string()));
    }

    let goal = state
        .db
        .create_goal(
            athlete.athlete_id,
            req.activity_type.as_str(),
            req.field.column(),
            req.freq.as_str(),
            req.value,
        )
        .await?;

    tracing::info!(
        athlete_id = athlete.athlete_id,
        goal_id = goal.id,
        freq = %goal.freq,
        "Goal created"
    );

    Ok(Json(goal))
}

#[derive(Deserialize)]
struct QueryGoalReq {
    #[serde(rename = "type")]
    activity_type: ActivityType,
    field: StatsField,
}

/// List goals for one (type, field) across frequencies.
async fn query_goals(
    State(state): State<Arc<AppState>>,
    Extension(athlete): Extension<AuthAthlete>,
    Query(req): Query<QueryGoalReq>,
) -> Result<Json<Vec<Goal>>> {
    let goals = state
        .db
        .query_goals(
            athlete.athlete_id,
            req.activity_type.as_str(),
            req.field.column(),
        )
        .await?;
    Ok(Json(goals))
}

#[derive(Deserialize)]
struct UpdateGoalReq {
    value: f64,
}

/// Update a goal's target value by id.
async fn update_goal(
    State(state): State<Arc<AppState>>,
    Extension(athlete): Extension<AuthAthlete>,
    Path(goal_id): Path<i64>,
    Json(req): Json<UpdateGoalReq>,
) -> Result<StatusCode> {
    if req.value < 1.0 {
        return Err(AppError::BadRequest("goal value must be >= 1".to_string()));
    }

    state
        .db
        .update_goal_value(athlete.athlete_id, goal_id, req.value)
        .await?;

    Ok(StatusCode::OK)
}

/// Delete a goal by id.
async fn delete_goal(
    State(state): State<Arc<AppState>>,
    Extension(athlete): Extension<AuthAthlete>,
    Path(goal_id): Path<i64>,
) -> Result<StatusCode> {
    state.db.delete_goal(athlete.athlete_id, goal_id).await?;
    Ok(StatusCode::OK)
}
