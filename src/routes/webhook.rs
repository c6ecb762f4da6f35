// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Webhook routes for Strava push events.

use crate::error::{AppError, Result};
use crate::models::SubscriptionEvent;
use crate::AppState;
use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;

/// Webhook routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/strava/push", get(verify).post(push))
}

/// Strava webhook verification query params.
#[derive(Deserialize)]
struct VerifyParams {
    #[serde(rename = "hub.mode")]
    mode: String,
    #[serde(rename = "hub.challenge")]
    challenge: String,
    #[serde(rename = "hub.verify_token")]
    verify_token: String,
}

/// Verify webhook subscription (GET).
///
/// Echoes the challenge back when the verify token matches the configured
/// secret.
async fn verify(
    State(state): State<Arc<AppState>>,
    Query(params): Query<VerifyParams>,
) -> Result<Json<serde_json::Value>> {
    if params.mode != "subscribe" || params.challenge.is_empty() {
        return Err(AppError::BadRequest(
            "invalid subscription handshake".to_string(),
        ));
    }
    if params.verify_token != state.config.webhook_verify_token {
        tracing::warn!("Webhook verification failed: invalid token");
        return Err(AppError::BadRequest("verify token".to_string()));
    }

    tracing::info!("Webhook subscription verified");
    Ok(Json(serde_json::json!({
        "code": 200,
        "hub.challenge": params.challenge,
    })))
}

/// Handle incoming webhook events (POST).
///
/// Non-2xx responses make Strava redeliver, which is the pipeline's only
/// retry mechanism; client errors (4xx) are terminal by design.
async fn push(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<serde_json::Value>,
) -> Result<StatusCode> {
    let event: SubscriptionEvent = serde_json::from_value(payload)
        .map_err(|e| AppError::BadRequest(format!("malformed push event: {}", e)))?;

    tracing::info!(
        object_type = %event.object_type,
        object_id = event.object_id,
        aspect_type = %event.aspect_type,
        owner_id = event.owner_id,
        "Webhook event received"
    );

    state.ingest.push(&event).await?;

    Ok(StatusCode::OK)
}
