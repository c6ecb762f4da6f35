// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Paceline API Server
//!
//! Ingests Strava activities via webhook push events and serves
//! goal-progress and chart statistics over the stored data.

use paceline::{
    cache::Cacher,
    config::Config,
    db::Db,
    services::{IngestService, StatsService, StravaClient, TokenStore},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Paceline API");

    // Initialize PostgreSQL and apply migrations
    let db = Db::connect(&config.database_url)
        .await
        .expect("Failed to connect to PostgreSQL");
    db.migrate().await.expect("Failed to run migrations");

    // Initialize the token cache (Redis)
    let cacher = Cacher::connect(&config.redis_url)
        .await
        .expect("Failed to connect to Redis");
    let tokens = TokenStore::new(cacher);
    tracing::info!("Token cache initialized");

    // Upstream Strava client
    let strava = StravaClient::new(
        config.strava_client_id.clone(),
        config.strava_client_secret.clone(),
    );

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db: db.clone(),
        ingest: IngestService::new(db.clone(), tokens, strava),
        stats: StatsService::new(db),
    });

    // Build router
    let app = paceline::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("paceline=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
