// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use paceline::cache::Cacher;
use paceline::config::Config;
use paceline::db::Db;
use paceline::middleware::auth::create_jwt;
use paceline::routes::create_router;
use paceline::services::{IngestService, StatsService, StravaClient, TokenStore};
use paceline::AppState;
use std::sync::Arc;

/// Check if a test database is available via environment variable.
#[allow(dead_code)]
pub fn pg_available() -> bool {
    std::env::var("TEST_DATABASE_URL").is_ok()
}

/// Skip test with message if no test database is available.
#[macro_export]
macro_rules! require_pg {
    () => {
        if !crate::common::pg_available() {
            eprintln!("⚠️  Skipping: TEST_DATABASE_URL not set");
            return;
        }
    };
}

/// Connect to the test database and apply migrations.
#[allow(dead_code)]
pub async fn test_db() -> Db {
    let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
    let db = Db::connect(&url)
        .await
        .expect("Failed to connect to test database");
    db.migrate().await.expect("Failed to run migrations");
    db
}

/// Create a database client that never connects (offline mode).
///
/// Operations fail at query time; router construction and handlers that
/// never reach the database work normally.
#[allow(dead_code)]
pub fn test_db_offline() -> Db {
    Db::connect_lazy("postgres://postgres@127.0.0.1:9/paceline_offline")
        .expect("lazy pool should build")
}

/// Build a test app over explicit dependencies.
#[allow(dead_code)]
pub fn create_test_app_with(
    db: Db,
    tokens: TokenStore,
    strava: StravaClient,
) -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let state = Arc::new(AppState {
        config,
        db: db.clone(),
        ingest: IngestService::new(db.clone(), tokens, strava),
        stats: StatsService::new(db),
    });
    (create_router(state.clone()), state)
}

/// Create a test app with offline dependencies (no Postgres, no Redis).
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let db = test_db_offline();
    let strava = StravaClient::new(
        config.strava_client_id.clone(),
        config.strava_client_secret.clone(),
    );
    create_test_app_with(db, TokenStore::new(Cacher::new_memory()), strava)
}

/// Bearer header value for an authenticated test request.
#[allow(dead_code)]
pub fn auth_header(athlete_id: i64) -> String {
    let config = Config::test_default();
    let jwt = create_jwt(athlete_id, &config.jwt_signing_key).expect("jwt should sign");
    format!("Bearer {}", jwt)
}

/// Unique id for test rows, derived from the clock.
#[allow(dead_code)]
pub fn unique_id() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    (SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos()
        % 1_000_000_000_000) as i64
}
