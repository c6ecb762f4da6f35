// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Paceline: Strava activity ingestion and statistics backend.
//!
//! Webhook push events drive the ingestion pipeline (token cache ->
//! upstream fetch -> atomic persist); the statistics engine aggregates
//! stored activities into goal-progress snapshots and chart series.

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::Db;
use services::{IngestService, StatsService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Db,
    pub ingest: IngestService,
    pub stats: StatsService,
}
