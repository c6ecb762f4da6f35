// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod ingest;
pub mod stats;
pub mod strava;
pub mod token;

pub use ingest::IngestService;
pub use stats::StatsService;
pub use strava::StravaClient;
pub use token::TokenStore;
