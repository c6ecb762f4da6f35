// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Statistics engine tests over seeded rows in a real Postgres.
//! Set TEST_DATABASE_URL to run these.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, NaiveDateTime, Utc};
use paceline::db::Db;
use paceline::models::{ActivityDetail, ActivityRaw, ActivityType, AggMethod, Freq, StatsField};
use paceline::services::StatsService;
use tower::ServiceExt;

async fn seed_activity(
    db: &Db,
    id: i64,
    athlete_id: i64,
    activity_type: &str,
    start: NaiveDateTime,
    distance: f64,
) {
    let now = Utc::now();
    let detail = ActivityDetail {
        id,
        athlete_id,
        name: format!("seed {}", id),
        activity_type: activity_type.to_string(),
        distance,
        moving_time: 1800,
        elapsed_time: 1900,
        total_elevation_gain: 10.0,
        start_date_local: start,
        polyline: String::new(),
        summary_polyline: String::new(),
        average_speed: 3.0,
        max_speed: 4.0,
        average_heartrate: 140.0,
        max_heartrate: 160.0,
        elev_high: 100.0,
        elev_low: 50.0,
        calories: 300.0,
        splits_metric: None,
        best_efforts: None,
        device_name: String::new(),
        created_at: now,
        updated_at: now,
        deleted_at: 0,
    };
    let raw = ActivityRaw {
        id,
        data: "{}".to_string(),
    };
    db.insert_activity_atomic(&raw, &detail, &serde_json::json!({}))
        .await
        .expect("seed activity");
}

#[tokio::test]
async fn test_progress_snapshot_with_goal_sentinel() {
    require_pg!();
    let db = common::test_db().await;
    let athlete = common::unique_id();
    let base = common::unique_id() * 10;
    let now = Utc::now().naive_utc();

    // One run today, one run 400 days back, one ride today (other type).
    seed_activity(&db, base + 1, athlete, "run", now, 5000.0).await;
    seed_activity(&db, base + 2, athlete, "run", now - Duration::days(400), 3000.0).await;
    seed_activity(&db, base + 3, athlete, "ride", now, 7000.0).await;

    // Weekly goal only; month and year stay unset.
    db.create_goal(athlete, "run", "distance", "week", 10000.0)
        .await
        .unwrap();

    let config = paceline::config::Config::test_default();
    let strava = paceline::services::StravaClient::new(
        config.strava_client_id.clone(),
        config.strava_client_secret.clone(),
    );
    let tokens = paceline::services::TokenStore::new(paceline::cache::Cacher::new_memory());
    let (app, _) = common::create_test_app_with(db, tokens, strava);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/strava/activities/progress?type=run&field=distance&method=sum")
                .header("authorization", common::auth_header(athlete))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(body["unit"], "km");
    assert_eq!(body["week"], "5");
    assert_eq!(body["week_goal"], "10");
    assert_eq!(body["week_process"], "50");
    // No monthly or yearly goal configured.
    assert_eq!(body["month_goal"], "--");
    assert_eq!(body["month_process"], "--");
    assert_eq!(body["year_goal"], "--");
    assert_eq!(body["year_process"], "--");
    // The ride and the 400-day-old run stay out of the run totals
    // except all-time, which picks up the old run.
    assert_eq!(body["year"], "5");
    assert_eq!(body["all"], "8");
}

#[tokio::test]
async fn test_progress_over_integer_column() {
    require_pg!();
    let db = common::test_db().await;
    let athlete = common::unique_id();
    let base = common::unique_id() * 10;
    let now = Utc::now().naive_utc();

    seed_activity(&db, base + 1, athlete, "run", now, 5000.0).await;

    let stats = StatsService::new(db);
    let r = stats
        .progress_stats(
            athlete,
            ActivityType::Run,
            StatsField::MovingTime,
            AggMethod::Sum,
        )
        .await
        .unwrap();

    assert_eq!(r.unit, "s");
    assert_eq!(r.week, "1800");
    assert_eq!(r.all, "1800");
}

#[tokio::test]
async fn test_month_chart_buckets_zero_filled() {
    require_pg!();
    let db = common::test_db().await;
    let athlete = common::unique_id();
    let base = common::unique_id() * 10;
    let now = Utc::now().naive_utc();

    seed_activity(&db, base + 1, athlete, "run", now, 5000.0).await;

    let stats = StatsService::new(db);
    let r = stats
        .agg_stats(
            athlete,
            ActivityType::Run,
            StatsField::Distance,
            AggMethod::Sum,
            Freq::Month,
            3,
        )
        .await
        .unwrap();

    assert_eq!(r.value.len(), 3);
    assert_eq!(r.time.len(), 3);
    assert_eq!(r.value, vec![0.0, 0.0, 5.0]);
    assert_eq!(
        r.time[2],
        Utc::now().date_naive().format("%m").to_string()
    );
    assert_eq!(r.max, 5.0);
    assert_eq!(r.max_index, 2);
    // The lone non-zero bucket collapses min to (0, 0).
    assert_eq!(r.min, 0.0);
    assert_eq!(r.min_index, 0);
    assert_eq!(r.avg, 5.0);
}

#[tokio::test]
async fn test_week_chart_groups_by_iso_week() {
    require_pg!();
    let db = common::test_db().await;
    let athlete = common::unique_id();
    let base = common::unique_id() * 10;
    let now = Utc::now().naive_utc();

    seed_activity(&db, base + 1, athlete, "run", now, 5000.0).await;
    seed_activity(&db, base + 2, athlete, "run", now - Duration::days(7), 3000.0).await;

    let stats = StatsService::new(db);
    let r = stats
        .agg_stats(
            athlete,
            ActivityType::Run,
            StatsField::Distance,
            AggMethod::Sum,
            Freq::Week,
            2,
        )
        .await
        .unwrap();

    assert_eq!(r.value, vec![3.0, 5.0]);
    assert_eq!(r.max, 5.0);
    assert_eq!(r.max_index, 1);
    assert_eq!(r.min, 3.0);
    assert_eq!(r.min_index, 0);
    assert_eq!(r.avg, 4.0);
}

#[tokio::test]
async fn test_empty_chart_is_all_zero_markers() {
    require_pg!();
    let db = common::test_db().await;
    let athlete = common::unique_id();

    let stats = StatsService::new(db);
    let r = stats
        .agg_stats(
            athlete,
            ActivityType::Run,
            StatsField::Distance,
            AggMethod::Sum,
            Freq::Month,
            6,
        )
        .await
        .unwrap();

    assert_eq!(r.value.len(), 6);
    assert!(r.value.iter().all(|v| *v == 0.0));
    assert_eq!(r.max, 0.0);
    assert_eq!(r.min, 0.0);
    assert_eq!(r.avg, 0.0);
    assert_eq!(r.max_index, 0);
    assert_eq!(r.min_index, 0);
}

#[tokio::test]
async fn test_chart_size_is_clamped() {
    require_pg!();
    let db = common::test_db().await;
    let athlete = common::unique_id();

    let stats = StatsService::new(db);
    let r = stats
        .agg_stats(
            athlete,
            ActivityType::Run,
            StatsField::Distance,
            AggMethod::Sum,
            Freq::Month,
            50,
        )
        .await
        .unwrap();

    assert_eq!(r.value.len(), 12);
}
