// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity storage: raw payloads, normalized detail rows, stream
//! documents, and the aggregate queries behind the statistics engine.

use super::Db;
use crate::error::AppError;
use crate::models::{
    ActivityDetail, ActivityRaw, ActivityStream, ActivitySummary, AggMethod, StatsField,
};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;

const DETAIL_COLUMNS: &str = "id, athlete_id, name, type, distance, moving_time, elapsed_time, \
     total_elevation_gain, start_date_local, polyline, summary_polyline, average_speed, \
     max_speed, average_heartrate, max_heartrate, elev_high, elev_low, calories, \
     splits_metric, best_efforts, device_name, created_at, updated_at, deleted_at";

const SUMMARY_COLUMNS: &str = "id, name, type, distance, moving_time, elapsed_time, \
     total_elevation_gain, start_date_local, summary_polyline, average_speed, max_speed, \
     average_heartrate, max_heartrate, elev_high, elev_low, calories";

impl Db {
    /// Atomically persist one ingested activity: raw payload, normalized
    /// detail row, stream document, and the processed flag on the push
    /// event. Any failure rolls the whole transaction back.
    pub async fn insert_activity_atomic(
        &self,
        raw: &ActivityRaw,
        detail: &ActivityDetail,
        stream_doc: &serde_json::Value,
    ) -> Result<(), AppError> {
        let mut tx = self.pool().begin().await?;

        sqlx::query("INSERT INTO activity_raw (id, data) VALUES ($1, $2)")
            .bind(raw.id)
            .bind(&raw.data)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO activity_detail (id, athlete_id, name, type, distance, moving_time, \
                 elapsed_time, total_elevation_gain, start_date_local, polyline, \
                 summary_polyline, average_speed, max_speed, average_heartrate, max_heartrate, \
                 elev_high, elev_low, calories, splits_metric, best_efforts, device_name) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
                 $17, $18, $19, $20, $21)",
        )
        .bind(detail.id)
        .bind(detail.athlete_id)
        .bind(&detail.name)
        .bind(&detail.activity_type)
        .bind(detail.distance)
        .bind(detail.moving_time)
        .bind(detail.elapsed_time)
        .bind(detail.total_elevation_gain)
        .bind(detail.start_date_local)
        .bind(&detail.polyline)
        .bind(&detail.summary_polyline)
        .bind(detail.average_speed)
        .bind(detail.max_speed)
        .bind(detail.average_heartrate)
        .bind(detail.max_heartrate)
        .bind(detail.elev_high)
        .bind(detail.elev_low)
        .bind(detail.calories)
        .bind(&detail.splits_metric)
        .bind(&detail.best_efforts)
        .bind(&detail.device_name)
        .execute(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO activity_stream (id, series) VALUES ($1, $2)")
            .bind(detail.id)
            .bind(stream_doc)
            .execute(&mut *tx)
            .await?;

        Self::mark_push_event_processed(&mut tx, detail.id).await?;

        tx.commit().await?;

        tracing::info!(
            activity_id = detail.id,
            athlete_id = detail.athlete_id,
            "Activity persisted atomically"
        );

        Ok(())
    }

    /// Fetch one detail row, athlete-scoped.
    pub async fn get_activity(
        &self,
        activity_id: i64,
        athlete_id: i64,
    ) -> Result<Option<ActivityDetail>, AppError> {
        let row = sqlx::query_as::<_, ActivityDetail>(&format!(
            "SELECT {DETAIL_COLUMNS} FROM activity_detail \
             WHERE id = $1 AND athlete_id = $2 AND deleted_at = 0",
        ))
        .bind(activity_id)
        .bind(athlete_id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row)
    }

    /// Fetch the stream document for an activity.
    pub async fn get_activity_stream(
        &self,
        activity_id: i64,
    ) -> Result<Option<ActivityStream>, AppError> {
        let row = sqlx::query_as::<_, ActivityStream>(
            "SELECT id, series FROM activity_stream WHERE id = $1",
        )
        .bind(activity_id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row)
    }

    /// Paged activity list, newest first, optionally filtered by type.
    /// Returns the total row count alongside the page.
    pub async fn list_activities(
        &self,
        athlete_id: i64,
        activity_type: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(i64, Vec<ActivitySummary>), AppError> {
        let (total, list) = if let Some(ty) = activity_type {
            let total = sqlx::query_scalar::<_, i64>(
                "SELECT count(*) FROM activity_detail \
                 WHERE athlete_id = $1 AND type = $2 AND deleted_at = 0",
            )
            .bind(athlete_id)
            .bind(ty)
            .fetch_one(self.pool())
            .await?;

            let list = sqlx::query_as::<_, ActivitySummary>(&format!(
                "SELECT {SUMMARY_COLUMNS} FROM activity_detail \
                 WHERE athlete_id = $1 AND type = $2 AND deleted_at = 0 \
                 ORDER BY id DESC LIMIT $3 OFFSET $4",
            ))
            .bind(athlete_id)
            .bind(ty)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool())
            .await?;

            (total, list)
        } else {
            let total = sqlx::query_scalar::<_, i64>(
                "SELECT count(*) FROM activity_detail WHERE athlete_id = $1 AND deleted_at = 0",
            )
            .bind(athlete_id)
            .fetch_one(self.pool())
            .await?;

            let list = sqlx::query_as::<_, ActivitySummary>(&format!(
                "SELECT {SUMMARY_COLUMNS} FROM activity_detail \
                 WHERE athlete_id = $1 AND deleted_at = 0 \
                 ORDER BY id DESC LIMIT $2 OFFSET $3",
            ))
            .bind(athlete_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool())
            .await?;

            (total, list)
        };

        Ok((total, list))
    }

    /// One scalar aggregate over a metric field, bounded below by an
    /// optional date floor. The method and field are closed enums, so the
    /// interpolation cannot carry user input.
    pub async fn activity_progress_value(
        &self,
        athlete_id: i64,
        activity_type: &str,
        method: AggMethod,
        field: StatsField,
        start: Option<NaiveDate>,
    ) -> Result<f64, AppError> {
        let sql = format!(
            "SELECT COALESCE({method}({field}), 0)::float8 FROM activity_detail \
             WHERE athlete_id = $1 AND type = $2 AND deleted_at = 0",
            method = method.sql(),
            field = field.column(),
        );

        let value = if let Some(start) = start {
            sqlx::query_scalar::<_, f64>(&format!("{sql} AND start_date_local >= $3"))
                .bind(athlete_id)
                .bind(activity_type)
                .bind(start_of_day(start))
                .fetch_one(self.pool())
                .await?
        } else {
            sqlx::query_scalar::<_, f64>(&sql)
                .bind(athlete_id)
                .bind(activity_type)
                .fetch_one(self.pool())
                .await?
        };

        Ok(value)
    }

    /// Aggregate grouped by truncated date, as a sparse map from bucket
    /// start date to value.
    pub async fn activity_agg_values(
        &self,
        athlete_id: i64,
        activity_type: &str,
        method: AggMethod,
        field: StatsField,
        start: NaiveDate,
        freq: &str,
    ) -> Result<HashMap<NaiveDate, f64>, AppError> {
        let sql = format!(
            "SELECT date_trunc($4, start_date_local)::date AS bucket, \
                    COALESCE({method}({field}), 0)::float8 AS value \
             FROM activity_detail \
             WHERE athlete_id = $1 AND type = $2 AND deleted_at = 0 \
                   AND start_date_local >= $3 \
             GROUP BY 1 ORDER BY 1",
            method = method.sql(),
            field = field.column(),
        );

        let rows = sqlx::query_as::<_, (NaiveDate, f64)>(&sql)
            .bind(athlete_id)
            .bind(activity_type)
            .bind(start_of_day(start))
            .bind(freq)
            .fetch_all(self.pool())
            .await?;

        Ok(rows.into_iter().collect())
    }
}

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(0, 0, 0).unwrap_or_default()
}
