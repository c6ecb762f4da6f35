// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Stored activity rows and the stream-set document.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalized activity row, one per external activity id.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ActivityDetail {
    /// External activity id assigned by Strava (primary key).
    pub id: i64,
    pub athlete_id: i64,
    pub name: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub activity_type: String,
    /// Meters.
    pub distance: f64,
    /// Seconds.
    pub moving_time: i32,
    /// Seconds.
    pub elapsed_time: i32,
    pub total_elevation_gain: f64,
    pub start_date_local: NaiveDateTime,
    pub polyline: String,
    pub summary_polyline: String,
    pub average_speed: f64,
    pub max_speed: f64,
    pub average_heartrate: f64,
    pub max_heartrate: f64,
    pub elev_high: f64,
    pub elev_low: f64,
    pub calories: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub splits_metric: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_efforts: Option<serde_json::Value>,
    pub device_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: i64,
}

/// Subset of columns returned by the paged list endpoint.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ActivitySummary {
    pub id: i64,
    pub name: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub activity_type: String,
    pub distance: f64,
    pub moving_time: i32,
    pub elapsed_time: i32,
    pub total_elevation_gain: f64,
    pub start_date_local: NaiveDateTime,
    pub summary_polyline: String,
    pub average_speed: f64,
    pub max_speed: f64,
    pub average_heartrate: f64,
    pub max_heartrate: f64,
    pub elev_high: f64,
    pub elev_low: f64,
    pub calories: f64,
}

/// Raw upstream payload, kept verbatim for reprocessing.
#[derive(Debug, Clone)]
pub struct ActivityRaw {
    pub id: i64,
    pub data: String,
}

/// Stream row: the activity's time-series as one structured document.
///
/// `id` equals the corresponding [`ActivityDetail`] id (1:1).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ActivityStream {
    pub id: i64,
    pub series: serde_json::Value,
}

/// A single time-series as returned by the upstream streams endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stream<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_type: Option<String>,
    #[serde(default)]
    pub data: Vec<T>,
}

/// The sparse bag of per-metric time-series for one activity.
///
/// Every series is independently optional: some activity types lack some
/// sensors. Present series must agree on sample count; see
/// [`StreamSet::sample_count_mismatch`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<Stream<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<Stream<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latlng: Option<Stream<[f64; 2]>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<Stream<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity_smooth: Option<Stream<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heartrate: Option<Stream<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cadence: Option<Stream<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watts: Option<Stream<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp: Option<Stream<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moving: Option<Stream<bool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade_smooth: Option<Stream<f64>>,
}

impl StreamSet {
    /// Returns the lengths of the first two present series that disagree,
    /// or `None` when all present series share one sample count.
    pub fn sample_count_mismatch(&self) -> Option<(usize, usize)> {
        let mut expected: Option<usize> = None;
        for len in self.present_lengths() {
            match expected {
                None => expected = Some(len),
                Some(e) if e != len => return Some((e, len)),
                Some(_) => {}
            }
        }
        None
    }

    fn present_lengths(&self) -> Vec<usize> {
        let mut lengths = Vec::new();
        if let Some(s) = &self.time {
            lengths.push(s.data.len());
        }
        if let Some(s) = &self.distance {
            lengths.push(s.data.len());
        }
        if let Some(s) = &self.latlng {
            lengths.push(s.data.len());
        }
        if let Some(s) = &self.altitude {
            lengths.push(s.data.len());
        }
        if let Some(s) = &self.velocity_smooth {
            lengths.push(s.data.len());
        }
        if let Some(s) = &self.heartrate {
            lengths.push(s.data.len());
        }
        if let Some(s) = &self.cadence {
            lengths.push(s.data.len());
        }
        if let Some(s) = &self.watts {
            lengths.push(s.data.len());
        }
        if let Some(s) = &self.temp {
            lengths.push(s.data.len());
        }
        if let Some(s) = &self.moving {
            lengths.push(s.data.len());
        }
        if let Some(s) = &self.grade_smooth {
            lengths.push(s.data.len());
        }
        lengths
    }
}
