// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Statistics engine: goal-progress snapshots and date-bucketed series.
//!
//! The database hands back raw aggregates; everything date- and
//! display-shaped (bucket generation, zero filling, unit scaling, marker
//! extraction, goal sentinels) happens here in plain functions.

use crate::db::Db;
use crate::error::Result;
use crate::models::{ActivityType, AggMethod, AggStats, Freq, ProgressStats, StatsField};
use chrono::{Datelike, Months, NaiveDate, Utc};
use std::collections::HashMap;

/// Placeholder rendered when a frequency has no configured goal.
const NOT_EXISTS_LABEL: &str = "--";

/// Buckets are capped per frequency.
const LIMIT_WEEK: usize = 12;
const LIMIT_MONTH: usize = 12;
const LIMIT_YEAR: usize = 12;

/// Read-side statistics over the activity store.
#[derive(Clone)]
pub struct StatsService {
    db: Db,
}

impl StatsService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Goal-progress snapshot: week/month/year-to-date and all-time
    /// aggregates next to the athlete's configured targets.
    pub async fn progress_stats(
        &self,
        athlete_id: i64,
        activity_type: ActivityType,
        field: StatsField,
        method: AggMethod,
    ) -> Result<ProgressStats> {
        let today = Utc::now().date_naive();
        let ty = activity_type.as_str();

        let week = self
            .db
            .activity_progress_value(athlete_id, ty, method, field, Some(week_floor(today)))
            .await?;
        let month = self
            .db
            .activity_progress_value(athlete_id, ty, method, field, Some(month_floor(today)))
            .await?;
        let year = self
            .db
            .activity_progress_value(athlete_id, ty, method, field, Some(year_floor(today)))
            .await?;
        let all = self
            .db
            .activity_progress_value(athlete_id, ty, method, field, None)
            .await?;

        let goals = self.db.goal_values(athlete_id, ty, field.column()).await?;

        Ok(format_progress(
            ty,
            field,
            PeriodValues {
                week,
                month,
                year,
                all,
            },
            &goals,
        ))
    }

    /// Fixed-length date-bucketed series for charting.
    pub async fn agg_stats(
        &self,
        athlete_id: i64,
        activity_type: ActivityType,
        field: StatsField,
        method: AggMethod,
        freq: Freq,
        size: usize,
    ) -> Result<AggStats> {
        let today = Utc::now().date_naive();
        let (start, size) = find_start_date(freq, size, today);

        let val_map = self
            .db
            .activity_agg_values(
                athlete_id,
                activity_type.as_str(),
                method,
                field,
                start,
                freq.as_str(),
            )
            .await?;

        let (time, value) = make_chart_data(freq, &val_map, start, today, field.fraction());
        let (time, value) = keep_last(time, value, size);
        let (max, min, avg, max_index, min_index) = find_marker(&value);

        Ok(AggStats {
            value,
            time,
            max,
            min,
            avg,
            max_index,
            min_index,
        })
    }
}

/// Period aggregates as they come back from the store.
struct PeriodValues {
    week: f64,
    month: f64,
    year: f64,
    all: f64,
}

/// Most recent Monday (today when today is a Monday).
fn week_floor(today: NaiveDate) -> NaiveDate {
    today - chrono::Duration::days(today.weekday().num_days_from_monday() as i64)
}

fn month_floor(today: NaiveDate) -> NaiveDate {
    today.with_day(1).unwrap_or(today)
}

fn year_floor(today: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today)
}

/// Bucket start date for the chart query, with the caller's size capped
/// per frequency. The start is aligned to a bucket boundary so generated
/// buckets line up with the store's truncated dates.
fn find_start_date(freq: Freq, size: usize, today: NaiveDate) -> (NaiveDate, usize) {
    match freq {
        Freq::Week => {
            let size = size.min(LIMIT_WEEK);
            let back = today - chrono::Duration::days(7 * size as i64);
            (week_floor(back), size)
        }
        Freq::Month => {
            let size = size.min(LIMIT_MONTH);
            let back = today
                .checked_sub_months(Months::new(size as u32))
                .unwrap_or(today);
            (month_floor(back), size)
        }
        Freq::Year => {
            let size = size.min(LIMIT_YEAR);
            let start = NaiveDate::from_ymd_opt(today.year() - size as i32, 1, 1).unwrap_or(today);
            (start, size)
        }
    }
}

/// Walk from `start` to `today` one bucket per period, filling 0.0 where
/// the sparse map has no value and applying the unit-scale divisor.
///
/// Months advance by constructing the first of the next month, never by
/// adding days: day arithmetic drifts across months of different lengths.
fn make_chart_data(
    freq: Freq,
    val_map: &HashMap<NaiveDate, f64>,
    start: NaiveDate,
    today: NaiveDate,
    fraction: f64,
) -> (Vec<String>, Vec<f64>) {
    let mut date = Vec::new();
    let mut value = Vec::new();

    let mut cur = start;
    while cur <= today {
        let key = cur;
        match freq {
            Freq::Week => {
                date.push(cur.format("%m-%d").to_string());
                cur += chrono::Duration::days(7);
            }
            Freq::Month => {
                date.push(cur.format("%m").to_string());
                let (year, month) = (cur.year(), cur.month());
                cur = if month == 12 {
                    NaiveDate::from_ymd_opt(year + 1, 1, 1).unwrap_or(cur)
                } else {
                    NaiveDate::from_ymd_opt(year, month + 1, 1).unwrap_or(cur)
                };
            }
            Freq::Year => {
                date.push(cur.format("%Y").to_string());
                cur = NaiveDate::from_ymd_opt(cur.year() + 1, 1, 1).unwrap_or(cur);
            }
        }
        value.push(val_map.get(&key).map(|v| v / fraction).unwrap_or(0.0));
    }

    (date, value)
}

/// Keep the most recent `size` buckets.
fn keep_last(
    mut date: Vec<String>,
    mut value: Vec<f64>,
    size: usize,
) -> (Vec<String>, Vec<f64>) {
    if value.len() > size {
        value.drain(..value.len() - size);
        date.drain(..date.len() - size);
    }
    (date, value)
}

/// Series markers: max/min/avg over non-zero buckets plus their indices.
///
/// Zero denotes "no activity", not "zero achievement", so zero buckets are
/// ignored. An all-zero series yields (0, 0, 0, 0, 0), and when the only
/// non-zero bucket is the max, min collapses to (0, 0) as well.
fn find_marker(data: &[f64]) -> (f64, f64, f64, usize, usize) {
    if data.is_empty() {
        return (0.0, 0.0, 0.0, 0, 0);
    }

    let mut max = data[0];
    let mut min = -1.0;
    let mut max_index = 0usize;
    let mut min_index: i64 = -1;
    let mut cnt = 0u32;
    let mut sum = 0.0;

    for (i, &item) in data.iter().enumerate() {
        // ignore zero value
        if item == 0.0 {
            continue;
        }
        if item > max {
            max = item;
            max_index = i;
        }
        if item < min || min == -1.0 {
            min = item;
            min_index = i as i64;
        }
        sum += item;
        cnt += 1;
    }

    if min_index == -1 || min_index as usize == max_index {
        min_index = 0;
        min = 0.0;
    }

    let avg = if cnt != 0 { sum / f64::from(cnt) } else { 0.0 };

    (max, min, avg, max_index, min_index as usize)
}

/// Render the progress snapshot, substituting the `"--"` sentinel for
/// frequencies without a configured goal.
fn format_progress(
    activity_type: &str,
    field: StatsField,
    values: PeriodValues,
    goals: &HashMap<String, f64>,
) -> ProgressStats {
    let fraction = field.fraction();
    let goal = |freq: &str| goals.get(freq).copied().unwrap_or(0.0);

    let mut r = ProgressStats {
        unit: field.unit().to_string(),
        activity_type: activity_type.to_string(),
        all: fmt0(values.all / fraction),

        week: fmt0(values.week / fraction),
        week_goal: fmt0(goal("week") / fraction),
        week_process: String::new(),

        month: fmt0(values.month / fraction),
        month_goal: fmt0(goal("month") / fraction),
        month_process: String::new(),

        year: fmt0(values.year / fraction),
        year_goal: fmt0(goal("year") / fraction),
        year_process: String::new(),
    };

    if goal("week") as i64 == 0 {
        r.week_goal = NOT_EXISTS_LABEL.to_string();
        r.week_process = NOT_EXISTS_LABEL.to_string();
    } else {
        r.week_process = fmt0(values.week / goal("week") * 100.0);
    }
    if goal("month") as i64 == 0 {
        r.month_goal = NOT_EXISTS_LABEL.to_string();
        r.month_process = NOT_EXISTS_LABEL.to_string();
    } else {
        r.month_process = fmt0(values.month / goal("month") * 100.0);
    }
    if goal("year") as i64 == 0 {
        r.year_goal = NOT_EXISTS_LABEL.to_string();
        r.year_process = NOT_EXISTS_LABEL.to_string();
    } else {
        r.year_process = fmt0(values.year / goal("year") * 100.0);
    }

    r
}

fn fmt0(v: f64) -> String {
    format!("{:.0}", v)
}

/// Display transform for stored velocities (meters/second).
///
/// Runs render as pace (min/km, fractional minutes encode seconds), rides
/// as km/h; anything else keeps the raw value.
pub fn transform_velocity(vel: f64, activity_type: &str) -> f64 {
    if vel == 0.0 {
        return vel;
    }
    match activity_type {
        "run" => {
            let t = 16.666666667 / vel;
            let minutes = t.trunc();
            let seconds = (t - minutes) * 60.0 / 100.0;
            minutes + seconds
        }
        "ride" | "virtualride" => 3.6 * vel,
        _ => vel,
    }
}
