// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Whitelisted statistics dimensions and response shapes.
//!
//! The aggregation method and metric field end up interpolated into SQL,
//! so both are closed enums: the parser at the API boundary is the
//! whitelist.

use serde::{Deserialize, Serialize};

/// Activity type filter accepted by the read endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    All,
    Run,
    Ride,
    #[serde(rename = "virtualride")]
    VirtualRide,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::All => "all",
            ActivityType::Run => "run",
            ActivityType::Ride => "ride",
            ActivityType::VirtualRide => "virtualride",
        }
    }
}

/// Numeric metric a statistic is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatsField {
    Distance,
    MovingTime,
    Calories,
}

impl StatsField {
    /// Column name in `activity_detail`.
    pub fn column(&self) -> &'static str {
        match self {
            StatsField::Distance => "distance",
            StatsField::MovingTime => "moving_time",
            StatsField::Calories => "calories",
        }
    }

    /// Unit-scale divisor applied before display (meters -> km).
    pub fn fraction(&self) -> f64 {
        match self {
            StatsField::Distance => 1000.0,
            _ => 1.0,
        }
    }

    /// Display unit label.
    pub fn unit(&self) -> &'static str {
        match self {
            StatsField::Distance => "km",
            StatsField::MovingTime => "s",
            StatsField::Calories => "Cal",
        }
    }
}

/// SQL aggregation method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggMethod {
    Sum,
    Avg,
    Max,
    Min,
}

impl AggMethod {
    pub fn sql(&self) -> &'static str {
        match self {
            AggMethod::Sum => "sum",
            AggMethod::Avg => "avg",
            AggMethod::Max => "max",
            AggMethod::Min => "min",
        }
    }
}

/// Chart bucket frequency. Doubles as the `date_trunc` precision argument
/// and the goal frequency key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Freq {
    Week,
    Month,
    Year,
}

impl Freq {
    pub fn as_str(&self) -> &'static str {
        match self {
            Freq::Week => "week",
            Freq::Month => "month",
            Freq::Year => "year",
        }
    }
}

/// Goal-progress snapshot: now vs. week/month/year-to-date vs. target.
///
/// Values are pre-formatted strings; frequencies without a configured goal
/// carry the `"--"` sentinel in both goal and process slots.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressStats {
    pub unit: String,
    #[serde(rename = "type")]
    pub activity_type: String,

    pub all: String,

    pub week: String,
    pub week_goal: String,
    pub week_process: String,

    pub month: String,
    pub month_goal: String,
    pub month_process: String,

    pub year: String,
    pub year_goal: String,
    pub year_process: String,
}

/// Date-bucketed aggregate series with markers, for charting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggStats {
    pub value: Vec<f64>,
    pub time: Vec<String>,
    pub max: f64,
    pub min: f64,
    pub avg: f64,
    pub max_index: usize,
    pub min_index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_parsing_is_the_whitelist() {
        assert_eq!(
            serde_json::from_str::<StatsField>("\"moving_time\"").unwrap(),
            StatsField::MovingTime
        );
        assert!(serde_json::from_str::<StatsField>("\"start_date_local); DROP TABLE\"").is_err());
    }

    #[test]
    fn test_fraction_and_unit() {
        assert_eq!(StatsField::Distance.fraction(), 1000.0);
        assert_eq!(StatsField::Calories.fraction(), 1.0);
        assert_eq!(StatsField::Distance.unit(), "km");
        assert_eq!(StatsField::MovingTime.unit(), "s");
    }

    #[test]
    fn test_virtualride_wire_name() {
        assert_eq!(
            serde_json::from_str::<ActivityType>("\"virtualride\"").unwrap(),
            ActivityType::VirtualRide
        );
    }
}
