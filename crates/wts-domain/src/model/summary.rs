//! Aggregation outputs consumed by the presentation layer

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Record, Status};

/// Station filter value meaning "no filter"
pub const ALL_STATIONS: &str = "all";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationSummary {
    pub station: String,
    pub total_records: usize,
    pub total_weight: f64,
    pub avg_weight: f64,
    pub completed_count: usize,
    pub latest_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_weight: f64,
    pub total_entries: usize,
    pub completed_count: usize,
    pub completion_rate_percent: f64,
    pub avg_daily_weight: f64,
}

/// Total weight of one group in a top-N ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightGroup {
    pub key: String,
    pub total_weight: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyWeight {
    pub date: NaiveDate,
    pub total_weight: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusCount {
    pub label: String,
    pub status: Status,
    pub count: usize,
}

/// Entry of the station selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationOption {
    pub value: String,
    pub label: String,
}

/// Grouping key for weight rankings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKey {
    #[default]
    Task,
    Station,
    Status,
    Source,
}

impl GroupKey {
    pub fn select<'a>(&self, record: &'a Record) -> Option<&'a str> {
        let value = match self {
            GroupKey::Task => &record.task,
            GroupKey::Station => &record.station,
            GroupKey::Status => &record.status_label,
            GroupKey::Source => &record.source,
        };
        Some(value.as_str())
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GroupKey::Task => "task",
            GroupKey::Station => "station",
            GroupKey::Status => "status",
            GroupKey::Source => "source",
        };
        f.write_str(name)
    }
}

/// Which station's records a view covers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StationFilter {
    #[default]
    All,
    Station(String),
}

impl StationFilter {
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            StationFilter::All => true,
            StationFilter::Station(s) => record.station == *s,
        }
    }
}

impl FromStr for StationFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == ALL_STATIONS {
            Ok(StationFilter::All)
        } else {
            Ok(StationFilter::Station(s.to_string()))
        }
    }
}

impl fmt::Display for StationFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StationFilter::All => f.write_str(ALL_STATIONS),
            StationFilter::Station(s) => f.write_str(s),
        }
    }
}
