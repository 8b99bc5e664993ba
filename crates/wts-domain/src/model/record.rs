//! Normalized transfer transaction

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Status;

/// Placeholder for blank or absent text fields
pub const UNKNOWN: &str = "Unknown";

/// One weighing transaction at a transfer station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Station name, never empty
    pub station: String,
    /// Calendar date, `None` when missing or unparseable
    pub date: Option<NaiveDate>,
    pub status: Status,
    /// Trimmed status label as it appeared in the source
    pub status_label: String,
    /// Vehicle task description
    pub task: String,
    /// Clock time text as supplied, e.g. `08:15:00`
    pub time: String,
    /// Weight in tons, never negative
    pub weight: f64,
    pub source: String,
}

impl Record {
    pub fn new(station: impl Into<String>, weight: f64) -> Self {
        Self {
            station: station.into(),
            date: None,
            status: Status::Unknown,
            status_label: UNKNOWN.to_string(),
            task: UNKNOWN.to_string(),
            time: UNKNOWN.to_string(),
            weight: if weight.is_finite() && weight > 0.0 { weight } else { 0.0 },
            source: UNKNOWN.to_string(),
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Set the status from a recognized variant, keeping its display label
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self.status_label = status.label().to_string();
        self
    }

    pub fn with_task(mut self, task: impl Into<String>) -> Self {
        self.task = task.into();
        self
    }

    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = time.into();
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status == Status::Completed
    }

    /// Clock text for ordering, `None` when the time was never supplied
    pub fn time_key(&self) -> Option<&str> {
        if self.time == UNKNOWN {
            None
        } else {
            Some(&self.time)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_weight() {
        assert_eq!(Record::new("Shatin", -3.0).weight, 0.0);
        assert_eq!(Record::new("Shatin", f64::NAN).weight, 0.0);
        assert_eq!(Record::new("Shatin", 6.5).weight, 6.5);
    }

    #[test]
    fn test_time_key() {
        let record = Record::new("Shatin", 1.0);
        assert_eq!(record.time_key(), None);
        assert_eq!(record.with_time("08:15:00").time_key(), Some("08:15:00"));
    }
}
