//! Dataset snapshots and the dashboard controller
//!
//! A load cycle produces one immutable [`Dataset`]. The [`Dashboard`] owns
//! the current snapshot and the selected station; every view is computed
//! fresh from the snapshot by the domain aggregation functions.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use wts_domain::model::{
    DailyWeight, DashboardStats, GroupKey, Record, StationFilter, StationOption, StationSummary,
    StatusCount, WeightGroup,
};
use wts_domain::service::{
    compute_stats, daily_weight, filter_by_station, recent_transactions, station_options,
    status_breakdown, summarize_by_station, top_n_by_weight, NormalizedBatch, Normalizer,
    RejectedRow,
};
use wts_domain::DataSource;
use wts_types::Result;

/// Normalized records of one load cycle
#[derive(Debug, Clone, Serialize)]
pub struct Dataset {
    source_name: String,
    loaded_at: DateTime<Utc>,
    records: Vec<Record>,
    rejected: Vec<RejectedRow>,
    undated_retained: usize,
}

impl Dataset {
    pub fn from_batch(source_name: impl Into<String>, batch: NormalizedBatch) -> Self {
        Self {
            source_name: source_name.into(),
            loaded_at: Utc::now(),
            records: batch.records,
            rejected: batch.rejected,
            undated_retained: batch.undated_retained,
        }
    }

    /// Fetch and normalize a complete table from `source`
    pub fn load(source: &dyn DataSource, normalizer: &Normalizer) -> Result<Self> {
        let batch = source.load(normalizer)?;
        let dataset = Self::from_batch(source.name(), batch);

        info!(
            source = %dataset.source_name,
            records = dataset.records.len(),
            rejected = dataset.rejected.len(),
            "dataset loaded"
        );
        if !dataset.rejected.is_empty() {
            warn!(
                rejected = dataset.rejected.len(),
                policy = %normalizer.undated_policy(),
                "some rows were left out of the dataset"
            );
        }
        Ok(dataset)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn rejected(&self) -> &[RejectedRow] {
        &self.rejected
    }

    pub fn undated_retained(&self) -> usize {
        self.undated_retained
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Everything the presentation layer needs for one screen
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub station: String,
    pub source: String,
    pub loaded_at: Option<DateTime<Utc>>,
    pub stats: DashboardStats,
    pub stations: Vec<StationSummary>,
    pub station_options: Vec<StationOption>,
    pub top_tasks: Vec<WeightGroup>,
    pub daily_weight: Vec<DailyWeight>,
    pub status_breakdown: Vec<StatusCount>,
    pub recent: Vec<Record>,
    pub rejected_rows: usize,
}

/// Owner of the current snapshot and the station selection
#[derive(Debug)]
pub struct Dashboard {
    normalizer: Normalizer,
    dataset: Option<Dataset>,
    station: StationFilter,
    recent_limit: usize,
    top_n: usize,
}

impl Dashboard {
    pub fn new(normalizer: Normalizer) -> Self {
        Self {
            normalizer,
            dataset: None,
            station: StationFilter::All,
            recent_limit: 15,
            top_n: 5,
        }
    }

    pub fn with_limits(mut self, recent_limit: usize, top_n: usize) -> Self {
        self.recent_limit = recent_limit;
        self.top_n = top_n;
        self
    }

    /// Load a fresh snapshot and swap it in
    ///
    /// On failure the previous snapshot stays in place.
    pub fn reload(&mut self, source: &dyn DataSource) -> Result<&Dataset> {
        let dataset = Dataset::load(source, &self.normalizer)?;
        Ok(self.dataset.insert(dataset))
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn select_station(&mut self, station: StationFilter) {
        self.station = station;
    }

    pub fn station(&self) -> &StationFilter {
        &self.station
    }

    fn all_records(&self) -> &[Record] {
        self.dataset.as_ref().map(|d| d.records()).unwrap_or(&[])
    }

    /// Records of the selected station
    pub fn filtered(&self) -> Vec<Record> {
        filter_by_station(self.all_records(), &self.station)
    }

    /// Per-station totals over the whole snapshot, regardless of selection
    pub fn station_summaries(&self) -> Vec<StationSummary> {
        summarize_by_station(self.all_records())
    }

    pub fn stats(&self) -> DashboardStats {
        compute_stats(&self.filtered())
    }

    pub fn top_by(&self, key: GroupKey, n: usize) -> Vec<WeightGroup> {
        top_n_by_weight(&self.filtered(), key, n)
    }

    pub fn recent(&self, n: usize) -> Vec<Record> {
        recent_transactions(&self.filtered(), n)
    }

    pub fn view(&self) -> DashboardView {
        let records = self.filtered();
        let stations = self.station_summaries();

        DashboardView {
            station: self.station.to_string(),
            source: self
                .dataset
                .as_ref()
                .map(|d| d.source_name().to_string())
                .unwrap_or_default(),
            loaded_at: self.dataset.as_ref().map(|d| d.loaded_at()),
            stats: compute_stats(&records),
            station_options: station_options(&stations),
            stations,
            top_tasks: top_n_by_weight(&records, GroupKey::Task, self.top_n),
            daily_weight: daily_weight(&records),
            status_breakdown: status_breakdown(&records),
            recent: recent_transactions(&records, self.recent_limit),
            rejected_rows: self.dataset.as_ref().map(|d| d.rejected().len()).unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wts_domain::model::{RawTable, RawValue};
    use wts_types::{Error, SourceError};

    struct StaticSource(RawTable);

    impl DataSource for StaticSource {
        fn name(&self) -> &str {
            "static"
        }

        fn fetch(&self) -> Result<RawTable> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    impl DataSource for FailingSource {
        fn name(&self) -> &str {
            "failing"
        }

        fn fetch(&self) -> Result<RawTable> {
            Err(Error::from_source("failing", SourceError::AccessDenied))
        }
    }

    fn sample_table() -> RawTable {
        let mut table = RawTable::new(
            ["station", "date", "status", "vehicle_task", "time", "weight"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
        let rows = [
            ["A", "2024-01-01", "Completed", "B22 Municipal Solid Waste", "08:00:00", "5"],
            ["A", "2024-01-02", "Pending", "E08 Special Waste", "09:00:00", "3"],
            ["B", "01/01/2024", "Completed", "B22 Municipal Solid Waste", "10:00:00", "2"],
            ["", "2024-01-02", "Completed", "E08 Special Waste", "11:00:00", "9"],
        ];
        for row in rows {
            table.push_row(row.iter().map(|c| RawValue::from(*c)).collect());
        }
        table
    }

    #[test]
    fn test_empty_dashboard_is_zeroed() {
        let dashboard = Dashboard::new(Normalizer::default());
        let view = dashboard.view();
        assert_eq!(view.stats, DashboardStats::default());
        assert!(view.stations.is_empty());
        assert_eq!(view.station_options.len(), 1);
        assert!(view.recent.is_empty());
    }

    #[test]
    fn test_reload_and_view() {
        let mut dashboard = Dashboard::new(Normalizer::default());
        let dataset = dashboard.reload(&StaticSource(sample_table())).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.rejected().len(), 1);

        let view = dashboard.view();
        assert_eq!(view.source, "static");
        assert_eq!(view.stats.total_weight, 10.0);
        assert_eq!(view.stats.completed_count, 2);
        assert_eq!(view.stats.avg_daily_weight, 5.0);
        assert_eq!(view.stations[0].station, "A");
        assert_eq!(view.top_tasks[0].key, "B22 Municipal Solid Waste");
        assert_eq!(view.recent[0].time, "09:00:00");
        assert_eq!(view.rejected_rows, 1);
    }

    #[test]
    fn test_station_selection() {
        let mut dashboard = Dashboard::new(Normalizer::default());
        dashboard.reload(&StaticSource(sample_table())).unwrap();
        dashboard.select_station(StationFilter::Station("B".to_string()));

        let view = dashboard.view();
        assert_eq!(view.station, "B");
        assert_eq!(view.stats.total_entries, 1);
        // selector still lists every station
        assert_eq!(view.stations.len(), 2);
        assert!(dashboard.filtered().iter().all(|r| r.station == "B"));
    }

    #[test]
    fn test_failed_reload_keeps_previous_snapshot() {
        let mut dashboard = Dashboard::new(Normalizer::default());
        dashboard.reload(&StaticSource(sample_table())).unwrap();

        assert!(dashboard.reload(&FailingSource).is_err());
        assert_eq!(dashboard.dataset().unwrap().source_name(), "static");
        assert_eq!(dashboard.stats().total_entries, 3);
    }

    #[test]
    fn test_reload_replaces_wholesale() {
        let mut dashboard = Dashboard::new(Normalizer::default());
        dashboard.reload(&StaticSource(sample_table())).unwrap();

        let mut smaller = RawTable::new(vec!["station".into(), "date".into(), "weight".into()]);
        smaller.push_row(vec!["C".into(), "2024-02-01".into(), "1.5".into()]);
        dashboard.reload(&StaticSource(smaller)).unwrap();

        let summaries = dashboard.station_summaries();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].station, "C");
    }
}
