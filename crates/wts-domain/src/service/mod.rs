//! Domain services

pub mod aggregation;
pub mod normalizer;

pub use aggregation::{
    compute_stats, daily_weight, filter_by_station, recent_transactions, station_options,
    status_breakdown, summarize_by_station, top_n_by, top_n_by_weight,
};
pub use normalizer::{parse_date, parse_weight, NormalizedBatch, Normalizer, RejectedRow, RowIssue};
