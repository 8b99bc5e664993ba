//! Infrastructure layer - data source implementations
//!
//! Every source produces a [`wts_domain::model::RawTable`]; normalization
//! and aggregation happen in the domain crate.

pub mod http;
pub mod sources;

pub use sources::{BigQuerySource, CsvFileSource, JsonFileSource, MockSource, SheetsSource};
