//! Data sources

mod bigquery;
mod csv_file;
mod json_file;
mod mock;
mod sheets;

pub use bigquery::{detail_query, parse_query_response, BigQuerySource};
pub use csv_file::{write_table_csv, CsvFileSource};
pub use json_file::JsonFileSource;
pub use mock::{MockSource, MOCK_STATIONS, MOCK_STATUSES, MOCK_TASKS};
pub use sheets::{parse_values_response, SheetsSource};
