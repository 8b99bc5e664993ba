//! Data source construction from configuration

use chrono::NaiveDate;
use tracing::warn;
use wts_domain::DataSource;
use wts_infra::{BigQuerySource, CsvFileSource, JsonFileSource, MockSource, SheetsSource};
use wts_types::{ConfigError, Result};

use crate::config::{Config, SourceKind};

/// Open the source selected in `config`
///
/// `today` anchors the mock generator's date window.
pub fn open_source(config: &Config, today: NaiveDate) -> Result<Box<dyn DataSource>> {
    match config.source {
        SourceKind::Mock => {
            let seed = config
                .mock
                .seed
                .unwrap_or_else(|| chrono::Utc::now().timestamp_millis() as u64);
            Ok(Box::new(MockSource::new(config.mock.rows, seed, today)))
        }
        SourceKind::Csv => {
            let input = config.input.as_ref().ok_or(ConfigError::Missing("input"))?;
            Ok(Box::new(CsvFileSource::new(input, &config.csv_encoding)?))
        }
        SourceKind::Json => {
            let input = config.input.as_ref().ok_or(ConfigError::Missing("input"))?;
            Ok(Box::new(JsonFileSource::new(input)))
        }
        SourceKind::Bigquery => open_bigquery(config),
        SourceKind::Sheets => {
            let spreadsheet_id = config
                .sheets
                .spreadsheet_id
                .as_deref()
                .ok_or(ConfigError::Missing("sheets.spreadsheet_id"))?;
            let api_key = config
                .sheets
                .api_key
                .as_deref()
                .ok_or(ConfigError::Missing("sheets.api_key"))?;
            Ok(Box::new(SheetsSource::new(
                spreadsheet_id,
                config.sheets.range.as_str(),
                api_key,
            )?))
        }
    }
}

fn open_bigquery(config: &Config) -> Result<Box<dyn DataSource>> {
    let bq = &config.bigquery;
    let project_id = bq
        .project_id
        .as_deref()
        .ok_or(ConfigError::Missing("bigquery.project_id"))?;
    let api_key = bq
        .api_key
        .as_deref()
        .ok_or(ConfigError::Missing("bigquery.api_key"))?;

    let source = BigQuerySource::new(project_id, api_key, &bq.table_ref()?, bq.row_limit)?;
    if bq.test_connection {
        // logged only, the detail query reports the actual failure
        if let Err(e) = source.test_connection() {
            warn!(error = %e, "BigQuery connection test failed");
        }
    }
    Ok(Box::new(source))
}
