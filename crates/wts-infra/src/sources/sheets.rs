//! Google Sheets REST source (`spreadsheets.values.get`)

use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, info};
use wts_domain::model::{RawTable, RawValue};
use wts_domain::DataSource;
use wts_types::{Error, SourceError};

use crate::http::{build_client, classify_http_error, json_to_raw};

/// Sheets API base URL.
const SHEETS_API_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets/";

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

/// Turn a `values.get` response body into a raw table
///
/// The first row holds the headers. The API omits trailing empty cells, so
/// short rows are padded with nulls.
pub fn parse_values_response(body: &str) -> Result<RawTable, SourceError> {
    let range: ValueRange =
        serde_json::from_str(body).map_err(|e| SourceError::Malformed(e.to_string()))?;

    let mut rows = range.values.into_iter();
    let headers = match rows.next() {
        Some(header_row) => header_row
            .into_iter()
            .map(|v| match json_to_raw(v).as_text() {
                Some(text) => text.into_owned(),
                None => String::new(),
            })
            .collect(),
        None => return Ok(RawTable::default()),
    };

    let mut table = RawTable::new(headers);
    for row in rows {
        if row.iter().all(|v| v.is_null() || v.as_str().is_some_and(|s| s.trim().is_empty())) {
            continue;
        }
        let cells: Vec<RawValue> = row.into_iter().map(json_to_raw).collect();
        table.push_row(cells);
    }
    Ok(table)
}

/// Transactions kept in a shared spreadsheet
pub struct SheetsSource {
    client: Client,
    spreadsheet_id: String,
    range: String,
    api_key: String,
}

impl SheetsSource {
    pub fn new(
        spreadsheet_id: impl Into<String>,
        range: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, Error> {
        let client = build_client().map_err(|e| Error::from_source("sheets", e))?;
        Ok(Self {
            client,
            spreadsheet_id: spreadsheet_id.into(),
            range: range.into(),
            api_key: api_key.into(),
        })
    }

    /// `values.get` URL with the range percent-encoded as a path segment
    pub fn values_url(&self) -> Result<Url, SourceError> {
        let mut url =
            Url::parse(SHEETS_API_URL).map_err(|e| SourceError::Malformed(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| SourceError::Malformed("Sheets API URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push(&self.spreadsheet_id)
            .push("values")
            .push(&self.range);
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    fn fetch_values(&self) -> Result<RawTable, SourceError> {
        let url = self.values_url()?;
        debug!(spreadsheet = %self.spreadsheet_id, range = %self.range, "fetching sheet values");

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| SourceError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|e| SourceError::Transport(e.to_string()))?;
        if !status.is_success() {
            return Err(classify_http_error(status.as_u16(), body));
        }
        parse_values_response(&body)
    }
}

impl DataSource for SheetsSource {
    fn name(&self) -> &str {
        "sheets"
    }

    fn fetch(&self) -> Result<RawTable, Error> {
        let table = self
            .fetch_values()
            .map_err(|e| Error::from_source(self.name(), e))?;
        info!(rows = table.len(), "loaded rows from Google Sheets");
        Ok(table)
    }
}
