//! BigQuery REST source (`jobs.query`, API-key authentication)

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use wts_domain::model::{RawTable, RawValue};
use wts_domain::DataSource;
use wts_types::{Error, SourceError};

use crate::http::{build_client, classify_api_message, classify_http_error, json_to_raw, ApiErrorBody};

/// BigQuery REST API base URL.
const BIGQUERY_API_URL: &str = "https://bigquery.googleapis.com/bigquery/v2";

/// Server-side query timeout passed with every request.
const QUERY_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    query: &'a str,
    use_legacy_sql: bool,
    timeout_ms: u64,
    use_query_cache: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponse {
    #[serde(default)]
    schema: Option<Schema>,
    #[serde(default)]
    rows: Option<Vec<Row>>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
    #[serde(default)]
    job_complete: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct Schema {
    fields: Vec<SchemaField>,
}

#[derive(Debug, Deserialize)]
struct SchemaField {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Row {
    f: Vec<Cell>,
}

#[derive(Debug, Deserialize)]
struct Cell {
    #[serde(default)]
    v: serde_json::Value,
}

/// Detailed transaction query, newest first
pub fn detail_query(table: &str, row_limit: usize) -> String {
    format!(
        "SELECT date, status, vehicle_task, time, weight, source, station \
         FROM `{}` \
         ORDER BY date DESC, time DESC \
         LIMIT {}",
        table, row_limit
    )
}

/// Turn a `jobs.query` response body into a raw table
///
/// A response without rows yields an empty table. An `error` object in the
/// body is reported even when the HTTP status was a success.
pub fn parse_query_response(body: &str) -> Result<RawTable, SourceError> {
    let response: QueryResponse =
        serde_json::from_str(body).map_err(|e| SourceError::Malformed(e.to_string()))?;

    if let Some(error) = response.error {
        return Err(classify_api_message(&error.message));
    }
    if response.job_complete == Some(false) {
        return Err(SourceError::Api(
            "query did not complete within the timeout".to_string(),
        ));
    }

    let rows = match response.rows {
        Some(rows) if !rows.is_empty() => rows,
        _ => return Ok(RawTable::default()),
    };
    let schema = response
        .schema
        .ok_or_else(|| SourceError::Malformed("rows returned without a schema".to_string()))?;

    let headers = schema.fields.into_iter().map(|f| f.name).collect();
    let mut table = RawTable::new(headers);
    for row in rows {
        let cells: Vec<RawValue> = row.f.into_iter().map(|c| json_to_raw(c.v)).collect();
        table.push_row(cells);
    }
    Ok(table)
}

/// Transactions read straight from a BigQuery table
pub struct BigQuerySource {
    client: Client,
    project_id: String,
    api_key: String,
    query: String,
}

impl BigQuerySource {
    /// `table` is the fully qualified `project.dataset.table` reference
    pub fn new(
        project_id: impl Into<String>,
        api_key: impl Into<String>,
        table: &str,
        row_limit: usize,
    ) -> Result<Self, Error> {
        let client = build_client().map_err(|e| Error::from_source("bigquery", e))?;
        Ok(Self {
            client,
            project_id: project_id.into(),
            api_key: api_key.into(),
            query: detail_query(table, row_limit),
        })
    }

    fn queries_url(&self) -> String {
        format!("{BIGQUERY_API_URL}/projects/{}/queries", self.project_id)
    }

    /// Run one SQL statement and return its rows
    pub fn run_query(&self, sql: &str) -> Result<RawTable, SourceError> {
        debug!(query = sql, "executing BigQuery query");
        let response = self
            .client
            .post(self.queries_url())
            .query(&[("key", self.api_key.as_str())])
            .json(&QueryRequest {
                query: sql,
                use_legacy_sql: false,
                timeout_ms: QUERY_TIMEOUT_MS,
                use_query_cache: true,
            })
            .send()
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| SourceError::Transport(e.to_string()))?;
        if !status.is_success() {
            return Err(classify_http_error(status.as_u16(), body));
        }
        parse_query_response(&body)
    }

    /// Cheap round trip to verify the key and project before loading
    pub fn test_connection(&self) -> Result<(), Error> {
        self.run_query("SELECT \"Connection successful\" AS status, CURRENT_TIMESTAMP() AS time")
            .map_err(|e| Error::from_source(self.name(), e))?;
        info!(project = %self.project_id, "BigQuery connection test passed");
        Ok(())
    }
}

impl DataSource for BigQuerySource {
    fn name(&self) -> &str {
        "bigquery"
    }

    fn fetch(&self) -> Result<RawTable, Error> {
        let table = self
            .run_query(&self.query)
            .map_err(|e| Error::from_source(self.name(), e))?;
        info!(rows = table.len(), "loaded rows from BigQuery");
        Ok(table)
    }
}
