//! Shared HTTP plumbing for the REST sources

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use wts_domain::model::RawValue;
use wts_types::SourceError;

/// HTTP request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the blocking client used by every REST source.
pub fn build_client() -> Result<Client, SourceError> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| SourceError::Transport(e.to_string()))
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiErrorBody,
}

/// `error` object of a Google API response body
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
}

/// Map an API error message onto a typed source error
pub fn classify_api_message(message: &str) -> SourceError {
    if message.starts_with("Access denied") || message.contains("PERMISSION_DENIED") {
        SourceError::AccessDenied
    } else if message.starts_with("Not found") || message.contains("NOT_FOUND") {
        SourceError::NotFound(message.to_string())
    } else {
        SourceError::Api(message.to_string())
    }
}

/// Map a non-success HTTP response onto a typed source error
pub fn classify_http_error(status: u16, body: String) -> SourceError {
    match status {
        403 => SourceError::AccessDenied,
        404 => {
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            SourceError::NotFound(message)
        }
        _ => SourceError::Http { status, body },
    }
}

/// Convert a JSON cell into a raw value; nested values keep their JSON text
pub fn json_to_raw(value: serde_json::Value) -> RawValue {
    match value {
        serde_json::Value::Null => RawValue::Null,
        serde_json::Value::Bool(b) => RawValue::Bool(b),
        serde_json::Value::Number(n) => n.as_f64().map(RawValue::Number).unwrap_or(RawValue::Null),
        serde_json::Value::String(s) => RawValue::Text(s),
        other => RawValue::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_http_error() {
        assert!(matches!(
            classify_http_error(403, String::new()),
            SourceError::AccessDenied
        ));
        match classify_http_error(404, r#"{"error":{"message":"Not found: Table x"}}"#.to_string()) {
            SourceError::NotFound(msg) => assert_eq!(msg, "Not found: Table x"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            classify_http_error(500, "oops".to_string()),
            SourceError::Http { status: 500, .. }
        ));
    }

    #[test]
    fn test_classify_api_message() {
        assert!(matches!(
            classify_api_message("Access denied: BigQuery BigQuery: Permission denied"),
            SourceError::AccessDenied
        ));
        assert!(matches!(
            classify_api_message("Not found: Dataset p:transfer_stations"),
            SourceError::NotFound(_)
        ));
        assert!(matches!(classify_api_message("Syntax error"), SourceError::Api(_)));
    }

    #[test]
    fn test_json_to_raw() {
        assert_eq!(json_to_raw(serde_json::json!(null)), RawValue::Null);
        assert_eq!(json_to_raw(serde_json::json!("x")), RawValue::Text("x".into()));
        assert_eq!(json_to_raw(serde_json::json!(2.5)), RawValue::Number(2.5));
        assert_eq!(json_to_raw(serde_json::json!([1])), RawValue::Text("[1]".into()));
    }
}
