//! Error types for the transfer station dashboard

use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing configuration value: {0}")]
    Missing(&'static str),
}

/// Failures reported by a data source while acquiring raw rows
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error! status: {status}, details: {body}")]
    Http { status: u16, body: String },

    #[error("Access denied - check API key restrictions")]
    AccessDenied,

    #[error("Project, spreadsheet or table not found: {0}")]
    NotFound(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Unsupported text encoding: {0}")]
    Encoding(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Data source error ({source_name}): {error}")]
    Source {
        source_name: String,
        #[source]
        error: SourceError,
    },

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Excel export error: {0}")]
    Excel(String),
}

impl Error {
    /// Wrap a source failure with the name of the source that produced it
    pub fn from_source(source_name: impl Into<String>, error: SourceError) -> Self {
        Error::Source {
            source_name: source_name.into(),
            error,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_display() {
        let err = Error::from_source(
            "bigquery",
            SourceError::Http {
                status: 500,
                body: "boom".to_string(),
            },
        );
        assert_eq!(
            err.to_string(),
            "Data source error (bigquery): HTTP error! status: 500, details: boom"
        );
    }

    #[test]
    fn test_config_error_converts() {
        let err: Error = ConfigError::Missing("bigquery.project_id").into();
        assert!(err.to_string().contains("bigquery.project_id"));
    }
}
