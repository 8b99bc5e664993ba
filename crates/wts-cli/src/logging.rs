//! Logging setup using `tracing` and `tracing-subscriber`.
//!
//! Logs go to stderr so table and JSON output on stdout stay clean.
//!
//! # Log Levels
//!
//! - `warn`: rejected rows, failed connection probes (default)
//! - `info`: load progress and record counts
//! - `debug`: HTTP requests, column resolution
//! - `trace`: row-level detail

use std::io;

use clap::ValueEnum;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors.
    #[default]
    Pretty,
    /// Compact single-line format.
    Compact,
    /// JSON format for machine parsing.
    Json,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    pub format: LogFormat,
    pub with_ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            format: LogFormat::default(),
            with_ansi: true,
        }
    }
}

impl LogConfig {
    /// - 0 (no `-v`): warn level
    /// - 1 (`-v`): info level
    /// - 2 (`-vv`): debug level
    /// - 3+ : trace level
    #[must_use]
    pub fn from_verbosity(verbosity: u8) -> Self {
        let level = match verbosity {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };
        Self {
            level,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }
}

/// Install the global subscriber. Call once at startup.
pub fn init_logging(config: &LogConfig) {
    let filter = build_env_filter(config.level);

    match config.format {
        LogFormat::Json => {
            let layer = fmt::layer().json().with_writer(io::stderr).with_target(true);
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
        LogFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_writer(io::stderr)
                .with_ansi(config.with_ansi)
                .with_target(false)
                .without_time();
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
        LogFormat::Pretty => {
            let layer = fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(config.with_ansi)
                .with_target(false)
                .without_time();
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
    }
}

/// `RUST_LOG` wins over the verbosity flag when set.
fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(level)))
}

/// Workspace crates at `level`, dependencies at warn
fn default_directives(level: Level) -> String {
    format!(
        "warn,wts_dash={level},wts_app={level},wts_infra={level},wts_domain={level}",
        level = level.as_str().to_lowercase()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(LogConfig::from_verbosity(0).level, Level::WARN);
        assert_eq!(LogConfig::from_verbosity(1).level, Level::INFO);
        assert_eq!(LogConfig::from_verbosity(2).level, Level::DEBUG);
        assert_eq!(LogConfig::from_verbosity(5).level, Level::TRACE);
    }

    #[test]
    fn test_default_directives_cover_binary_target() {
        let directives = default_directives(Level::DEBUG);
        assert!(directives.starts_with("warn,"));
        assert!(directives.contains("wts_dash=debug"));
        assert!(directives.contains("wts_app=debug"));
        assert!(EnvFilter::try_new(&directives).is_ok());
    }

    #[test]
    fn test_with_format() {
        let config = LogConfig::from_verbosity(0).with_format(LogFormat::Json);
        assert_eq!(config.format, LogFormat::Json);
    }
}
