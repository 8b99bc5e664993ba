//! Core types shared across the transfer station dashboard crates

mod error;

pub use error::*;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Output format for results
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// What to do with records whose date is missing or unparseable
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UndatedPolicy {
    /// Drop undated records from the working set
    #[default]
    Exclude,
    /// Keep them in totals, skip them in date-based views
    Retain,
}

impl std::fmt::Display for UndatedPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UndatedPolicy::Exclude => write!(f, "exclude"),
            UndatedPolicy::Retain => write!(f, "retain"),
        }
    }
}
