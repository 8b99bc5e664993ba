//! CLI definition using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use wts_app::SourceKind;
use wts_domain::model::GroupKey;
use wts_types::{OutputFormat, UndatedPolicy};

use crate::logging::LogFormat;

/// Grouping used by the `top` command
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum TopBy {
    #[default]
    Task,
    Station,
    Status,
    Source,
}

impl From<TopBy> for GroupKey {
    fn from(by: TopBy) -> Self {
        match by {
            TopBy::Task => GroupKey::Task,
            TopBy::Station => GroupKey::Station,
            TopBy::Status => GroupKey::Status,
            TopBy::Source => GroupKey::Source,
        }
    }
}

#[derive(Parser)]
#[command(name = "wts-dash")]
#[command(author = "yuuji")]
#[command(version)]
#[command(about = "Waste transfer station dashboard: weight totals, rankings and recent loads")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data source (mock, csv, json, bigquery, sheets). Uses config value if not specified.
    #[arg(long, global = true)]
    pub source: Option<SourceKind>,

    /// Input file for the csv and json sources
    #[arg(long, short = 'i', global = true)]
    pub input: Option<PathBuf>,

    /// Station to show ("all" for every station)
    #[arg(long, short = 's', global = true)]
    pub station: Option<String>,

    /// Output format (json, table). Uses config value if not specified.
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Handling of records without a usable date (exclude, retain)
    #[arg(long, global = true)]
    pub undated: Option<UndatedPolicy>,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the full dashboard for the selected station
    Dashboard,

    /// Per-station totals across the whole dataset
    Summary,

    /// Headline statistics for the selected station
    Stats,

    /// Rank groups by total weight
    Top {
        /// Grouping key
        #[arg(long, value_enum, default_value_t = TopBy::Task)]
        by: TopBy,

        /// Number of groups. Uses config value if not specified.
        #[arg(long, short = 'n')]
        n: Option<usize>,
    },

    /// Most recent transactions
    Recent {
        /// Number of rows. Uses config value if not specified.
        #[arg(long, short = 'n')]
        n: Option<usize>,
    },

    /// Total weight per day
    Daily,

    /// Record count per status label
    Statuses,

    /// List the station selector options
    Stations,

    /// Export the dashboard to Excel
    Export {
        /// Output Excel file path
        #[arg(long, short = 'o', default_value = "dashboard.xlsx")]
        output: PathBuf,
    },

    /// Write generated demo data to a CSV file
    Mock {
        /// Output CSV file path
        #[arg(long, short = 'o')]
        output: PathBuf,

        /// Number of rows. Uses config value if not specified.
        #[arg(long)]
        rows: Option<usize>,

        /// Random seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Set default data source
        #[arg(long)]
        set_source: Option<SourceKind>,

        /// Set default input file
        #[arg(long)]
        set_input: Option<PathBuf>,

        /// Set CSV text encoding (utf-8, big5, ...)
        #[arg(long)]
        set_encoding: Option<String>,

        /// Set default output format
        #[arg(long)]
        set_output: Option<OutputFormat>,

        /// Set undated record policy
        #[arg(long)]
        set_undated: Option<UndatedPolicy>,

        /// Set BigQuery project ID
        #[arg(long)]
        set_project: Option<String>,

        /// Set BigQuery dataset
        #[arg(long)]
        set_dataset: Option<String>,

        /// Set BigQuery table
        #[arg(long)]
        set_table: Option<String>,

        /// Set BigQuery API key
        #[arg(long)]
        set_bigquery_key: Option<String>,

        /// Set Google Sheets spreadsheet ID
        #[arg(long)]
        set_spreadsheet: Option<String>,

        /// Set Google Sheets range (e.g. "Sheet1!A:G")
        #[arg(long)]
        set_range: Option<String>,

        /// Set Google Sheets API key
        #[arg(long)]
        set_sheets_key: Option<String>,

        /// Reset to defaults
        #[arg(long)]
        reset: bool,
    },
}
