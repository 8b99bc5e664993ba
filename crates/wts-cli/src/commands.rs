//! Command handlers

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{Local, NaiveDate, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;
use wts_app::{export_to_excel, open_source, Config, Dashboard, SourceKind};
use wts_domain::model::StationFilter;
use wts_infra::sources::write_table_csv;
use wts_infra::MockSource;
use wts_types::{OutputFormat, Result, UndatedPolicy};

use crate::cli::{Cli, Commands};
use crate::output::{
    output_daily, output_groups, output_recent, output_station_options, output_stats,
    output_statuses, output_summaries, output_view,
};

/// Execute CLI command
pub fn execute(cli: Cli) -> Result<()> {
    // Load config
    let mut config = Config::load()?;

    // Override from CLI args
    if let Some(source) = cli.source {
        config.source = source;
    }
    if cli.input.is_some() {
        config.input = cli.input.clone();
    }
    if let Some(policy) = cli.undated {
        config.undated_policy = policy;
    }
    let output_format = cli.format.unwrap_or(config.output_format);
    let station: StationFilter = cli
        .station
        .as_deref()
        .unwrap_or_default()
        .parse()
        .unwrap_or_default();

    match &cli.command {
        Commands::Dashboard => {
            let dashboard = load_dashboard(&config, station)?;
            output_view(output_format, &dashboard.view())
        }

        Commands::Summary => {
            let dashboard = load_dashboard(&config, station)?;
            output_summaries(output_format, &dashboard.station_summaries())
        }

        Commands::Stats => {
            let dashboard = load_dashboard(&config, station)?;
            let label = dashboard.station().to_string();
            output_stats(output_format, &label, &dashboard.stats())
        }

        Commands::Top { by, n } => {
            let dashboard = load_dashboard(&config, station)?;
            let n = n.unwrap_or(config.top_n);
            output_groups(output_format, &dashboard.top_by((*by).into(), n))
        }

        Commands::Recent { n } => {
            let dashboard = load_dashboard(&config, station)?;
            let n = n.unwrap_or(config.recent_limit);
            output_recent(output_format, &dashboard.recent(n))
        }

        Commands::Daily => {
            let dashboard = load_dashboard(&config, station)?;
            output_daily(output_format, &dashboard.view().daily_weight)
        }

        Commands::Statuses => {
            let dashboard = load_dashboard(&config, station)?;
            output_statuses(output_format, &dashboard.view().status_breakdown)
        }

        Commands::Stations => {
            let dashboard = load_dashboard(&config, station)?;
            output_station_options(output_format, &dashboard.view().station_options)
        }

        Commands::Export { output } => cmd_export(&config, station, output),

        Commands::Mock { output, rows, seed } => cmd_mock(&config, output, *rows, *seed),

        Commands::Config {
            show,
            set_source,
            set_input,
            set_encoding,
            set_output,
            set_undated,
            set_project,
            set_dataset,
            set_table,
            set_bigquery_key,
            set_spreadsheet,
            set_range,
            set_sheets_key,
            reset,
        } => cmd_config(
            *show,
            ConfigUpdate {
                source: *set_source,
                input: set_input.clone(),
                encoding: set_encoding.clone(),
                output: *set_output,
                undated: *set_undated,
                project: set_project.clone(),
                dataset: set_dataset.clone(),
                table: set_table.clone(),
                bigquery_key: set_bigquery_key.clone(),
                spreadsheet: set_spreadsheet.clone(),
                range: set_range.clone(),
                sheets_key: set_sheets_key.clone(),
            },
            *reset,
        ),
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Load a snapshot from the configured source behind a spinner
fn load_dashboard(config: &Config, station: StationFilter) -> Result<Dashboard> {
    let source = open_source(config, today())?;
    let mut dashboard = Dashboard::new(config.normalizer()?)
        .with_limits(config.recent_limit, config.top_n);

    let pb = spinner(format!("Loading from {}...", source.name()));
    let result = dashboard.reload(source.as_ref()).map(|dataset| {
        (
            dataset.len(),
            dataset.rejected().len(),
            dataset.undated_retained(),
        )
    });
    pb.finish_and_clear();

    let (records, rejected, undated) = result?;
    debug!(records, rejected, undated, "snapshot ready");
    if rejected > 0 {
        let hint = match config.undated_policy {
            UndatedPolicy::Exclude => " (use --undated retain to keep undated rows)",
            UndatedPolicy::Retain => "",
        };
        eprintln!("Skipped {} of {} rows{}", rejected, records + rejected, hint);
    }

    dashboard.select_station(station);
    Ok(dashboard)
}

fn cmd_export(config: &Config, station: StationFilter, output: &Path) -> Result<()> {
    let dashboard = load_dashboard(config, station)?;
    export_to_excel(&dashboard.view(), output)?;

    println!("Exported to: {}", output.display());
    Ok(())
}

fn cmd_mock(config: &Config, output: &Path, rows: Option<usize>, seed: Option<u64>) -> Result<()> {
    let rows = rows.unwrap_or(config.mock.rows);
    let seed = seed
        .or(config.mock.seed)
        .unwrap_or_else(|| Utc::now().timestamp_millis() as u64);

    let table = MockSource::new(rows, seed, today()).generate();
    write_table_csv(&table, output)?;

    println!("Wrote {} rows to {} (seed {})", table.len(), output.display(), seed);
    Ok(())
}

/// Values set by `config --set-*`
#[derive(Debug, Default)]
struct ConfigUpdate {
    source: Option<SourceKind>,
    input: Option<PathBuf>,
    encoding: Option<String>,
    output: Option<OutputFormat>,
    undated: Option<UndatedPolicy>,
    project: Option<String>,
    dataset: Option<String>,
    table: Option<String>,
    bigquery_key: Option<String>,
    spreadsheet: Option<String>,
    range: Option<String>,
    sheets_key: Option<String>,
}

impl ConfigUpdate {
    /// Apply to `config`; returns whether anything changed
    fn apply(self, config: &mut Config) -> bool {
        let mut modified = false;

        if let Some(source) = self.source {
            config.source = source;
            modified = true;
        }
        if let Some(input) = self.input {
            config.input = Some(input);
            modified = true;
        }
        if let Some(encoding) = self.encoding {
            config.csv_encoding = encoding;
            modified = true;
        }
        if let Some(output_format) = self.output {
            config.output_format = output_format;
            modified = true;
        }
        if let Some(policy) = self.undated {
            config.undated_policy = policy;
            modified = true;
        }
        if let Some(project) = self.project {
            config.bigquery.project_id = Some(project);
            modified = true;
        }
        if let Some(dataset) = self.dataset {
            config.bigquery.dataset = dataset;
            modified = true;
        }
        if let Some(table) = self.table {
            config.bigquery.table = table;
            modified = true;
        }
        if let Some(key) = self.bigquery_key {
            config.bigquery.api_key = Some(key);
            modified = true;
        }
        if let Some(spreadsheet) = self.spreadsheet {
            config.sheets.spreadsheet_id = Some(spreadsheet);
            modified = true;
        }
        if let Some(range) = self.range {
            config.sheets.range = range;
            modified = true;
        }
        if let Some(key) = self.sheets_key {
            config.sheets.api_key = Some(key);
            modified = true;
        }

        modified
    }
}

fn cmd_config(show: bool, update: ConfigUpdate, reset: bool) -> Result<()> {
    if reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        println!("\n{}", config);
        return Ok(());
    }

    let mut config = Config::load()?;
    let modified = update.apply(&mut config);

    if modified {
        config.save()?;
        println!("Configuration updated");
    }

    if show || !modified {
        println!("{}", config);
    }

    Ok(())
}
