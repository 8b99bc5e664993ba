//! Configuration management for the dashboard
//!
//! Config stored at: ~/.config/wts-dashboard/config.json

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use wts_domain::model::{FieldMapping, Status, StatusAliases};
use wts_domain::service::Normalizer;
use wts_types::{ConfigError, OutputFormat, Result, UndatedPolicy};

/// Where transaction rows come from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Mock,
    Csv,
    Json,
    Bigquery,
    Sheets,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SourceKind::Mock => "mock",
            SourceKind::Csv => "csv",
            SourceKind::Json => "json",
            SourceKind::Bigquery => "bigquery",
            SourceKind::Sheets => "sheets",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BigQueryConfig {
    #[serde(default)]
    pub project_id: Option<String>,

    #[serde(default = "default_dataset")]
    pub dataset: String,

    #[serde(default = "default_table")]
    pub table: String,

    #[serde(default)]
    pub api_key: Option<String>,

    /// Maximum rows fetched by the detail query
    #[serde(default = "default_row_limit")]
    pub row_limit: usize,

    /// Run a trivial query before loading
    #[serde(default = "default_true")]
    pub test_connection: bool,
}

impl Default for BigQueryConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            dataset: default_dataset(),
            table: default_table(),
            api_key: None,
            row_limit: default_row_limit(),
            test_connection: true,
        }
    }
}

impl BigQueryConfig {
    /// Fully qualified `project.dataset.table`
    pub fn table_ref(&self) -> Result<String> {
        let project = self
            .project_id
            .as_deref()
            .ok_or(ConfigError::Missing("bigquery.project_id"))?;
        Ok(format!("{}.{}.{}", project, self.dataset, self.table))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetsConfig {
    #[serde(default)]
    pub spreadsheet_id: Option<String>,

    /// A1 range including the header row
    #[serde(default = "default_range")]
    pub range: String,

    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: None,
            range: default_range(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockConfig {
    #[serde(default = "default_row_limit")]
    pub rows: usize,

    /// Fixed seed for reproducible data; random per run when unset
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            rows: default_row_limit(),
            seed: None,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceKind,

    /// Input file for the csv and json sources
    #[serde(default)]
    pub input: Option<PathBuf>,

    /// Text encoding of CSV input (utf-8, big5, ...)
    #[serde(default = "default_encoding")]
    pub csv_encoding: String,

    #[serde(default)]
    pub bigquery: BigQueryConfig,

    #[serde(default)]
    pub sheets: SheetsConfig,

    #[serde(default)]
    pub mock: MockConfig,

    /// Default output format (json, table)
    #[serde(default = "default_output_format")]
    pub output_format: OutputFormat,

    /// Rows shown in the recent transactions table
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,

    /// Groups shown in weight rankings
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    #[serde(default)]
    pub undated_policy: UndatedPolicy,

    /// Extra status labels counted as completed
    #[serde(default)]
    pub completed_aliases: Vec<String>,

    /// TOML file with extra header aliases
    #[serde(default)]
    pub field_aliases: Option<PathBuf>,
}

fn default_dataset() -> String {
    "transfer_stations".to_string()
}

fn default_table() -> String {
    "all_stations".to_string()
}

fn default_range() -> String {
    "Sheet1!A:G".to_string()
}

fn default_row_limit() -> usize {
    1000
}

fn default_encoding() -> String {
    "utf-8".to_string()
}

fn default_output_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_recent_limit() -> usize {
    15
}

fn default_top_n() -> usize {
    5
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceKind::default(),
            input: None,
            csv_encoding: default_encoding(),
            bigquery: BigQueryConfig::default(),
            sheets: SheetsConfig::default(),
            mock: MockConfig::default(),
            output_format: default_output_format(),
            recent_limit: default_recent_limit(),
            top_n: default_top_n(),
            undated_policy: UndatedPolicy::default(),
            completed_aliases: Vec::new(),
            field_aliases: None,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NotFound)?
            .join("wts-dashboard");
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Normalizer built from the alias settings and undated policy
    pub fn normalizer(&self) -> Result<Normalizer> {
        let mut mapping = FieldMapping::default();
        if let Some(ref path) = self.field_aliases {
            let content = std::fs::read_to_string(path)?;
            mapping.extend_from_toml(&content)?;
        }

        let mut statuses = StatusAliases::default();
        for label in &self.completed_aliases {
            statuses.set(label.clone(), Status::Completed);
        }

        Ok(Normalizer::new(mapping, statuses).with_undated_policy(self.undated_policy))
    }
}

fn mask(secret: &Option<String>) -> &'static str {
    match secret {
        Some(s) if !s.is_empty() => "(set)",
        _ => "(not set)",
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Transfer Station Dashboard Configuration")?;
        writeln!(f, "========================================")?;
        writeln!(f)?;
        writeln!(f, "Source:          {}", self.source)?;
        writeln!(
            f,
            "Input file:      {}",
            self.input
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(none)".to_string())
        )?;
        writeln!(f, "CSV encoding:    {}", self.csv_encoding)?;
        writeln!(f, "Output format:   {}", self.output_format)?;
        writeln!(f, "Recent limit:    {}", self.recent_limit)?;
        writeln!(f, "Top N:           {}", self.top_n)?;
        writeln!(f, "Undated records: {}", self.undated_policy)?;
        if !self.completed_aliases.is_empty() {
            writeln!(f, "Completed also:  {}", self.completed_aliases.join(", "))?;
        }
        writeln!(f)?;
        writeln!(f, "BigQuery")?;
        writeln!(
            f,
            "  Table:         {}",
            self.bigquery
                .table_ref()
                .unwrap_or_else(|_| "(project not set)".to_string())
        )?;
        writeln!(f, "  API key:       {}", mask(&self.bigquery.api_key))?;
        writeln!(f, "  Row limit:     {}", self.bigquery.row_limit)?;
        writeln!(f, "Sheets")?;
        writeln!(
            f,
            "  Spreadsheet:   {}",
            self.sheets.spreadsheet_id.as_deref().unwrap_or("(not set)")
        )?;
        writeln!(f, "  Range:         {}", self.sheets.range)?;
        writeln!(f, "  API key:       {}", mask(&self.sheets.api_key))?;
        writeln!(f, "Mock")?;
        writeln!(f, "  Rows:          {}", self.mock.rows)?;

        if let Ok(path) = Self::config_path() {
            writeln!(f)?;
            writeln!(f, "Config file:     {}", path.display())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_returns_default() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.recent_limit, 15);
        assert_eq!(config.bigquery.row_limit, 1000);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"source": "bigquery", "bigquery": {"project_id": "demo-project"}}"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.source, SourceKind::Bigquery);
        assert_eq!(
            config.bigquery.table_ref().unwrap(),
            "demo-project.transfer_stations.all_stations"
        );
        assert_eq!(config.top_n, 5);
    }

    #[test]
    fn test_save_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            source: SourceKind::Csv,
            input: Some(PathBuf::from("data.csv")),
            csv_encoding: "big5".to_string(),
            undated_policy: UndatedPolicy::Retain,
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_file_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse configuration"));
    }

    #[test]
    fn test_table_ref_requires_project() {
        assert!(BigQueryConfig::default().table_ref().is_err());
    }

    #[test]
    fn test_normalizer_uses_completed_aliases() {
        let config = Config {
            completed_aliases: vec!["Done".to_string()],
            ..Config::default()
        };
        let normalizer = config.normalizer().unwrap();

        let mut row = wts_domain::model::RawRow::new();
        row.insert("station".into(), "Shatin".into());
        row.insert("date".into(), "2024-01-20".into());
        row.insert("status".into(), "Done".into());
        let record = normalizer.normalize_row(&row).unwrap();
        assert!(record.is_completed());
    }

    #[test]
    fn test_completed_aliases_override_default_labels() {
        let config = Config {
            completed_aliases: vec!["Pending".to_string()],
            ..Config::default()
        };
        let normalizer = config.normalizer().unwrap();

        let mut row = wts_domain::model::RawRow::new();
        row.insert("station".into(), "Shatin".into());
        row.insert("date".into(), "2024-01-20".into());
        row.insert("status".into(), "Pending".into());
        let record = normalizer.normalize_row(&row).unwrap();
        assert!(record.is_completed());
        assert_eq!(record.status_label, "Pending");
    }

    #[test]
    fn test_normalizer_reads_alias_file() {
        let dir = tempdir().unwrap();
        let aliases = dir.path().join("aliases.toml");
        std::fs::write(&aliases, "station = [\"Facility\"]\n").unwrap();
        let config = Config {
            field_aliases: Some(aliases),
            ..Config::default()
        };
        let normalizer = config.normalizer().unwrap();
        assert!(normalizer
            .mapping()
            .aliases(wts_domain::model::Field::Station)
            .iter()
            .any(|a| a == "Facility"));
    }
}
