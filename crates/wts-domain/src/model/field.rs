//! Canonical record fields and the header aliases that map onto them
//!
//! Spreadsheet and query exports name their columns differently
//! (`vehicle_task`, `Vehicle Task`, `車輛任務`, ...). Aliases are resolved
//! once per table into column positions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical field of a [`crate::model::Record`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Station,
    Date,
    Status,
    Task,
    Time,
    Weight,
    Source,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Station,
        Field::Date,
        Field::Status,
        Field::Task,
        Field::Time,
        Field::Weight,
        Field::Source,
    ];

    /// Fields a table must provide for its rows to be usable
    pub const REQUIRED: [Field; 2] = [Field::Station, Field::Weight];

    pub fn name(self) -> &'static str {
        match self {
            Field::Station => "station",
            Field::Date => "date",
            Field::Status => "status",
            Field::Task => "task",
            Field::Time => "time",
            Field::Weight => "weight",
            Field::Source => "source",
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    fn default_aliases(self) -> &'static [&'static str] {
        match self {
            Field::Station => &["station", "station_name", "站點", "轉運站"],
            Field::Date => &["date", "日期"],
            Field::Status => &["status", "狀態"],
            Field::Task => &["vehicle_task", "vehicle task", "task", "車輛任務"],
            Field::Time => &["time", "時間"],
            Field::Weight => &["weight", "weight (tons)", "weight_tons", "重量", "重量(公噸)"],
            Field::Source => &["source", "來源"],
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Extra aliases loaded from a TOML file
///
/// ```toml
/// station = ["Facility"]
/// weight = ["Net Weight"]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldAliasFile {
    pub station: Vec<String>,
    pub date: Vec<String>,
    pub status: Vec<String>,
    pub task: Vec<String>,
    pub time: Vec<String>,
    pub weight: Vec<String>,
    pub source: Vec<String>,
}

impl FieldAliasFile {
    fn aliases(&self, field: Field) -> &[String] {
        match field {
            Field::Station => &self.station,
            Field::Date => &self.date,
            Field::Status => &self.status,
            Field::Task => &self.task,
            Field::Time => &self.time,
            Field::Weight => &self.weight,
            Field::Source => &self.source,
        }
    }
}

/// Canonical field to accepted source header aliases
#[derive(Debug, Clone)]
pub struct FieldMapping {
    aliases: [Vec<String>; 7],
}

impl Default for FieldMapping {
    fn default() -> Self {
        let aliases = Field::ALL.map(|field| {
            field
                .default_aliases()
                .iter()
                .map(|a| a.to_string())
                .collect()
        });
        Self { aliases }
    }
}

impl FieldMapping {
    /// Mapping with no aliases at all
    pub fn empty() -> Self {
        Self {
            aliases: Default::default(),
        }
    }

    /// Add an alias for `field`; earlier aliases win when several headers match
    pub fn with_alias(mut self, field: Field, alias: impl Into<String>) -> Self {
        self.add_alias(field, alias);
        self
    }

    pub fn add_alias(&mut self, field: Field, alias: impl Into<String>) {
        let alias = alias.into();
        let list = &mut self.aliases[field.index()];
        if !list.iter().any(|a| headers_match(a, &alias)) {
            list.push(alias);
        }
    }

    /// Merge aliases parsed from a TOML document
    pub fn extend_from_toml(&mut self, content: &str) -> Result<(), toml::de::Error> {
        let file: FieldAliasFile = toml::from_str(content)?;
        for field in Field::ALL {
            for alias in file.aliases(field) {
                self.add_alias(field, alias.clone());
            }
        }
        Ok(())
    }

    pub fn aliases(&self, field: Field) -> &[String] {
        &self.aliases[field.index()]
    }

    /// Resolve aliases against a header row
    pub fn resolve(&self, headers: &[String]) -> ColumnIndex {
        let columns = Field::ALL.map(|field| {
            self.aliases(field).iter().find_map(|alias| {
                headers.iter().position(|header| headers_match(header, alias))
            })
        });
        ColumnIndex { columns }
    }
}

fn headers_match(header: &str, alias: &str) -> bool {
    let header = header.trim();
    let alias = alias.trim();
    header == alias || header.to_lowercase() == alias.to_lowercase()
}

/// Column positions of each canonical field in one table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndex {
    columns: [Option<usize>; 7],
}

impl ColumnIndex {
    pub fn get(&self, field: Field) -> Option<usize> {
        self.columns[field.index()]
    }

    /// Required fields that no header resolved to
    pub fn missing_required(&self) -> Vec<Field> {
        Field::REQUIRED
            .into_iter()
            .filter(|f| self.get(*f).is_none())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolve_default_aliases() {
        let cols = FieldMapping::default().resolve(&headers(&[
            "date",
            "status",
            "vehicle_task",
            "time",
            "weight",
            "source",
            "station",
        ]));
        assert_eq!(cols.get(Field::Date), Some(0));
        assert_eq!(cols.get(Field::Task), Some(2));
        assert_eq!(cols.get(Field::Station), Some(6));
        assert!(cols.missing_required().is_empty());
    }

    #[test]
    fn test_resolve_is_case_insensitive_and_trimmed() {
        let cols = FieldMapping::default().resolve(&headers(&[" Station ", "Vehicle Task", "WEIGHT"]));
        assert_eq!(cols.get(Field::Station), Some(0));
        assert_eq!(cols.get(Field::Task), Some(1));
        assert_eq!(cols.get(Field::Weight), Some(2));
        assert_eq!(cols.get(Field::Date), None);
    }

    #[test]
    fn test_resolve_localized_headers() {
        let cols = FieldMapping::default().resolve(&headers(&["站點", "日期", "重量"]));
        assert_eq!(cols.get(Field::Station), Some(0));
        assert_eq!(cols.get(Field::Date), Some(1));
        assert_eq!(cols.get(Field::Weight), Some(2));
    }

    #[test]
    fn test_missing_required() {
        let cols = FieldMapping::default().resolve(&headers(&["date", "status"]));
        assert_eq!(cols.missing_required(), vec![Field::Station, Field::Weight]);
    }

    #[test]
    fn test_extend_from_toml() {
        let mut mapping = FieldMapping::default();
        mapping
            .extend_from_toml("station = [\"Facility\"]\nweight = [\"Net Weight\"]\n")
            .unwrap();
        let cols = mapping.resolve(&headers(&["Facility", "Net Weight"]));
        assert_eq!(cols.get(Field::Station), Some(0));
        assert_eq!(cols.get(Field::Weight), Some(1));
    }

    #[test]
    fn test_add_alias_skips_duplicates() {
        let mapping = FieldMapping::empty()
            .with_alias(Field::Station, "site")
            .with_alias(Field::Station, "SITE");
        assert_eq!(mapping.aliases(Field::Station).len(), 1);
    }
}
