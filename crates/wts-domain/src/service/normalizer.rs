//! Row normalizer: raw cells to typed [`Record`]s
//!
//! Each row is coerced independently. A bad date or weight never aborts the
//! rest of the table.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use wts_types::{Error, Result, UndatedPolicy};

use crate::model::{
    ColumnIndex, Field, FieldMapping, RawRow, RawTable, RawValue, Record, StatusAliases, UNKNOWN,
};

/// Why a row was left out of the working set
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum RowIssue {
    #[error("station is missing or blank")]
    MissingStation,

    #[error("date is missing or unparseable: {value:?}")]
    Undated { value: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRow {
    /// Zero-based position in the source table
    pub row: usize,
    pub issue: RowIssue,
}

/// Result of normalizing one table
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizedBatch {
    pub records: Vec<Record>,
    pub rejected: Vec<RejectedRow>,
    /// Records kept with no date under [`UndatedPolicy::Retain`]
    pub undated_retained: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    mapping: FieldMapping,
    statuses: StatusAliases,
    undated: UndatedPolicy,
}

impl Normalizer {
    pub fn new(mapping: FieldMapping, statuses: StatusAliases) -> Self {
        Self {
            mapping,
            statuses,
            undated: UndatedPolicy::default(),
        }
    }

    pub fn with_undated_policy(mut self, policy: UndatedPolicy) -> Self {
        self.undated = policy;
        self
    }

    pub fn undated_policy(&self) -> UndatedPolicy {
        self.undated
    }

    pub fn mapping(&self) -> &FieldMapping {
        &self.mapping
    }

    /// Normalize a single keyed row
    pub fn normalize_row(&self, row: &RawRow) -> std::result::Result<Record, RowIssue> {
        let lookup = |field: Field| {
            self.mapping.aliases(field).iter().find_map(|alias| {
                row.iter()
                    .find(|(key, _)| key.trim().to_lowercase() == alias.trim().to_lowercase())
                    .map(|(_, value)| value)
            })
        };
        self.build_record(lookup)
    }

    /// Normalize every row of a table, resolving header aliases once
    pub fn normalize_table(&self, table: &RawTable) -> Result<NormalizedBatch> {
        let mut batch = NormalizedBatch::default();
        if table.is_empty() {
            return Ok(batch);
        }

        let columns = self.mapping.resolve(&table.headers);
        if let Some(field) = columns.missing_required().first() {
            return Err(Error::InvalidArgument(format!(
                "no column matches required field '{}' (headers: {})",
                field,
                table.headers.join(", ")
            )));
        }

        for (index, cells) in table.rows.iter().enumerate() {
            match self.build_record(|field| cell(&columns, cells, field)) {
                Ok(record) => {
                    if record.date.is_none() {
                        batch.undated_retained += 1;
                    }
                    batch.records.push(record);
                }
                Err(issue) => {
                    debug!(row = index, %issue, "row skipped");
                    batch.rejected.push(RejectedRow { row: index, issue });
                }
            }
        }

        Ok(batch)
    }

    fn build_record<'a, F>(&self, lookup: F) -> std::result::Result<Record, RowIssue>
    where
        F: Fn(Field) -> Option<&'a RawValue>,
    {
        let station = lookup(Field::Station)
            .and_then(RawValue::as_text)
            .ok_or(RowIssue::MissingStation)?
            .into_owned();

        let raw_date = lookup(Field::Date).and_then(RawValue::as_text);
        let date = raw_date.as_deref().and_then(parse_date);
        if date.is_none() && self.undated == UndatedPolicy::Exclude {
            return Err(RowIssue::Undated {
                value: raw_date.map(|d| d.into_owned()),
            });
        }

        let status_label = text_or_unknown(lookup(Field::Status));
        let status = self.statuses.recognize(&status_label);

        Ok(Record {
            station,
            date,
            status,
            status_label,
            task: text_or_unknown(lookup(Field::Task)),
            time: text_or_unknown(lookup(Field::Time)),
            weight: lookup(Field::Weight).map(parse_weight).unwrap_or(0.0),
            source: text_or_unknown(lookup(Field::Source)),
        })
    }
}

fn cell<'a>(columns: &ColumnIndex, cells: &'a [RawValue], field: Field) -> Option<&'a RawValue> {
    columns.get(field).and_then(|i| cells.get(i))
}

fn text_or_unknown(value: Option<&RawValue>) -> String {
    value
        .and_then(RawValue::as_text)
        .map(|s| s.into_owned())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Coerce a weight cell to non-negative tons; anything unusable becomes zero
pub fn parse_weight(value: &RawValue) -> f64 {
    let parsed = match value {
        RawValue::Number(n) => *n,
        RawValue::Text(s) => strip_grouping(s.trim())
            .and_then(|t| t.parse().ok())
            .unwrap_or(0.0),
        RawValue::Bool(_) | RawValue::Null => 0.0,
    };
    if parsed.is_finite() && parsed > 0.0 {
        parsed
    } else {
        0.0
    }
}

/// Remove thousands separators; `None` when a comma is anything else
fn strip_grouping(s: &str) -> Option<String> {
    if !s.contains(',') {
        return Some(s.to_string());
    }
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s, None),
    };
    if frac_part.is_some_and(|f| f.contains(',')) {
        return None;
    }

    let mut groups = int_part.split(',');
    let lead = groups.next()?;
    let lead_digits = lead.trim_start_matches(['-', '+']);
    if lead_digits.is_empty() || lead_digits.len() > 3 || !is_digits(lead_digits) {
        return None;
    }
    let mut out = lead.to_string();
    for group in groups {
        if group.len() != 3 || !is_digits(group) {
            return None;
        }
        out.push_str(group);
    }
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    Some(out)
}

/// Parse a date cell into a calendar date
///
/// Year-first input (`2024-01-20`, `2024/01/20`, `2024年1月20日`, optionally
/// followed by a time part) is read directly. `A/B/YYYY` is read as
/// month/day and retried as day/month when that is not a real date.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let s = input.trim();
    let date_part = s.split(['T', ' ']).next().unwrap_or(s);

    let parts: Vec<&str> = date_part.split(['-', '/', '.']).collect();
    if parts.len() == 3 && parts.iter().all(|p| is_digits(p)) {
        if parts[0].len() == 4 {
            return ymd(parts[0], parts[1], parts[2]);
        }
        if parts[2].len() == 4 {
            return ymd(parts[2], parts[0], parts[1])
                .or_else(|| ymd(parts[2], parts[1], parts[0]));
        }
        return None;
    }

    NaiveDate::parse_from_str(date_part, "%Y年%m月%d日").ok()
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    if month.len() > 2 || day.len() > 2 {
        return None;
    }
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Status;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn table(headers: &[&str], rows: Vec<Vec<RawValue>>) -> RawTable {
        let mut table = RawTable::new(headers.iter().map(|h| h.to_string()).collect());
        for row in rows {
            table.push_row(row);
        }
        table
    }

    #[test]
    fn test_parse_date_iso() {
        assert_eq!(parse_date("2024-01-20"), Some(date(2024, 1, 20)));
        assert_eq!(parse_date("2024-01-20T00:00:00"), Some(date(2024, 1, 20)));
        assert_eq!(parse_date("2024/1/5"), Some(date(2024, 1, 5)));
        assert_eq!(parse_date("2024年01月20日"), Some(date(2024, 1, 20)));
    }

    #[test]
    fn test_parse_date_ambiguous_month_first() {
        assert_eq!(parse_date("01/02/2024"), Some(date(2024, 1, 2)));
        // repeated calls give the same answer
        for _ in 0..3 {
            assert_eq!(parse_date("01/02/2024"), Some(date(2024, 1, 2)));
        }
    }

    #[test]
    fn test_parse_date_ambiguous_swaps_when_invalid() {
        assert_eq!(parse_date("25/12/2023"), Some(date(2023, 12, 25)));
        assert_eq!(parse_date("12-25-2023"), Some(date(2023, 12, 25)));
    }

    #[test]
    fn test_parse_date_invalid() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("31/31/2024"), None);
        assert_eq!(parse_date("2024-02-30"), None);
        assert_eq!(parse_date("1/2/24"), None);
    }

    #[test]
    fn test_parse_weight() {
        assert_eq!(parse_weight(&RawValue::from("7.25")), 7.25);
        assert_eq!(parse_weight(&RawValue::from(" 1,234.5 ")), 1234.5);
        assert_eq!(parse_weight(&RawValue::Number(3.0)), 3.0);
        assert_eq!(parse_weight(&RawValue::from("heavy")), 0.0);
        assert_eq!(parse_weight(&RawValue::from("-4")), 0.0);
        assert_eq!(parse_weight(&RawValue::from("NaN")), 0.0);
        assert_eq!(parse_weight(&RawValue::Null), 0.0);
    }

    #[test]
    fn test_parse_weight_comma_only_groups_thousands() {
        assert_eq!(parse_weight(&RawValue::from("12,345,678")), 12345678.0);
        assert_eq!(parse_weight(&RawValue::from("1,000")), 1000.0);
        // decimal comma is not read as a grouping separator
        assert_eq!(parse_weight(&RawValue::from("7,5")), 0.0);
        assert_eq!(parse_weight(&RawValue::from("1,23.5")), 0.0);
        assert_eq!(parse_weight(&RawValue::from("1234,567")), 0.0);
        assert_eq!(parse_weight(&RawValue::from("1.5,0")), 0.0);
        assert_eq!(parse_weight(&RawValue::from(",500")), 0.0);
    }

    #[test]
    fn test_normalize_row_defaults() {
        let mut row = RawRow::new();
        row.insert("station".into(), " Kwai Chung ".into());
        row.insert("date".into(), "2024-01-20".into());
        row.insert("weight".into(), "oops".into());
        row.insert("status".into(), "   ".into());

        let record = Normalizer::default().normalize_row(&row).unwrap();
        assert_eq!(record.station, "Kwai Chung");
        assert_eq!(record.weight, 0.0);
        assert_eq!(record.status, Status::Unknown);
        assert_eq!(record.status_label, "Unknown");
        assert_eq!(record.task, "Unknown");
        assert_eq!(record.time, "Unknown");
        assert_eq!(record.source, "Unknown");
    }

    #[test]
    fn test_normalize_row_missing_station() {
        let mut row = RawRow::new();
        row.insert("station".into(), "".into());
        row.insert("date".into(), "2024-01-20".into());
        assert_eq!(
            Normalizer::default().normalize_row(&row),
            Err(RowIssue::MissingStation)
        );
    }

    #[test]
    fn test_normalize_table_isolates_bad_rows() {
        let t = table(
            &["station", "date", "status", "weight"],
            vec![
                vec!["A".into(), "2024-01-01".into(), "Completed".into(), "5".into()],
                vec!["".into(), "2024-01-01".into(), "Completed".into(), "5".into()],
                vec!["B".into(), "garbage".into(), "Pending".into(), "2".into()],
                vec!["C".into(), "2024-01-02".into(), "已完成".into(), "x".into()],
            ],
        );

        let batch = Normalizer::default().normalize_table(&t).unwrap();
        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.rejected.len(), 2);
        assert_eq!(batch.rejected[0].row, 1);
        assert_eq!(batch.rejected[0].issue, RowIssue::MissingStation);
        assert_eq!(
            batch.rejected[1].issue,
            RowIssue::Undated {
                value: Some("garbage".to_string())
            }
        );
        assert_eq!(batch.records[1].status, Status::Completed);
        assert_eq!(batch.records[1].weight, 0.0);
        assert_eq!(batch.undated_retained, 0);
    }

    #[test]
    fn test_normalize_table_retain_undated() {
        let t = table(
            &["station", "date", "weight"],
            vec![
                vec!["A".into(), "2024-01-01".into(), "5".into()],
                vec!["B".into(), RawValue::Null, "2".into()],
            ],
        );

        let batch = Normalizer::default()
            .with_undated_policy(UndatedPolicy::Retain)
            .normalize_table(&t)
            .unwrap();
        assert_eq!(batch.records.len(), 2);
        assert!(batch.records[1].date.is_none());
        assert_eq!(batch.undated_retained, 1);
        assert!(batch.rejected.is_empty());
    }

    #[test]
    fn test_normalize_table_missing_required_column() {
        let t = table(&["date", "weight"], vec![vec!["2024-01-01".into(), "1".into()]]);
        let err = Normalizer::default().normalize_table(&t).unwrap_err();
        assert!(err.to_string().contains("station"));
    }

    #[test]
    fn test_normalize_empty_table() {
        let batch = Normalizer::default()
            .normalize_table(&RawTable::default())
            .unwrap();
        assert!(batch.records.is_empty());
        assert!(batch.rejected.is_empty());
    }
}
