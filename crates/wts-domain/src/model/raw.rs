//! Raw rows as delivered by a data source, before normalization

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single untyped cell value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl RawValue {
    /// Trimmed text form of the value, `None` for nulls and blank strings
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            RawValue::Null => None,
            RawValue::Bool(b) => Some(Cow::Owned(b.to_string())),
            RawValue::Number(n) => Some(Cow::Owned(n.to_string())),
            RawValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(Cow::Borrowed(trimmed))
                }
            }
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Null)
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Text(s)
    }
}

impl From<f64> for RawValue {
    fn from(n: f64) -> Self {
        RawValue::Number(n)
    }
}

impl From<Option<String>> for RawValue {
    fn from(value: Option<String>) -> Self {
        value.map(RawValue::Text).unwrap_or(RawValue::Null)
    }
}

/// One raw row keyed by source header
pub type RawRow = BTreeMap<String, RawValue>;

/// Header row plus positional rows, the common shape every source produces
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<RawValue>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Append a row, padding short rows with nulls and dropping extra cells
    pub fn push_row(&mut self, mut row: Vec<RawValue>) {
        row.resize(self.headers.len(), RawValue::Null);
        self.rows.push(row);
    }

    /// Build a table from keyed rows; headers appear in first-seen order
    pub fn from_rows(rows: Vec<RawRow>) -> Self {
        let mut headers: Vec<String> = Vec::new();
        for row in &rows {
            for key in row.keys() {
                if !headers.contains(key) {
                    headers.push(key.clone());
                }
            }
        }

        let mut table = RawTable::new(headers);
        for mut row in rows {
            let cells = table
                .headers
                .iter()
                .map(|h| row.remove(h).unwrap_or(RawValue::Null))
                .collect();
            table.rows.push(cells);
        }
        table
    }

    /// Keyed view of the row at `index`
    pub fn row(&self, index: usize) -> Option<RawRow> {
        let cells = self.rows.get(index)?;
        Some(
            self.headers
                .iter()
                .cloned()
                .zip(cells.iter().cloned())
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_text_trims_and_blanks() {
        assert_eq!(RawValue::from("  Shatin ").as_text().as_deref(), Some("Shatin"));
        assert_eq!(RawValue::from("   ").as_text(), None);
        assert_eq!(RawValue::Null.as_text(), None);
        assert_eq!(RawValue::Number(7.5).as_text().as_deref(), Some("7.5"));
        assert_eq!(RawValue::Number(8.0).as_text().as_deref(), Some("8"));
    }

    #[test]
    fn test_push_row_pads_short_rows() {
        let mut table = RawTable::new(vec!["station".into(), "weight".into(), "date".into()]);
        table.push_row(vec!["Tuen Mun".into()]);
        assert_eq!(table.rows[0].len(), 3);
        assert!(table.rows[0][2].is_null());
    }

    #[test]
    fn test_from_rows_unions_headers() {
        let mut a = RawRow::new();
        a.insert("station".into(), "A".into());
        let mut b = RawRow::new();
        b.insert("station".into(), "B".into());
        b.insert("weight".into(), RawValue::Number(2.0));

        let table = RawTable::from_rows(vec![a, b]);
        assert_eq!(table.headers, vec!["station".to_string(), "weight".to_string()]);
        assert!(table.rows[0][1].is_null());
        assert_eq!(table.row(1).unwrap()["weight"], RawValue::Number(2.0));
    }

    #[test]
    fn test_deserialize_untagged_json() {
        let row: RawRow =
            serde_json::from_str(r#"{"station":"A","weight":5.5,"date":null,"ok":true}"#).unwrap();
        assert_eq!(row["station"], RawValue::Text("A".into()));
        assert_eq!(row["weight"], RawValue::Number(5.5));
        assert_eq!(row["date"], RawValue::Null);
        assert_eq!(row["ok"], RawValue::Bool(true));
    }
}
