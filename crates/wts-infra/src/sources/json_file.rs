//! JSON file source: an array of flat objects, one per transaction

use std::path::PathBuf;

use tracing::info;
use wts_domain::model::{RawRow, RawTable};
use wts_domain::DataSource;
use wts_types::{Error, Result};

pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DataSource for JsonFileSource {
    fn name(&self) -> &str {
        "json"
    }

    fn fetch(&self) -> Result<RawTable> {
        if !self.path.exists() {
            return Err(Error::FileNotFound(self.path.display().to_string()));
        }
        let content = std::fs::read_to_string(&self.path)?;
        let rows: Vec<RawRow> = serde_json::from_str(&content)?;
        let table = RawTable::from_rows(rows);
        info!(path = %self.path.display(), rows = table.len(), "loaded JSON file");
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use wts_domain::model::RawValue;

    #[test]
    fn test_fetch_json_rows() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"station": "Shatin", "weight": 7.5, "date": "2024-01-20"}},
                {{"station": "Tuen Mun", "weight": "6", "status": null}}
            ]"#
        )
        .unwrap();

        let table = JsonFileSource::new(file.path()).fetch().unwrap();
        assert_eq!(table.len(), 2);
        let second = table.row(1).unwrap();
        assert_eq!(second["station"], RawValue::Text("Tuen Mun".into()));
        assert!(second["date"].is_null());
    }

    #[test]
    fn test_fetch_rejects_non_array() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"station": "Shatin"}}"#).unwrap();
        assert!(matches!(
            JsonFileSource::new(file.path()).fetch(),
            Err(Error::Json(_))
        ));
    }
}
