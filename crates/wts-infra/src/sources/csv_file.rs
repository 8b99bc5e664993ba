//! CSV file source
//!
//! Exports from station systems are often Big5 rather than UTF-8, so the
//! file is decoded with a configurable encoding before parsing.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use encoding_rs::Encoding;
use tracing::{info, warn};
use wts_domain::model::{RawTable, RawValue};
use wts_domain::DataSource;
use wts_types::{Error, Result, SourceError};

/// Transactions exported to a CSV file with a header row
pub struct CsvFileSource {
    path: PathBuf,
    encoding: &'static Encoding,
}

impl CsvFileSource {
    /// `encoding` is a WHATWG label such as `utf-8`, `big5` or `shift_jis`
    pub fn new(path: impl Into<PathBuf>, encoding: &str) -> Result<Self> {
        let encoding = Encoding::for_label(encoding.trim().as_bytes()).ok_or_else(|| {
            Error::from_source("csv", SourceError::Encoding(encoding.to_string()))
        })?;
        Ok(Self {
            path: path.into(),
            encoding,
        })
    }

    fn read_decoded(&self) -> Result<String> {
        if !self.path.exists() {
            return Err(Error::FileNotFound(self.path.display().to_string()));
        }
        let mut file = File::open(&self.path)?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;

        // decode() also strips a BOM
        let (decoded, used, had_errors) = self.encoding.decode(&bytes);
        if had_errors {
            warn!(
                path = %self.path.display(),
                encoding = used.name(),
                "some characters could not be decoded"
            );
        }
        Ok(decoded.into_owned())
    }
}

/// Parse CSV text with a header row into a raw table
pub fn parse_csv(content: &str) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| Error::Csv(e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut table = RawTable::new(headers);
    for result in reader.records() {
        let record = result.map_err(|e| Error::Csv(e.to_string()))?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        table.push_row(record.iter().map(RawValue::from).collect());
    }
    Ok(table)
}

/// Write a raw table as UTF-8 CSV
pub fn write_table_csv(table: &RawTable, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| Error::Csv(e.to_string()))?;
    writer
        .write_record(&table.headers)
        .map_err(|e| Error::Csv(e.to_string()))?;

    for row in &table.rows {
        let cells: Vec<String> = row
            .iter()
            .map(|v| v.as_text().map(|t| t.into_owned()).unwrap_or_default())
            .collect();
        writer
            .write_record(&cells)
            .map_err(|e| Error::Csv(e.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

impl DataSource for CsvFileSource {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch(&self) -> Result<RawTable> {
        let content = self.read_decoded()?;
        let table = parse_csv(&content)?;
        info!(path = %self.path.display(), rows = table.len(), "loaded CSV file");
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_csv_trims_and_skips_blank_rows() {
        let table = parse_csv(
            "station, date ,weight\n Kwai Chung ,2024-01-20, 7.5\n,,\nShatin,2024-01-21\n",
        )
        .unwrap();
        assert_eq!(table.headers, vec!["station", "date", "weight"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0][0], RawValue::Text("Kwai Chung".into()));
        assert!(table.rows[1][2].is_null());
    }

    #[test]
    fn test_fetch_big5_file() {
        let mut file = NamedTempFile::new().unwrap();
        let content = "站點,日期,重量\n葵涌,2024-01-20,7.5\n";
        let (encoded, _, _) = encoding_rs::BIG5.encode(content);
        file.write_all(&encoded).unwrap();

        let source = CsvFileSource::new(file.path(), "big5").unwrap();
        let table = source.fetch().unwrap();
        assert_eq!(table.headers, vec!["站點", "日期", "重量"]);
        assert_eq!(table.rows[0][0], RawValue::Text("葵涌".into()));
    }

    #[test]
    fn test_unknown_encoding() {
        assert!(CsvFileSource::new("x.csv", "klingon").is_err());
    }

    #[test]
    fn test_missing_file() {
        let source = CsvFileSource::new("/nonexistent/data.csv", "utf-8").unwrap();
        assert!(matches!(source.fetch(), Err(Error::FileNotFound(_))));
    }

    #[test]
    fn test_write_then_fetch() {
        let mut table = RawTable::new(vec!["station".into(), "weight".into()]);
        table.push_row(vec!["Tuen Mun".into(), RawValue::Number(6.25)]);
        table.push_row(vec!["Yuen Long".into(), RawValue::Null]);

        let file = NamedTempFile::new().unwrap();
        write_table_csv(&table, file.path()).unwrap();

        let loaded = CsvFileSource::new(file.path(), "utf-8").unwrap().fetch().unwrap();
        assert_eq!(loaded.rows[0][1], RawValue::Text("6.25".into()));
        assert_eq!(loaded.len(), 2);
    }
}
