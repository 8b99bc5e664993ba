//! Data source trait definitions

use wts_types::Error;

use crate::model::RawTable;
use crate::service::{NormalizedBatch, Normalizer};

/// Anything that can hand over the raw rows of one load cycle
///
/// Implementations cover REST endpoints, local files and generated mock
/// data. They are interchangeable: the engine only ever sees the table.
pub trait DataSource {
    /// Short name used in logs and error messages
    fn name(&self) -> &str;

    /// Fetch the complete raw table
    fn fetch(&self) -> Result<RawTable, Error>;

    /// Fetch and normalize in one step
    fn load(&self, normalizer: &Normalizer) -> Result<NormalizedBatch, Error> {
        let table = self.fetch()?;
        normalizer.normalize_table(&table)
    }
}
