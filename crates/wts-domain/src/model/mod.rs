//! Domain model types

pub mod field;
pub mod raw;
pub mod record;
pub mod status;
pub mod summary;

pub use field::{ColumnIndex, Field, FieldAliasFile, FieldMapping};
pub use raw::{RawRow, RawTable, RawValue};
pub use record::{Record, UNKNOWN};
pub use status::{Status, StatusAliases};
pub use summary::{
    DailyWeight, DashboardStats, GroupKey, StationFilter, StationOption, StationSummary,
    StatusCount, WeightGroup, ALL_STATIONS,
};
