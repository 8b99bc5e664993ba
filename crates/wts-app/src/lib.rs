//! Application layer for the transfer station dashboard
//!
//! Ties configuration, data sources and the domain aggregations together
//! into dashboard snapshots the CLI renders or exports.

pub mod config;
pub mod dashboard;
pub mod export;
pub mod sources;

pub use config::{Config, SourceKind};
pub use dashboard::{Dashboard, DashboardView, Dataset};
pub use export::export_to_excel;
pub use sources::open_source;
