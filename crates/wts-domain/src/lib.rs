//! Domain layer for the transfer station dashboard
//!
//! Records, status and field alias tables, the row normalizer and the
//! aggregation engine. Nothing in this crate performs I/O.

pub mod model;
pub mod repository;
pub mod service;

pub use repository::DataSource;
