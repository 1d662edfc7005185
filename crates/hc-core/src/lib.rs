//! hc-core: versioned configuration store for the housing-model calibration dashboard
//!
//! This crate owns everything the comparison engine reads: version ordering,
//! `config.properties` snapshots, numeric CSV data files, the catalog schema,
//! the version-notes provenance log and dataset attribution. It performs no
//! numeric comparison work itself.

pub mod attribution;
pub mod catalog;
pub mod config;
pub mod csv;
pub mod notes;
pub mod runs;
pub mod settings;
pub mod store;
pub mod version;

mod consts;
mod error;

pub use catalog::{CatalogEntry, CatalogFormat};
pub use config::ConfigSnapshot;
pub use consts::*;
pub use csv::CsvCache;
pub use error::{DashError, Result};
pub use store::VersionStore;
pub use version::Version;
