//! hc-data: static catalog of comparable calibration parameters
//!
//! Lists every parameter the dashboard knows how to compare, which config
//! keys feed it and which visual shape it takes.

pub mod catalog;

pub use catalog::{
    entries_in_group, find_entry, get_entry, groups, num_entries, require_entry, CATALOG,
};
