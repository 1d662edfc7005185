//! Comparison engine for the housing-model calibration dashboard.
//!
//! Takes two versioned snapshots and produces, for each catalog item, a
//! render-ready payload: rebinned distributions on a shared axis, merged
//! step-rate bands, or sampled parametric curves, with deltas and
//! provenance attached.

pub mod axis;
pub mod builder;
pub mod curves;
pub mod payload;
pub mod rebin;
pub mod report;
pub mod step_rate;

pub use builder::{Comparator, Selection};
pub use payload::{ComparisonResult, VisualPayload};
pub use report::ComparisonReport;
