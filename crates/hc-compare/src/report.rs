//! Comparison reporting: aggregates per-item results into a human-readable
//! summary and a machine-readable document.

use hc_core::Version;
use serde::Serialize;

use crate::payload::ComparisonResult;

/// Outcome of comparing two versions over a catalog selection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonReport {
    pub left: Version,
    pub right: Version,
    /// Items compared.
    pub total: usize,
    /// Items with at least one nonzero delta.
    pub updated: usize,
    pub unchanged: usize,
    pub results: Vec<ComparisonResult>,
}

impl ComparisonReport {
    pub fn from_results(left: Version, right: Version, results: Vec<ComparisonResult>) -> Self {
        let unchanged = results.iter().filter(|r| r.unchanged).count();
        Self {
            left,
            right,
            total: results.len(),
            updated: results.len() - unchanged,
            unchanged,
            results,
        }
    }

    /// Ids of the items that changed, in catalog order.
    pub fn updated_ids(&self) -> Vec<&'static str> {
        self.results
            .iter()
            .filter(|r| !r.unchanged)
            .map(|r| r.id)
            .collect()
    }

    /// Print a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n============================================================");
        println!("Calibration comparison: {} -> {}", self.left, self.right);
        println!(
            "Items: {} total, {} updated, {} unchanged",
            self.total, self.updated, self.unchanged
        );

        let mut group = "";
        for r in &self.results {
            if r.group != group {
                group = r.group;
                println!("\n{}:", group);
            }
            let mark = if r.unchanged { " " } else { "*" };
            println!("  {} {:<32} {}", mark, r.id, r.format);
            for origin in &r.change_origins_in_range {
                println!("      {} {}", origin.version, origin.description);
            }
        }

        println!("============================================================\n");
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
    }
}
