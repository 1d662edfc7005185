//! Step-rate schedules (tax and National Insurance bands).
//!
//! A schedule row `[threshold, rate]` means "this marginal rate applies from
//! `threshold` up to the next threshold". Schedules are not densities, so
//! they are compared by evaluating both step functions on the merged
//! breakpoints instead of by overlap rebinning.

use serde::Serialize;

use crate::axis::format_currency;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RateStep {
    pub threshold: f64,
    pub rate: f64,
}

/// Steps from the first two columns of each row, sorted by threshold.
pub fn steps_from_rows(rows: &[Vec<f64>]) -> Vec<RateStep> {
    let mut steps: Vec<RateStep> = rows
        .iter()
        .filter(|r| r.len() >= 2)
        .map(|r| RateStep {
            threshold: r[0],
            rate: r[1],
        })
        .collect();
    steps.sort_by(|a, b| a.threshold.total_cmp(&b.threshold));
    steps
}

/// Rate of the greatest threshold `<= x`, or 0 below every threshold.
///
/// `steps` must be sorted by threshold.
pub fn rate_at(steps: &[RateStep], x: f64) -> f64 {
    let idx = steps.partition_point(|s| s.threshold <= x);
    if idx == 0 { 0.0 } else { steps[idx - 1].rate }
}

/// One band between consecutive breakpoints
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateBand {
    pub lower: f64,
    /// Equal to `lower` for the open-ended final band.
    pub upper: f64,
    pub label: String,
    pub left_rate: f64,
    pub right_rate: f64,
    pub delta: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRateComparison {
    pub bands: Vec<RateBand>,
}

impl StepRateComparison {
    pub fn max_abs_delta(&self) -> f64 {
        self.bands
            .iter()
            .map(|b| b.delta.abs())
            .fold(0.0, f64::max)
    }
}

/// Evaluate both schedules on the union of their thresholds and 0.
pub fn compare_step_rates(left_rows: &[Vec<f64>], right_rows: &[Vec<f64>]) -> StepRateComparison {
    let left = steps_from_rows(left_rows);
    let right = steps_from_rows(right_rows);

    let mut breakpoints: Vec<f64> = core::iter::once(0.0)
        .chain(left.iter().map(|s| s.threshold))
        .chain(right.iter().map(|s| s.threshold))
        .collect();
    crate::axis::sort_dedup_edges(&mut breakpoints);

    let bands = breakpoints
        .iter()
        .enumerate()
        .map(|(i, &lower)| {
            let next = breakpoints.get(i + 1).copied();
            let upper = next.unwrap_or(lower);
            let label = match next {
                Some(upper) => format!("{}-{}", format_currency(lower), format_currency(upper)),
                None => format!(">= {}", format_currency(lower)),
            };
            let left_rate = rate_at(&left, lower);
            let right_rate = rate_at(&right, lower);
            RateBand {
                lower,
                upper,
                label,
                left_rate,
                right_rate,
                delta: right_rate - left_rate,
            }
        })
        .collect();

    StepRateComparison { bands }
}
