//! Shared axes and their display labels.
//!
//! An axis is a sorted list of bin edges in the data file's native units.
//! For `log` axes the edges are logarithms; only the labels are
//! exponentiated, never the arithmetic.

use hc_core::EPSILON;
use serde::{Deserialize, Serialize};

/// How the file stores an axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisScale {
    #[default]
    Linear,
    Log,
}

/// What the axis values mean, for formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueKind {
    /// Years of age.
    Age,
    /// Fractions shown as percentages.
    Percentile,
    /// Amounts of money (exponentiated log axes).
    Currency,
    Generic,
}

/// Axis built fresh for one comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedAxis {
    pub edges: Vec<f64>,
    pub labels: Vec<String>,
    pub scale: AxisScale,
    pub kind: ValueKind,
}

impl SharedAxis {
    /// Axis over the given edges; `edges` must be sorted ascending.
    pub fn from_edges(edges: Vec<f64>, scale: AxisScale) -> Self {
        let (min, max) = match (edges.first(), edges.last()) {
            (Some(&lo), Some(&hi)) => (lo, hi),
            _ => (0.0, 0.0),
        };
        let kind = infer_kind(min, max, scale);
        let labels = edges
            .windows(2)
            .map(|w| bin_label(w[0], w[1], scale, kind))
            .collect();
        Self {
            edges,
            labels,
            scale,
            kind,
        }
    }

    /// Evenly spaced axis of `count` bins over `[min, max]`.
    pub fn even(min: f64, max: f64, count: usize, scale: AxisScale) -> Self {
        Self::from_edges(even_edges(min, max, count), scale)
    }

    pub fn bin_count(&self) -> usize {
        self.edges.len().saturating_sub(1)
    }

    pub fn domain(&self) -> (f64, f64) {
        match (self.edges.first(), self.edges.last()) {
            (Some(&lo), Some(&hi)) => (lo, hi),
            _ => (0.0, 0.0),
        }
    }
}

/// `count + 1` evenly spaced edges from `min` to `max`.
///
/// A domain narrower than `EPSILON` is widened to `[min, min + 1]`. The last
/// edge is pinned to `max` so the axis covers the domain exactly.
pub fn even_edges(min: f64, max: f64, count: usize) -> Vec<f64> {
    let count = count.max(1);
    let max = if max - min > EPSILON { max } else { min + 1.0 };
    let width = (max - min) / count as f64;
    let mut edges: Vec<f64> = (0..count).map(|i| min + width * i as f64).collect();
    edges.push(max);
    edges
}

/// Sort ascending and drop values within `EPSILON` of their predecessor.
pub fn sort_dedup_edges(edges: &mut Vec<f64>) {
    edges.retain(|e| e.is_finite());
    edges.sort_by(|a, b| a.total_cmp(b));
    edges.dedup_by(|b, a| (*b - *a).abs() <= EPSILON);
}

/// Guess what an axis measures from its domain.
pub fn infer_kind(min: f64, max: f64, scale: AxisScale) -> ValueKind {
    if scale == AxisScale::Log {
        ValueKind::Currency
    } else if min >= 10.0 && max <= 120.0 {
        ValueKind::Age
    } else if min >= 0.0 && max <= 1.2 {
        ValueKind::Percentile
    } else {
        ValueKind::Generic
    }
}

pub fn bin_label(lower: f64, upper: f64, scale: AxisScale, kind: ValueKind) -> String {
    format!(
        "{}-{}",
        format_value(display_value(lower, scale), kind),
        format_value(display_value(upper, scale), kind)
    )
}

/// Value as shown to a reader: log edges are exponentiated.
pub fn display_value(v: f64, scale: AxisScale) -> f64 {
    match scale {
        AxisScale::Linear => v,
        AxisScale::Log => v.exp(),
    }
}

pub fn format_value(v: f64, kind: ValueKind) -> String {
    match kind {
        ValueKind::Age => {
            if (v - v.round()).abs() < 1e-9 {
                format!("{}", v.round() as i64)
            } else {
                format!("{:.1}", v)
            }
        }
        ValueKind::Percentile => format!("{}%", trim_decimals(v * 100.0, 1)),
        ValueKind::Currency => format_currency(v),
        ValueKind::Generic => format_compact(v),
    }
}

/// `12570` -> `12.6k`, `2500000` -> `2.5M`.
pub fn format_compact(v: f64) -> String {
    let abs = v.abs();
    let sign = if v < 0.0 { "-" } else { "" };
    if abs >= 1e9 {
        format!("{}{}B", sign, trim_decimals(abs / 1e9, 1))
    } else if abs >= 1e6 {
        format!("{}{}M", sign, trim_decimals(abs / 1e6, 1))
    } else if abs >= 1e3 {
        format!("{}{}k", sign, trim_decimals(abs / 1e3, 1))
    } else {
        format!("{}{}", sign, trim_decimals(abs, 2))
    }
}

pub fn format_currency(v: f64) -> String {
    if v < 0.0 {
        format!("-£{}", format_compact(-v))
    } else {
        format!("£{}", format_compact(v))
    }
}

fn trim_decimals(v: f64, places: usize) -> String {
    let s = format!("{:.*}", places, v);
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}
