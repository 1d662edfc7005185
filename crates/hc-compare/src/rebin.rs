//! Mass-preserving rebinning of 1-D and 2-D distributions.
//!
//! Two versions of a distribution rarely share bin edges. Both sides are
//! redistributed onto one shared axis by linear overlap: a source bin gives
//! each target bin the fraction of its mass equal to the fraction of its
//! width the target covers. As long as the target axis spans every source
//! bin, the total mass is unchanged.

use hc_core::EPSILON;
use serde::Serialize;

use crate::axis::{AxisScale, SharedAxis, sort_dedup_edges};

/// One 1-D bin in native file units
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bin {
    pub lower: f64,
    pub upper: f64,
    pub value: f64,
}

impl Bin {
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// One 2-D cell in native file units
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Cell {
    pub x_lower: f64,
    pub x_upper: f64,
    pub y_lower: f64,
    pub y_upper: f64,
    pub value: f64,
}

/// Turn raw CSV rows into bins.
///
/// Rows with three or more columns are `[lower, upper, value]`. Two-column
/// rows are point form `[x, value]`; their upper edge is the next row's lower
/// edge. The last point-form row reuses the previous bin's width, and a lone
/// point-form row is zero-width.
pub fn normalize_rows(rows: &[Vec<f64>]) -> Vec<Bin> {
    let rows: Vec<&Vec<f64>> = rows.iter().filter(|r| r.len() >= 2).collect();
    let mut bins = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        if row.len() >= 3 {
            bins.push(Bin {
                lower: row[0],
                upper: row[1],
                value: row[2],
            });
            continue;
        }

        let lower = row[0];
        let upper = match rows.get(i + 1) {
            Some(next) => next[0],
            None if i > 0 => lower + (lower - rows[i - 1][0]).max(0.0),
            None => lower,
        };
        bins.push(Bin {
            lower,
            upper,
            value: row[1],
        });
    }

    bins
}

/// Turn raw CSV rows `[x_lo, x_hi, y_lo, y_hi, value]` into cells.
pub fn normalize_cells(rows: &[Vec<f64>]) -> Vec<Cell> {
    rows.iter()
        .filter(|r| r.len() >= 5)
        .map(|r| Cell {
            x_lower: r[0],
            x_upper: r[1],
            y_lower: r[2],
            y_upper: r[3],
            value: r[4],
        })
        .collect()
}

/// Sorted, deduplicated union of all bin edges.
pub fn extract_edges_from_bins(bins: &[Bin]) -> Vec<f64> {
    let mut edges: Vec<f64> = bins.iter().flat_map(|b| [b.lower, b.upper]).collect();
    sort_dedup_edges(&mut edges);
    edges
}

/// Fraction of `[lower, upper)` that falls into each target bin.
///
/// Returns `(target index, ratio)` pairs; empty for zero-width sources.
pub fn overlap_ratios(lower: f64, upper: f64, edges: &[f64]) -> Vec<(usize, f64)> {
    let width = upper - lower;
    if width <= EPSILON {
        return Vec::new();
    }
    edges
        .windows(2)
        .enumerate()
        .filter_map(|(i, w)| {
            let overlap = upper.min(w[1]) - lower.max(w[0]);
            (overlap > 0.0).then(|| (i, overlap / width))
        })
        .collect()
}

/// Redistribute `bins` onto the bins delimited by `edges`.
pub fn rebin_onto(bins: &[Bin], edges: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; edges.len().saturating_sub(1)];
    for bin in bins {
        for (i, ratio) in overlap_ratios(bin.lower, bin.upper, edges) {
            out[i] += bin.value * ratio;
        }
    }
    out
}

/// Redistribute `cells` onto the grid `x_edges` x `y_edges`.
///
/// The result is row-major: `out[y][x]`.
pub fn rebin_cells(cells: &[Cell], x_edges: &[f64], y_edges: &[f64]) -> Vec<Vec<f64>> {
    let nx = x_edges.len().saturating_sub(1);
    let ny = y_edges.len().saturating_sub(1);
    let mut out = vec![vec![0.0; nx]; ny];
    for cell in cells {
        let xs = overlap_ratios(cell.x_lower, cell.x_upper, x_edges);
        if xs.is_empty() {
            continue;
        }
        for (yi, y_ratio) in overlap_ratios(cell.y_lower, cell.y_upper, y_edges) {
            for &(xi, x_ratio) in &xs {
                out[yi][xi] += cell.value * x_ratio * y_ratio;
            }
        }
    }
    out
}

/// Two 1-D distributions on one axis
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BinnedComparison {
    pub axis: SharedAxis,
    pub left: Vec<f64>,
    pub right: Vec<f64>,
    pub delta: Vec<f64>,
    pub left_total: f64,
    pub right_total: f64,
    /// Mass summed straight from the file.
    pub raw_left_total: f64,
    pub raw_right_total: f64,
}

/// Rebin two row-sets onto a shared, evenly spaced axis.
pub fn compare_binned(
    left_rows: &[Vec<f64>],
    right_rows: &[Vec<f64>],
    scale: AxisScale,
) -> BinnedComparison {
    let left_bins = normalize_rows(left_rows);
    let right_bins = normalize_rows(right_rows);

    let mut edges = extract_edges_from_bins(&left_bins);
    edges.extend(extract_edges_from_bins(&right_bins));
    sort_dedup_edges(&mut edges);

    let count = left_bins.len().max(right_bins.len()).max(1);
    let (min, max) = domain_of(&edges);
    let axis = SharedAxis::even(min, max, count, scale);

    let left = rebin_onto(&left_bins, &axis.edges);
    let right = rebin_onto(&right_bins, &axis.edges);
    let delta = right.iter().zip(&left).map(|(r, l)| r - l).collect();

    BinnedComparison {
        left_total: left.iter().sum(),
        right_total: right.iter().sum(),
        raw_left_total: left_bins.iter().map(|b| b.value).sum(),
        raw_right_total: right_bins.iter().map(|b| b.value).sum(),
        axis,
        left,
        right,
        delta,
    }
}

/// One cell of a joint heat map
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatCell {
    pub x_index: usize,
    pub y_index: usize,
    pub left: f64,
    pub right: f64,
    pub delta: f64,
}

/// Two 2-D distributions on one grid
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JointComparison {
    pub x_axis: SharedAxis,
    pub y_axis: SharedAxis,
    pub cells: Vec<HeatCell>,
    pub left_total: f64,
    pub right_total: f64,
    pub raw_left_total: f64,
    pub raw_right_total: f64,
}

/// Rebin two joint cell sets onto a shared grid, one axis per dimension.
pub fn compare_joint(
    left_rows: &[Vec<f64>],
    right_rows: &[Vec<f64>],
    x_scale: AxisScale,
    y_scale: AxisScale,
) -> JointComparison {
    let left_cells = normalize_cells(left_rows);
    let right_cells = normalize_cells(right_rows);

    let x_axis = joint_axis(&left_cells, &right_cells, |c| (c.x_lower, c.x_upper), x_scale);
    let y_axis = joint_axis(&left_cells, &right_cells, |c| (c.y_lower, c.y_upper), y_scale);

    let left = rebin_cells(&left_cells, &x_axis.edges, &y_axis.edges);
    let right = rebin_cells(&right_cells, &x_axis.edges, &y_axis.edges);

    let mut cells = Vec::with_capacity(x_axis.bin_count() * y_axis.bin_count());
    for (y_index, (lrow, rrow)) in left.iter().zip(&right).enumerate() {
        for (x_index, (&l, &r)) in lrow.iter().zip(rrow).enumerate() {
            cells.push(HeatCell {
                x_index,
                y_index,
                left: l,
                right: r,
                delta: r - l,
            });
        }
    }

    JointComparison {
        left_total: cells.iter().map(|c| c.left).sum(),
        right_total: cells.iter().map(|c| c.right).sum(),
        raw_left_total: left_cells.iter().map(|c| c.value).sum(),
        raw_right_total: right_cells.iter().map(|c| c.value).sum(),
        x_axis,
        y_axis,
        cells,
    }
}

fn joint_axis(
    left: &[Cell],
    right: &[Cell],
    interval: impl Fn(&Cell) -> (f64, f64),
    scale: AxisScale,
) -> SharedAxis {
    let left_bins = distinct_intervals(left, &interval);
    let right_bins = distinct_intervals(right, &interval);

    let mut edges = extract_edges_from_bins(&left_bins);
    edges.extend(extract_edges_from_bins(&right_bins));
    sort_dedup_edges(&mut edges);

    let count = left_bins.len().max(right_bins.len()).max(1);
    let (min, max) = domain_of(&edges);
    SharedAxis::even(min, max, count, scale)
}

// The distinct intervals one side uses along a dimension, as unit-less bins.
fn distinct_intervals(cells: &[Cell], interval: &impl Fn(&Cell) -> (f64, f64)) -> Vec<Bin> {
    let mut seen: Vec<(f64, f64)> = Vec::new();
    for cell in cells {
        let (lo, hi) = interval(cell);
        let known = seen
            .iter()
            .any(|&(a, b)| (a - lo).abs() <= EPSILON && (b - hi).abs() <= EPSILON);
        if !known {
            seen.push((lo, hi));
        }
    }
    seen.into_iter()
        .map(|(lower, upper)| Bin {
            lower,
            upper,
            value: 0.0,
        })
        .collect()
}

fn domain_of(edges: &[f64]) -> (f64, f64) {
    match (edges.first(), edges.last()) {
        (Some(&lo), Some(&hi)) => (lo, hi),
        _ => (0.0, 0.0),
    }
}
