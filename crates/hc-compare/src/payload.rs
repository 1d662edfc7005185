//! Comparison results as handed to the front end.

use hc_core::attribution::SourceAttribution;
use hc_core::notes::{ChangeOrigin, MethodVariationNote};
use hc_core::{CatalogFormat, EPSILON};
use serde::Serialize;

use crate::curves::{
    BuyQuadCurves, DeltaStat, GaussianPairCurves, HpaLineCurves, LognormalPairCurves,
    PowerLawPairCurves,
};
use crate::rebin::{BinnedComparison, JointComparison};
use crate::step_rate::StepRateComparison;

/// One config key seen in both versions
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalarRow {
    pub key: String,
    pub left: f64,
    pub right: f64,
    pub delta: f64,
    pub percent_change: Option<f64>,
}

impl ScalarRow {
    pub fn new(key: &str, stat: DeltaStat) -> Self {
        Self {
            key: key.to_string(),
            left: stat.left,
            right: stat.right,
            delta: stat.delta,
            percent_change: stat.percent_change,
        }
    }
}

/// Render-ready data for one item, tagged by shape
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum VisualPayload {
    ScalarTable { rows: Vec<ScalarRow> },
    Binned(BinnedComparison),
    StepRate(StepRateComparison),
    Joint(JointComparison),
    LognormalPair(LognormalPairCurves),
    PowerLawPair(PowerLawPairCurves),
    GaussianPair(GaussianPairCurves),
    HpaLine(HpaLineCurves),
    BuyQuad(BuyQuadCurves),
}

impl VisualPayload {
    /// Every numeric delta the payload is made of.
    pub fn deltas(&self) -> Vec<f64> {
        match self {
            VisualPayload::ScalarTable { rows } => rows.iter().map(|r| r.delta).collect(),
            VisualPayload::Binned(b) => b.delta.clone(),
            VisualPayload::StepRate(s) => s.bands.iter().map(|b| b.delta).collect(),
            VisualPayload::Joint(j) => j.cells.iter().map(|c| c.delta).collect(),
            VisualPayload::LognormalPair(c) => c.deltas().to_vec(),
            VisualPayload::PowerLawPair(c) => c.deltas().to_vec(),
            VisualPayload::GaussianPair(c) => c.deltas().to_vec(),
            VisualPayload::HpaLine(c) => c.deltas().to_vec(),
            VisualPayload::BuyQuad(c) => c.deltas().collect(),
        }
    }

    /// True when every delta is within `EPSILON` of zero.
    pub fn is_unchanged(&self) -> bool {
        self.deltas().iter().all(|d| d.abs() <= EPSILON)
    }
}

/// Which versions provenance was gathered over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ProvenanceScope {
    /// Versions after the older side, up to the newer side.
    Range,
    /// Every version up to the one being viewed.
    Version,
}

/// Attributions for both sides of a comparison
#[derive(Debug, Clone, Serialize)]
pub struct SourceInfo {
    pub left: Vec<SourceAttribution>,
    pub right: Vec<SourceAttribution>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub id: &'static str,
    pub title: &'static str,
    pub group: &'static str,
    pub format: CatalogFormat,
    pub unchanged: bool,
    pub visual_payload: VisualPayload,
    pub source_info: SourceInfo,
    pub provenance_scope: ProvenanceScope,
    pub change_origins_in_range: Vec<ChangeOrigin>,
    pub method_variations: Vec<MethodVariationNote>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curves::{HpaParams, hpa_expectation_line};

    #[test]
    fn test_scalar_table_unchanged() {
        let rows = vec![ScalarRow::new("A", DeltaStat::new(1.0, 1.0))];
        let payload = VisualPayload::ScalarTable { rows };
        assert!(payload.is_unchanged());

        let rows = vec![ScalarRow::new("A", DeltaStat::new(1.0, 1.5))];
        let payload = VisualPayload::ScalarTable { rows };
        assert!(!payload.is_unchanged());
        assert_eq!(payload.deltas(), vec![0.5]);
    }

    #[test]
    fn test_curve_deltas_include_parameters() {
        let l = HpaParams { factor: 0.5, constant: 0.0 };
        let r = HpaParams { factor: 0.5, constant: 1e-13 };
        let payload = VisualPayload::HpaLine(hpa_expectation_line(l, r));
        // below the absolute threshold
        assert!(payload.is_unchanged());
    }

    #[test]
    fn test_kind_tag() {
        let payload = VisualPayload::ScalarTable { rows: Vec::new() };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["kind"], "scalarTable");
    }
}
