//! Comparison orchestrator: one dispatch per catalog item.
//!
//! The orchestrator loads both snapshots, picks the comparator for each
//! entry's format and attaches provenance. Any error aborts the whole
//! request; there are no partial results.

use std::convert::Infallible;
use std::str::FromStr;

use hc_core::attribution::{AttributionResolver, SourceAttribution};
use hc_core::notes::NotesLog;
use hc_core::{CatalogEntry, CatalogFormat, ConfigSnapshot, CsvCache, Result, Version, VersionStore};
use hc_data::catalog::INCOME_DOMAIN_KEY;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::axis::AxisScale;
use crate::curves::{
    BuyParams, DeltaStat, GaussianParams, HpaParams, LognormalParams, PowerLawParams, buy_quad,
    gaussian_pair, hpa_expectation_line, lognormal_pair, power_law_pair,
};
use crate::payload::{ComparisonResult, ProvenanceScope, ScalarRow, SourceInfo, VisualPayload};
use crate::rebin::{compare_binned, compare_joint, normalize_cells};
use crate::step_rate::compare_step_rates;

/// Binned items that are marginal-rate schedules, not densities.
pub const STEP_RATE_IDS: &[&str] = &["tax_rates", "national_insurance_rates"];

/// Binned items drawn on a log axis; everything else is linear.
pub const LOG_BINNED_IDS: &[&str] = &[];

/// Axis scale for a one-dimensional binned distribution.
pub fn binned_scale(id: &str) -> AxisScale {
    if LOG_BINNED_IDS.contains(&id) {
        AxisScale::Log
    } else {
        AxisScale::Linear
    }
}

/// Axis scales `(x, y)` for a joint distribution.
pub fn joint_scales(id: &str) -> (AxisScale, AxisScale) {
    match id {
        "income_given_age" => (AxisScale::Linear, AxisScale::Log),
        "wealth_given_income" => (AxisScale::Log, AxisScale::Log),
        _ => (AxisScale::Linear, AxisScale::Linear),
    }
}

/// Which catalog items a request covers
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Ids(Vec<String>),
}

impl Selection {
    /// Catalog entries in request order; unknown ids fail.
    pub fn entries(&self) -> Result<Vec<&'static CatalogEntry>> {
        match self {
            Selection::All => Ok(hc_data::CATALOG.iter().collect()),
            Selection::Ids(ids) => ids.iter().map(|id| hc_data::require_entry(id)).collect(),
        }
    }
}

impl FromStr for Selection {
    type Err = Infallible;

    /// `"all"` (or nothing) selects the whole catalog, otherwise a comma list.
    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(Selection::All);
        }
        Ok(Selection::Ids(
            s.split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(String::from)
                .collect(),
        ))
    }
}

/// Attributions of one entry's keys in one version
#[derive(Debug, Clone, Serialize)]
pub struct EntrySources {
    pub id: &'static str,
    pub title: &'static str,
    pub sources: Vec<SourceAttribution>,
}

pub struct Comparator {
    store: VersionStore,
    notes: NotesLog,
    resolver: AttributionResolver,
}

impl Comparator {
    pub fn new(store: VersionStore, notes: NotesLog) -> Self {
        Self {
            store,
            notes,
            resolver: AttributionResolver::new(),
        }
    }

    /// Comparator over a store, with the notes log found next to it.
    pub fn open(store: VersionStore) -> Result<Self> {
        let notes = NotesLog::load(&store.notes_path())?;
        info!(notes = notes.notes().len(), "loaded version notes");
        Ok(Self::new(store, notes))
    }

    pub fn store(&self) -> &VersionStore {
        &self.store
    }

    pub fn notes(&self) -> &NotesLog {
        &self.notes
    }

    /// Compare two versions item by item.
    pub fn compare(
        &self,
        cache: &mut CsvCache,
        left: &Version,
        right: &Version,
        selection: &Selection,
    ) -> Result<Vec<ComparisonResult>> {
        let entries = checked_entries(selection)?;
        let left_cfg = self.store.load_config(left)?;
        let right_cfg = self.store.load_config(right)?;
        let (older, newer) = if left <= right { (left, right) } else { (right, left) };

        let mut results = Vec::with_capacity(entries.len());
        for entry in entries {
            let visual_payload = self.build_item(cache, entry, &left_cfg, &right_cfg)?;
            let method_variations = self
                .notes
                .method_variations_up_to(newer, entry.all_keys())
                .into_iter()
                .filter(|m| &m.version > older)
                .collect();
            results.push(ComparisonResult {
                id: entry.id,
                title: entry.title,
                group: entry.group,
                format: entry.format,
                unchanged: visual_payload.is_unchanged(),
                source_info: SourceInfo {
                    left: self.resolver.resolve_entry(&left_cfg, entry),
                    right: self.resolver.resolve_entry(&right_cfg, entry),
                },
                provenance_scope: ProvenanceScope::Range,
                change_origins_in_range: self.notes.origins_in_range(left, right, entry.all_keys()),
                method_variations,
                visual_payload,
            });
        }
        Ok(results)
    }

    /// Single-version view: the version against itself, with its history.
    pub fn explore(
        &self,
        cache: &mut CsvCache,
        version: &Version,
        selection: &Selection,
    ) -> Result<Vec<ComparisonResult>> {
        let entries = checked_entries(selection)?;
        let cfg = self.store.load_config(version)?;

        let mut results = Vec::with_capacity(entries.len());
        for entry in entries {
            let visual_payload = self.build_item(cache, entry, &cfg, &cfg)?;
            let sources = self.resolver.resolve_entry(&cfg, entry);
            results.push(ComparisonResult {
                id: entry.id,
                title: entry.title,
                group: entry.group,
                format: entry.format,
                unchanged: visual_payload.is_unchanged(),
                source_info: SourceInfo {
                    left: sources.clone(),
                    right: sources,
                },
                provenance_scope: ProvenanceScope::Version,
                change_origins_in_range: self.notes.origins_up_to(version, entry.all_keys()),
                method_variations: self
                    .notes
                    .method_variations_up_to(version, entry.all_keys()),
                visual_payload,
            });
        }
        Ok(results)
    }

    /// Dataset attribution of every selected entry in one version.
    pub fn sources(&self, version: &Version, selection: &Selection) -> Result<Vec<EntrySources>> {
        let cfg = self.store.load_config(version)?;
        Ok(selection
            .entries()?
            .into_iter()
            .map(|entry| EntrySources {
                id: entry.id,
                title: entry.title,
                sources: self.resolver.resolve_entry(&cfg, entry),
            })
            .collect())
    }

    /// Build the payload of one entry from two snapshots.
    pub fn build_item(
        &self,
        cache: &mut CsvCache,
        entry: &CatalogEntry,
        left: &ConfigSnapshot,
        right: &ConfigSnapshot,
    ) -> Result<VisualPayload> {
        entry.validate()?;
        debug!(id = entry.id, format = %entry.format, "building item");

        let payload = match entry.format {
            CatalogFormat::Scalar | CatalogFormat::ScalarPair => {
                let rows = entry
                    .config_keys
                    .iter()
                    .map(|&key| Ok(ScalarRow::new(key, DeltaStat::new(left.number(key)?, right.number(key)?))))
                    .collect::<Result<Vec<_>>>()?;
                VisualPayload::ScalarTable { rows }
            }
            CatalogFormat::BinnedDistribution => {
                let key = entry.data_file_config_keys[0];
                let l = self.store.load_rows(cache, left, key)?;
                let r = self.store.load_rows(cache, right, key)?;
                if STEP_RATE_IDS.contains(&entry.id) {
                    VisualPayload::StepRate(compare_step_rates(&l, &r))
                } else {
                    VisualPayload::Binned(compare_binned(&l, &r, binned_scale(entry.id)))
                }
            }
            CatalogFormat::JointDistribution => {
                let key = entry.data_file_config_keys[0];
                let l = self.store.load_rows(cache, left, key)?;
                let r = self.store.load_rows(cache, right, key)?;
                let (x_scale, y_scale) = joint_scales(entry.id);
                VisualPayload::Joint(compare_joint(&l, &r, x_scale, y_scale))
            }
            CatalogFormat::LognormalPair => {
                let [mu_l, sigma_l] = numbers(left, entry)?;
                let [mu_r, sigma_r] = numbers(right, entry)?;
                VisualPayload::LognormalPair(lognormal_pair(
                    LognormalParams { mu: mu_l, sigma: sigma_l },
                    LognormalParams { mu: mu_r, sigma: sigma_r },
                ))
            }
            CatalogFormat::PowerLawPair => {
                let [scale_l, exp_l] = numbers(left, entry)?;
                let [scale_r, exp_r] = numbers(right, entry)?;
                let domain = self.income_domain(cache, left, right);
                VisualPayload::PowerLawPair(power_law_pair(
                    PowerLawParams { scale: scale_l, exponent: exp_l },
                    PowerLawParams { scale: scale_r, exponent: exp_r },
                    domain,
                ))
            }
            CatalogFormat::GaussianPair => {
                let [mu_l, sigma_l] = numbers(left, entry)?;
                let [mu_r, sigma_r] = numbers(right, entry)?;
                VisualPayload::GaussianPair(gaussian_pair(
                    GaussianParams { mu: mu_l, sigma: sigma_l },
                    GaussianParams { mu: mu_r, sigma: sigma_r },
                ))
            }
            CatalogFormat::HpaExpectationLine => {
                let [factor_l, const_l] = numbers(left, entry)?;
                let [factor_r, const_r] = numbers(right, entry)?;
                VisualPayload::HpaLine(hpa_expectation_line(
                    HpaParams { factor: factor_l, constant: const_l },
                    HpaParams { factor: factor_r, constant: const_r },
                ))
            }
            CatalogFormat::BuyQuad => {
                let domain = self.income_domain(cache, left, right);
                VisualPayload::BuyQuad(buy_quad(
                    buy_params(left, entry)?,
                    buy_params(right, entry)?,
                    domain,
                ))
            }
        };
        Ok(payload)
    }

    /// Observed income range across both versions' income data.
    ///
    /// The income axis of that file is log income, so the edges are
    /// exponentiated. `None` when neither side has usable data.
    fn income_domain(
        &self,
        cache: &mut CsvCache,
        left: &ConfigSnapshot,
        right: &ConfigSnapshot,
    ) -> Option<(f64, f64)> {
        let l = self.side_income_domain(cache, left);
        let r = self.side_income_domain(cache, right);
        match (l, r) {
            (Some((a, b)), Some((c, d))) => Some((a.min(c), b.max(d))),
            (one, other) => one.or(other),
        }
    }

    fn side_income_domain(&self, cache: &mut CsvCache, cfg: &ConfigSnapshot) -> Option<(f64, f64)> {
        let rows = match self.store.load_rows(cache, cfg, INCOME_DOMAIN_KEY) {
            Ok(rows) => rows,
            Err(e) => {
                warn!(version = %cfg.version, "income data unavailable, using fallback domain: {}", e);
                return None;
            }
        };
        let cells = normalize_cells(&rows);
        let lo = cells.iter().map(|c| c.y_lower).fold(f64::INFINITY, f64::min);
        let hi = cells.iter().map(|c| c.y_upper).fold(f64::NEG_INFINITY, f64::max);
        (lo.is_finite() && hi.is_finite() && hi > lo).then(|| (lo.exp(), hi.exp()))
    }
}

// Resolve and validate every selected entry before any file is read.
fn checked_entries(selection: &Selection) -> Result<Vec<&'static CatalogEntry>> {
    let entries = selection.entries()?;
    for entry in &entries {
        entry.validate()?;
    }
    Ok(entries)
}

// The entry's config keys as numbers; `N` matches the validated key count.
fn numbers<const N: usize>(cfg: &ConfigSnapshot, entry: &CatalogEntry) -> Result<[f64; N]> {
    let mut out = [0.0; N];
    for (slot, key) in out.iter_mut().zip(entry.config_keys) {
        *slot = cfg.number(key)?;
    }
    Ok(out)
}

fn buy_params(cfg: &ConfigSnapshot, entry: &CatalogEntry) -> Result<BuyParams> {
    let [scale, exponent, mu, sigma] = numbers(cfg, entry)?;
    Ok(BuyParams {
        scale,
        exponent,
        mu,
        sigma,
    })
}
