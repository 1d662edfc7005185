use std::path::PathBuf;

use hc_compare::curves::DomainSource;
use hc_compare::{Comparator, ComparisonReport, ComparisonResult, Selection, VisualPayload};
use hc_core::attribution::DatasetTag;
use hc_core::csv::read_numeric_rows;
use hc_core::{CsvCache, DashError, Version, VersionStore};

fn fixture_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/input-data-versions")
}

fn comparator() -> Comparator {
    let store = VersionStore::open(fixture_root()).expect("fixture store");
    Comparator::open(store).expect("fixture notes")
}

fn v(name: &str) -> Version {
    Version::parse(name).unwrap()
}

fn compare_one(id: &str, left: &str, right: &str) -> ComparisonResult {
    let mut cache = CsvCache::new();
    let mut results = comparator()
        .compare(
            &mut cache,
            &v(left),
            &v(right),
            &Selection::Ids(vec![id.to_string()]),
        )
        .unwrap_or_else(|e| panic!("compare {id}: {e}"));
    assert_eq!(results.len(), 1);
    results.remove(0)
}

fn raw_mass(version: &str, file: &str, column: usize) -> f64 {
    let path = fixture_root().join(version).join(file);
    read_numeric_rows(&path)
        .unwrap()
        .iter()
        .map(|r| r[column])
        .sum()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-7 * (1.0 + a.abs().max(b.abs()))
}

#[test]
fn test_fixture_versions_listed() {
    let c = comparator();
    let versions = c.store().list_versions().unwrap();
    assert_eq!(versions, vec![v("v0"), v("v3.8")]);
    assert_eq!(c.notes().notes().len(), 4);
}

#[test]
fn test_age_distribution_keeps_finer_bands() {
    let result = compare_one("age_distribution", "v0", "v3.8");
    let VisualPayload::Binned(binned) = &result.visual_payload else {
        panic!("expected binned payload, got {:?}", result.visual_payload);
    };

    let labels = &binned.axis.labels;
    assert!(labels.iter().any(|l| l == "75-85"), "{labels:?}");
    assert!(labels.iter().any(|l| l == "85-95"), "{labels:?}");
    assert!(!labels.iter().any(|l| l == "75-95"), "{labels:?}");

    assert!(close(binned.left_total, raw_mass("v0", "AgeDistribution.csv", 2)));
    assert!(close(binned.right_total, raw_mass("v3.8", "AgeDistribution.csv", 2)));
    assert!(!result.unchanged);
}

#[test]
fn test_national_insurance_change_is_attributed() {
    let result = compare_one("national_insurance_rates", "v0", "v3.8");
    assert!(!result.unchanged);

    let VisualPayload::StepRate(rates) = &result.visual_payload else {
        panic!("expected step-rate payload");
    };
    assert!(rates.bands.iter().any(|b| b.delta != 0.0));
    assert!(
        result
            .change_origins_in_range
            .iter()
            .any(|o| o.version == v("v2.1")),
        "{:?}",
        result.change_origins_in_range
    );
}

#[test]
fn test_argument_order_does_not_change_provenance() {
    let forward = compare_one("house_price_distribution", "v0", "v3.8");
    let backward = compare_one("house_price_distribution", "v3.8", "v0");
    let versions = |r: &ComparisonResult| {
        r.change_origins_in_range
            .iter()
            .map(|o| o.version.to_string())
            .collect::<Vec<_>>()
    };
    assert_eq!(versions(&forward), vec!["v1.2"]);
    assert_eq!(versions(&forward), versions(&backward));
}

#[test]
fn test_self_comparison_is_unchanged() {
    let mut cache = CsvCache::new();
    let results = comparator()
        .compare(&mut cache, &v("v3.8"), &v("v3.8"), &Selection::All)
        .unwrap();
    assert_eq!(results.len(), hc_data::num_entries());
    for r in &results {
        assert!(r.unchanged, "{} changed against itself", r.id);
        assert!(r.change_origins_in_range.is_empty(), "{}", r.id);
    }
    assert!(cache.hits() > 0);
}

#[test]
fn test_buy_quad_explore_shows_method_variation() {
    let mut cache = CsvCache::new();
    let results = comparator()
        .explore(&mut cache, &v("v3.8"), &"buy_quad".parse().unwrap())
        .unwrap();
    let result = &results[0];
    assert_eq!(result.id, "buy_quad");
    assert!(!result.method_variations.is_empty());
    for note in &result.method_variations {
        assert_eq!(note.version, v("v3.8"));
        assert!(note.matched_keys.iter().all(|k| k.starts_with("BUY_")));
    }
}

#[test]
fn test_power_law_domain_from_income_data() {
    let result = compare_one("desired_rent", "v0", "v3.8");
    let VisualPayload::PowerLawPair(curves) = &result.visual_payload else {
        panic!("expected power-law payload");
    };
    assert_eq!(curves.domain_source, DomainSource::IncomeData);
    let (lo, hi) = curves.curves.domain;
    assert!(close(lo, 9.0f64.exp()));
    assert!(close(hi, 12.0f64.exp()));
    assert!(result.unchanged);
}

#[test]
fn test_joint_masses_preserved() {
    let result = compare_one("income_given_age", "v0", "v3.8");
    let VisualPayload::Joint(joint) = &result.visual_payload else {
        panic!("expected joint payload");
    };
    assert!(close(joint.left_total, raw_mass("v0", "IncomeGivenAge.csv", 4)));
    assert!(close(joint.right_total, raw_mass("v3.8", "IncomeGivenAge.csv", 4)));
    assert_eq!(joint.x_axis.bin_count(), 3);
    assert!(joint.y_axis.labels[0].starts_with('£'));
}

#[test]
fn test_report_counts() {
    let mut cache = CsvCache::new();
    let results = comparator()
        .compare(&mut cache, &v("v0"), &v("v3.8"), &Selection::All)
        .unwrap();
    let report = ComparisonReport::from_results(v("v0"), v("v3.8"), results);
    let updated = report.updated_ids();
    for id in [
        "age_distribution",
        "tax_rates",
        "national_insurance_rates",
        "income_given_age",
        "house_price_distribution",
        "hpa_expectation",
        "buy_quad",
    ] {
        assert!(updated.contains(&id), "{id} should be updated");
    }
    for id in ["target_population", "wealth_given_income", "desired_rent"] {
        assert!(!updated.contains(&id), "{id} should be unchanged");
    }
    assert_eq!(report.total, report.updated + report.unchanged);
}

#[test]
fn test_sources_attribution() {
    let sources = comparator()
        .sources(&v("v0"), &"income_given_age,tax_rates".parse().unwrap())
        .unwrap();
    let income = &sources[0].sources[0];
    assert_eq!(income.dataset, Some(DatasetTag::Was));
    assert_eq!(income.year.as_deref(), Some("2010-2012"));
    assert_eq!(income.edition.as_deref(), Some("Wave 3"));

    let tax = &sources[1].sources[0];
    assert_eq!(tax.dataset, Some(DatasetTag::Hmrc));
    assert_eq!(tax.year.as_deref(), Some("2011/12"));
}

#[test]
fn test_unknown_id_fails_fast() {
    let mut cache = CsvCache::new();
    let err = comparator()
        .compare(
            &mut cache,
            &v("v0"),
            &v("v3.8"),
            &"tax_rates,no_such_item".parse().unwrap(),
        )
        .unwrap_err();
    assert!(matches!(err, DashError::UnknownCatalogId(ref id) if id == "no_such_item"));
    assert!(err.is_schema_error());
}

#[test]
fn test_unknown_version_fails() {
    let mut cache = CsvCache::new();
    let err = comparator()
        .compare(&mut cache, &v("v0"), &v("v9"), &Selection::All)
        .unwrap_err();
    assert!(matches!(err, DashError::UnknownVersion(_)));
}
