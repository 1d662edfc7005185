use std::path::PathBuf;

use hc_core::notes::NotesLog;
use hc_core::runs::{RunQueue, RunRecord, RunRequest, RunStatus, SimulatorLauncher};
use hc_core::{CsvCache, DashError, Version, VersionStore};

fn fixture_root() -> PathBuf {
    // Shared with the comparison engine's scenarios.
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../hc-compare/tests/fixtures/input-data-versions")
}

fn store() -> VersionStore {
    VersionStore::open(fixture_root()).expect("fixture store")
}

#[test]
fn test_resolve_and_latest() {
    let store = store();
    assert_eq!(store.resolve("3.8").unwrap().as_str(), "v3.8");
    assert_eq!(store.resolve("v0").unwrap().as_str(), "v0");
    assert!(matches!(store.resolve("v4"), Err(DashError::UnknownVersion(_))));
    assert_eq!(store.latest().unwrap().unwrap().as_str(), "v3.8");
}

#[test]
fn test_snapshot_values_and_comments() {
    let store = store();
    let v0 = store.resolve("v0").unwrap();
    let cfg = store.load_config(&v0).unwrap();
    assert_eq!(cfg.number("TARGET_POPULATION").unwrap(), 10000.0);
    assert_eq!(
        cfg.get("DATA_TAX_RATES"),
        Some("src/main/resources/TaxRates.csv")
    );
    assert_eq!(
        cfg.comments("HOUSE_PRICES_SCALE"),
        ["Lognormal fit of house prices, Land Registry price paid 2011"]
    );
    assert!(cfg.comments("MARKET_AVERAGE_PRICE_DECAY").is_empty());
}

#[test]
fn test_resource_prefix_falls_back_to_file_name() {
    let store = store();
    let v = store.resolve("v3.8").unwrap();
    let cfg = store.load_config(&v).unwrap();
    let mut cache = CsvCache::new();
    let rows = store.load_rows(&mut cache, &cfg, "DATA_AGE_DISTRIBUTION").unwrap();
    assert_eq!(rows.len(), 7);
    assert_eq!(rows[6], vec![75.0, 95.0, 0.11]);

    store.load_rows(&mut cache, &cfg, "DATA_AGE_DISTRIBUTION").unwrap();
    assert_eq!(cache.hits(), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_notes_log_range() {
    let store = store();
    let notes = NotesLog::load(&store.notes_path()).unwrap();
    let v0 = Version::parse("v0").unwrap();
    let v38 = Version::parse("v3.8").unwrap();

    let origins = notes.origins_in_range(&v0, &v38, ["DATA_NATIONAL_INSURANCE_RATES"]);
    assert_eq!(origins.len(), 1);
    assert_eq!(origins[0].version.as_str(), "v2.1");

    assert!(notes.origins_in_range(&v38, &v38, ["BUY_MU"]).is_empty());
    assert_eq!(notes.method_variations_up_to(&v38, ["BUY_SIGMA"]).len(), 1);
}

struct Accepting;

impl SimulatorLauncher for Accepting {
    fn launch(&mut self, _record: &RunRecord) -> Result<(), String> {
        Ok(())
    }
}

#[test]
fn test_run_queue_over_fixture_versions() {
    let store = store();
    let mut queue = RunQueue::new(4, store.list_versions().unwrap());
    let id = queue
        .submit(RunRequest {
            version: store.resolve("v3.8").unwrap(),
            seed: 7,
            label: None,
        })
        .unwrap();
    assert!(queue
        .submit(RunRequest {
            version: Version::parse("v9").unwrap(),
            seed: 1,
            label: None,
        })
        .is_err());

    assert_eq!(queue.start_next(&mut Accepting), Some(id));
    queue.complete(id, Ok(())).unwrap();
    assert_eq!(queue.get(id).unwrap().status, RunStatus::Succeeded);
}
