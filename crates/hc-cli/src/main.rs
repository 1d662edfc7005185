//! Calibration dashboard CLI
//!
//! Lists published versions and compares their calibration parameters.
//! Results are printed as JSON on stdout; logs go to stderr.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hc_compare::{Comparator, ComparisonReport, Selection};
use hc_core::notes::NotesLog;
use hc_core::settings::DashboardSettings;
use hc_core::{CsvCache, VersionStore};

/// Housing-model calibration dashboard
#[derive(Parser, Debug)]
#[command(name = "calib-dash")]
#[command(author, version, about = "Compare calibration versions of the housing model", long_about = None)]
struct Args {
    /// Directory holding one folder per version (overrides settings and HC_DATA_ROOT)
    #[arg(long = "data-root", global = true)]
    data_root: Option<PathBuf>,

    /// Settings file (defaults to the user config directory)
    #[arg(long = "settings", global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List published versions, oldest first
    Versions,
    /// Print the catalog of comparable items
    Catalog,
    /// Compare two versions
    Compare {
        left: String,
        right: String,
        /// Comma-separated catalog ids, or "all"
        #[arg(long = "ids", default_value = "all")]
        ids: Selection,
        /// Print a readable summary instead of JSON
        #[arg(long = "summary")]
        summary: bool,
    },
    /// Show one version with its change history
    Show {
        version: String,
        #[arg(long = "ids", default_value = "all")]
        ids: Selection,
    },
    /// Print the inferred data source of each parameter
    Sources {
        version: String,
        #[arg(long = "ids", default_value = "all")]
        ids: Selection,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VersionListing {
    version: String,
    date: Option<String>,
    description: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let settings = load_settings(&args)?;
    let store = VersionStore::open(&settings.data_root)
        .with_context(|| format!("opening data root {}", settings.data_root.display()))?;

    match args.command {
        Command::Versions => {
            let notes = NotesLog::load(&settings.notes_path())?;
            let listing: Vec<VersionListing> = store
                .list_versions()?
                .into_iter()
                .map(|v| {
                    let note = notes.note_for(&v);
                    VersionListing {
                        version: v.to_string(),
                        date: note.and_then(|n| n.date).map(|d| d.to_string()),
                        description: note.map(|n| n.description.clone()),
                    }
                })
                .collect();
            print_json(&listing)?;
        }
        Command::Catalog => print_json(&hc_data::CATALOG)?,
        Command::Compare {
            left,
            right,
            ids,
            summary,
        } => {
            let comparator = comparator(store, &settings)?;
            let left = comparator.store().resolve(&left)?;
            let right = comparator.store().resolve(&right)?;
            info!(%left, %right, "comparing versions");

            let mut cache = CsvCache::new();
            let results = comparator.compare(&mut cache, &left, &right, &ids)?;
            let report = ComparisonReport::from_results(left, right, results);
            if summary {
                report.print_summary();
            } else {
                println!("{}", report.to_json());
            }
        }
        Command::Show { version, ids } => {
            let comparator = comparator(store, &settings)?;
            let version = comparator.store().resolve(&version)?;
            let mut cache = CsvCache::new();
            print_json(&comparator.explore(&mut cache, &version, &ids)?)?;
        }
        Command::Sources { version, ids } => {
            let comparator = comparator(store, &settings)?;
            let version = comparator.store().resolve(&version)?;
            print_json(&comparator.sources(&version, &ids)?)?;
        }
    }

    Ok(())
}

// Settings file, then HC_DATA_ROOT, then --data-root.
fn load_settings(args: &Args) -> Result<DashboardSettings> {
    let path = args
        .settings
        .clone()
        .unwrap_or_else(DashboardSettings::default_path);
    let mut settings = DashboardSettings::load_from_file(&path)
        .with_context(|| format!("loading settings from {}", path.display()))?
        .with_env_overrides();
    if let Some(root) = &args.data_root {
        settings.data_root = root.clone();
    }
    Ok(settings)
}

fn comparator(store: VersionStore, settings: &DashboardSettings) -> Result<Comparator> {
    let notes = NotesLog::load(&settings.notes_path())?;
    info!(notes = notes.notes().len(), "loaded version notes");
    Ok(Comparator::new(store, notes))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
