//! Version-notes log: which version changed which parameters, and why.
//!
//! The log is a JSON array stored next to the version folders. Comparisons
//! use it to attribute a delta to the versions that introduced it.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{DashError, Result};
use crate::version::Version;

/// One published version's release note
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionNote {
    pub version: Version,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub validation_dataset: Option<String>,
    #[serde(default)]
    pub calibration_files: Vec<String>,
    #[serde(default)]
    pub config_parameters: Vec<String>,
    #[serde(default)]
    pub parameter_changes: Vec<ParameterChange>,
    #[serde(default)]
    pub method_variations: Vec<MethodVariation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterChange {
    pub config_parameter: String,
    #[serde(default)]
    pub before: Option<String>,
    #[serde(default)]
    pub after: Option<String>,
}

/// A note that the calibration method changed for some parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodVariation {
    pub config_parameters: Vec<String>,
    pub description: String,
}

impl VersionNote {
    /// Keys this version touched, from both the key list and the change list.
    pub fn touched_keys(&self) -> BTreeSet<&str> {
        self.config_parameters
            .iter()
            .map(String::as_str)
            .chain(
                self.parameter_changes
                    .iter()
                    .map(|c| c.config_parameter.as_str()),
            )
            .collect()
    }
}

/// A version whose note explains part of a delta
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeOrigin {
    pub version: Version,
    pub date: Option<NaiveDate>,
    pub description: String,
    pub matched_keys: Vec<String>,
}

/// A method-variation note surfaced for an item
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodVariationNote {
    pub version: Version,
    pub description: String,
    pub matched_keys: Vec<String>,
}

/// All version notes, oldest first
#[derive(Debug, Clone, Default)]
pub struct NotesLog {
    notes: Vec<VersionNote>,
}

impl NotesLog {
    /// Load the log; a missing file yields an empty log.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let file = File::open(path).map_err(|e| DashError::io(path, e))?;
        let notes: Vec<VersionNote> =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| DashError::Json {
                path: path.to_path_buf(),
                source: e,
            })?;
        Ok(Self::from_notes(notes))
    }

    pub fn from_notes(mut notes: Vec<VersionNote>) -> Self {
        notes.sort_by(|a, b| a.version.cmp(&b.version));
        Self { notes }
    }

    pub fn notes(&self) -> &[VersionNote] {
        &self.notes
    }

    pub fn note_for(&self, version: &Version) -> Option<&VersionNote> {
        self.notes.iter().find(|n| &n.version == version)
    }

    /// Versions in `(older, newer]` that touched any of `keys`.
    ///
    /// Argument order does not matter; equal versions give no origins.
    pub fn origins_in_range<'k>(
        &self,
        a: &Version,
        b: &Version,
        keys: impl IntoIterator<Item = &'k str>,
    ) -> Vec<ChangeOrigin> {
        let (older, newer) = if a <= b { (a, b) } else { (b, a) };
        let keys: BTreeSet<&str> = keys.into_iter().collect();
        self.notes
            .iter()
            .filter(|n| &n.version > older && &n.version <= newer)
            .filter_map(|n| origin(n, &keys))
            .collect()
    }

    /// Versions up to and including `version` that touched any of `keys`.
    pub fn origins_up_to<'k>(
        &self,
        version: &Version,
        keys: impl IntoIterator<Item = &'k str>,
    ) -> Vec<ChangeOrigin> {
        let keys: BTreeSet<&str> = keys.into_iter().collect();
        self.notes
            .iter()
            .filter(|n| &n.version <= version)
            .filter_map(|n| origin(n, &keys))
            .collect()
    }

    /// Method-variation notes up to `version` scoped to any of `keys`.
    pub fn method_variations_up_to<'k>(
        &self,
        version: &Version,
        keys: impl IntoIterator<Item = &'k str>,
    ) -> Vec<MethodVariationNote> {
        let keys: BTreeSet<&str> = keys.into_iter().collect();
        let mut out = Vec::new();
        for note in self.notes.iter().filter(|n| &n.version <= version) {
            for variation in &note.method_variations {
                let matched: Vec<String> = variation
                    .config_parameters
                    .iter()
                    .filter(|k| keys.contains(k.as_str()))
                    .cloned()
                    .collect();
                if !matched.is_empty() {
                    out.push(MethodVariationNote {
                        version: note.version.clone(),
                        description: variation.description.clone(),
                        matched_keys: matched,
                    });
                }
            }
        }
        out
    }
}

fn origin(note: &VersionNote, keys: &BTreeSet<&str>) -> Option<ChangeOrigin> {
    let matched: Vec<String> = note
        .touched_keys()
        .into_iter()
        .filter(|k| keys.contains(k))
        .map(str::to_string)
        .collect();
    if matched.is_empty() {
        return None;
    }
    Some(ChangeOrigin {
        version: note.version.clone(),
        date: note.date,
        description: note.description.clone(),
        matched_keys: matched,
    })
}
