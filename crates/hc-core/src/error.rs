//! Error type shared by the store, the loaders and the comparison engine.
//!
//! Numeric degeneracies (zero-width bins, collapsed domains) are handled by
//! fallbacks in the engine and never show up here.

use std::path::PathBuf;

use thiserror::Error;

/// Dashboard errors
#[derive(Debug, Error)]
pub enum DashError {
    // Schema errors: a catalog or programmer bug.
    #[error("Unknown catalog id: {0}")]
    UnknownCatalogId(String),

    #[error("Unsupported catalog format: {0}")]
    UnsupportedFormat(String),

    #[error("Catalog entry '{id}' ({format}) needs {expected} config keys, found {found}")]
    WrongKeyCount {
        id: String,
        format: String,
        expected: String,
        found: usize,
    },

    #[error("Catalog entry '{id}' ({format}) needs exactly one data file key, found {found}")]
    WrongDataFileCount {
        id: String,
        format: String,
        found: usize,
    },

    // Data-availability errors: fix the configuration.
    #[error("Invalid version identifier: {0}")]
    InvalidVersion(String),

    #[error("Unknown version: {0}")]
    UnknownVersion(String),

    #[error("Missing config key {key} in version {version}")]
    MissingConfigKey { version: String, key: String },

    #[error("Missing data file for {key} in version {version}: {}", path.display())]
    MissingDataFile {
        version: String,
        key: String,
        path: PathBuf,
    },

    #[error("No numeric rows in data file for {key} in version {version}: {}", path.display())]
    EmptyData {
        version: String,
        key: String,
        path: PathBuf,
    },

    #[error("Value '{value}' of {key} in version {version} is not a number")]
    InvalidNumber {
        version: String,
        key: String,
        value: String,
    },

    // Plumbing.
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Run queue error: {0}")]
    Run(String),
}

impl DashError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DashError::Io {
            path: path.into(),
            source,
        }
    }

    /// True for errors caused by the catalog declaration itself.
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            DashError::UnknownCatalogId(_)
                | DashError::UnsupportedFormat(_)
                | DashError::WrongKeyCount { .. }
                | DashError::WrongDataFileCount { .. }
        )
    }
}

/// Result alias used across the workspace
pub type Result<T> = std::result::Result<T, DashError>;
