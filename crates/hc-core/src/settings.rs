//! Dashboard settings (`settings.json`).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::NOTES_FILE_NAME;
use crate::error::{DashError, Result};

/// Environment variable overriding `data_root`.
pub const DATA_ROOT_ENV: &str = "HC_DATA_ROOT";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSettings {
    /// Directory holding one folder per published version.
    #[serde(default = "DashboardSettings::default_data_root")]
    pub data_root: PathBuf,
    /// Version-notes log; defaults to `<data_root>/version-notes.json`.
    #[serde(default)]
    pub notes_file: Option<PathBuf>,
}

impl DashboardSettings {
    fn default_data_root() -> PathBuf {
        PathBuf::from("input-data-versions")
    }

    /// Load settings from a JSON file; a missing file yields defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|e| DashError::io(path, e))?;
        let settings: Self = serde_json::from_str(&contents).map_err(|e| DashError::Json {
            path: path.to_path_buf(),
            source: e,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Default settings file location
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("calib-dash");
        path.push("settings.json");
        path
    }

    /// Apply `HC_DATA_ROOT` if set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(root) = std::env::var_os(DATA_ROOT_ENV).filter(|v| !v.is_empty()) {
            self.data_root = PathBuf::from(root);
        }
        self
    }

    pub fn notes_path(&self) -> PathBuf {
        self.notes_file
            .clone()
            .unwrap_or_else(|| self.data_root.join(NOTES_FILE_NAME))
    }

    pub fn validate(&self) -> Result<()> {
        if self.data_root.as_os_str().is_empty() {
            return Err(DashError::Settings("dataRoot is empty".into()));
        }
        if self.notes_file.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
            return Err(DashError::Settings("notesFile is empty".into()));
        }
        Ok(())
    }
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            data_root: Self::default_data_root(),
            notes_file: None,
        }
    }
}
