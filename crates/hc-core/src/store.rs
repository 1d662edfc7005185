//! Version store: a directory of immutable version folders.
//!
//! ```text
//! input-data-versions/
//!     version-notes.json
//!     v0/config.properties
//!     v0/AgeDistribution.csv
//!     v3.8/config.properties
//!     ...
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::config::ConfigSnapshot;
use crate::consts::{CONFIG_FILE_NAME, NOTES_FILE_NAME};
use crate::csv::{CsvCache, Rows};
use crate::error::{DashError, Result};
use crate::version::Version;

#[derive(Debug, Clone)]
pub struct VersionStore {
    root: PathBuf,
}

impl VersionStore {
    /// Open a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(DashError::io(
                &root,
                std::io::Error::new(std::io::ErrorKind::NotFound, "data root is not a directory"),
            ));
        }
        info!(root = %root.display(), "opened version store");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Default location of the version-notes log.
    pub fn notes_path(&self) -> PathBuf {
        self.root.join(NOTES_FILE_NAME)
    }

    pub fn version_dir(&self, version: &Version) -> PathBuf {
        self.root.join(version.as_str())
    }

    /// All published versions, oldest first.
    pub fn list_versions(&self) -> Result<Vec<Version>> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| DashError::io(&self.root, e))?;

        let mut versions = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| DashError::io(&self.root, e))?;
            let path = entry.path();
            if !path.join(CONFIG_FILE_NAME).is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if let Ok(version) = Version::parse(name) {
                versions.push(version);
            }
        }

        versions.sort();
        Ok(versions)
    }

    pub fn latest(&self) -> Result<Option<Version>> {
        Ok(self.list_versions()?.pop())
    }

    /// Parse `name` and check that the version is published.
    pub fn resolve(&self, name: &str) -> Result<Version> {
        let wanted = Version::parse(name)?;
        self.list_versions()?
            .into_iter()
            .find(|v| v.parts() == wanted.parts() || v.as_str() == name)
            .ok_or_else(|| DashError::UnknownVersion(name.to_string()))
    }

    pub fn load_config(&self, version: &Version) -> Result<ConfigSnapshot> {
        let path = self.version_dir(version).join(CONFIG_FILE_NAME);
        if !path.is_file() {
            return Err(DashError::UnknownVersion(version.to_string()));
        }
        ConfigSnapshot::load_from_file(version.clone(), &path)
    }

    /// Resolve a data-file config value against the version folder.
    ///
    /// Config values often carry the simulator's resource prefix
    /// (`src/main/resources/Foo.csv`); when the full relative path does not
    /// exist, the bare file name inside the version folder is tried.
    pub fn resolve_data_path(&self, version: &Version, value: &str) -> PathBuf {
        let raw = Path::new(value);
        if raw.is_absolute() {
            return raw.to_path_buf();
        }
        let dir = self.version_dir(version);
        let direct = dir.join(raw);
        if direct.is_file() {
            return direct;
        }
        match raw.file_name() {
            Some(name) => dir.join(name),
            None => direct,
        }
    }

    /// Rows of the CSV file named by `key` in `snapshot`.
    pub fn load_rows(
        &self,
        cache: &mut CsvCache,
        snapshot: &ConfigSnapshot,
        key: &str,
    ) -> Result<Arc<Rows>> {
        let value = snapshot.require(key)?;
        let path = self.resolve_data_path(&snapshot.version, value);
        if !path.is_file() {
            return Err(DashError::MissingDataFile {
                version: snapshot.version.to_string(),
                key: key.to_string(),
                path,
            });
        }
        let rows = cache.load(&path)?;
        if rows.is_empty() {
            return Err(DashError::EmptyData {
                version: snapshot.version.to_string(),
                key: key.to_string(),
                path,
            });
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn make_store() -> (tempfile::TempDir, VersionStore) {
        let dir = tempfile::tempdir().unwrap();
        for (name, body) in [
            ("v0", "DATA_AGE = \"src/main/resources/Age.csv\"\nEMPTY = Empty.csv\n"),
            ("v1.10", "DATA_AGE = Age.csv\n"),
            ("v1.9", "DATA_AGE = Age.csv\n"),
        ] {
            let vdir = dir.path().join(name);
            fs::create_dir_all(&vdir).unwrap();
            fs::write(vdir.join(CONFIG_FILE_NAME), body).unwrap();
            fs::write(vdir.join("Age.csv"), "15,25,0.5\n25,35,0.5\n").unwrap();
            fs::write(vdir.join("Empty.csv"), "header\n").unwrap();
        }
        fs::create_dir_all(dir.path().join("not-a-version")).unwrap();
        fs::create_dir_all(dir.path().join("v9")).unwrap();
        let store = VersionStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_list_versions_sorted_and_filtered() {
        let (_dir, store) = make_store();
        let versions = store.list_versions().unwrap();
        let names: Vec<_> = versions.iter().map(|v| v.as_str()).collect();
        assert_eq!(names, ["v0", "v1.9", "v1.10"]);
        assert_eq!(store.latest().unwrap().unwrap().as_str(), "v1.10");
    }

    #[test]
    fn test_resolve_unknown_version() {
        let (_dir, store) = make_store();
        assert!(store.resolve("v1.9").is_ok());
        assert!(store.resolve("1.9").is_ok());
        assert!(matches!(
            store.resolve("v9"),
            Err(DashError::UnknownVersion(_))
        ));
    }

    #[test]
    fn test_resource_prefix_falls_back_to_file_name() {
        let (_dir, store) = make_store();
        let v0 = store.resolve("v0").unwrap();
        let cfg = store.load_config(&v0).unwrap();
        let mut cache = CsvCache::new();
        let rows = store.load_rows(&mut cache, &cfg, "DATA_AGE").unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_data_errors_name_key() {
        let (_dir, store) = make_store();
        let v0 = store.resolve("v0").unwrap();
        let cfg = store.load_config(&v0).unwrap();
        let mut cache = CsvCache::new();
        assert!(matches!(
            store.load_rows(&mut cache, &cfg, "DATA_MISSING"),
            Err(DashError::MissingConfigKey { .. })
        ));
        assert!(matches!(
            store.load_rows(&mut cache, &cfg, "EMPTY"),
            Err(DashError::EmptyData { .. })
        ));

        let v1 = store.resolve("v1.9").unwrap();
        fs::remove_file(store.version_dir(&v1).join("Age.csv")).unwrap();
        let cfg = store.load_config(&v1).unwrap();
        match store.load_rows(&mut cache, &cfg, "DATA_AGE") {
            Err(DashError::MissingDataFile { key, .. }) => assert_eq!(key, "DATA_AGE"),
            other => panic!("expected MissingDataFile, got {other:?}"),
        }
    }

    #[test]
    fn test_open_missing_root() {
        assert!(VersionStore::open("/nonexistent/data/root").is_err());
    }
}
