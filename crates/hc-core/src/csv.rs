//! Numeric CSV loading.
//!
//! Calibration data files are small comma-separated tables of numbers, often
//! with a header row and `#` comments. Parsing is lenient: any row with a
//! non-numeric cell is dropped.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use tracing::debug;

use crate::config::clean_value;
use crate::error::{DashError, Result};

/// Parsed numeric rows
pub type Rows = Vec<Vec<f64>>;

/// Parse all fully numeric rows from CSV text.
pub fn parse_numeric_rows(contents: &str) -> Rows {
    contents
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            parse_row(line)
        })
        .collect()
}

fn parse_row(line: &str) -> Option<Vec<f64>> {
    let mut cells: Vec<String> = line.split(',').map(clean_value).collect();
    // Spreadsheet exports often end rows with a separator.
    while cells.last().is_some_and(|c| c.is_empty()) {
        cells.pop();
    }
    let row = cells
        .into_iter()
        .map(|cell| cell.parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect::<Option<Vec<_>>>()?;
    (!row.is_empty()).then_some(row)
}

/// Read and parse a CSV file
pub fn read_numeric_rows(path: &Path) -> Result<Rows> {
    let contents = std::fs::read_to_string(path).map_err(|e| DashError::io(path, e))?;
    Ok(parse_numeric_rows(&contents))
}

#[derive(Debug)]
struct CachedRows {
    modified: Option<SystemTime>,
    rows: Arc<Rows>,
}

/// Parsed-file cache keyed by path and modification time.
///
/// Owned by the caller and handed to each comparison; entries are re-read
/// when the file's mtime changes.
#[derive(Debug, Default)]
pub struct CsvCache {
    entries: HashMap<PathBuf, CachedRows>,
    hits: u64,
}

impl CsvCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `path`, reusing the cached parse if the file is unchanged.
    pub fn load(&mut self, path: &Path) -> Result<Arc<Rows>> {
        let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let modified = std::fs::metadata(&key)
            .map_err(|e| DashError::io(&key, e))?
            .modified()
            .ok();

        if let Some(cached) = self.entries.get(&key) {
            if cached.modified.is_some() && cached.modified == modified {
                self.hits += 1;
                return Ok(Arc::clone(&cached.rows));
            }
        }

        debug!(path = %key.display(), "parsing csv");
        let rows = Arc::new(read_numeric_rows(&key)?);
        self.entries.insert(
            key,
            CachedRows {
                modified,
                rows: Arc::clone(&rows),
            },
        );
        Ok(rows)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of loads served without re-reading the file.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
    }
}
