//! `config.properties` snapshots.
//!
//! Each version folder carries one key/value file. Keys are upper-case
//! identifiers; the comment block written directly above a key is kept as
//! well, because dataset attribution reads its sources from there.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;
use tracing::warn;

use crate::error::{DashError, Result};
use crate::version::Version;

/// Immutable key/value view of one version's configuration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSnapshot {
    pub version: Version,
    values: BTreeMap<String, String>,
    #[serde(skip)]
    comments: BTreeMap<String, Vec<String>>,
}

impl ConfigSnapshot {
    /// Load a snapshot from a properties file
    pub fn load_from_file(version: Version, path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| DashError::io(path, e))?;
        Ok(Self::parse(version, &contents))
    }

    /// Parse a snapshot from properties text
    pub fn parse(version: Version, contents: &str) -> Self {
        let parsed = parse_properties(contents);
        Self {
            version,
            values: parsed.values,
            comments: parsed.comments,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Value of `key`, or a `MissingConfigKey` error naming this version.
    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key).ok_or_else(|| DashError::MissingConfigKey {
            version: self.version.to_string(),
            key: key.to_string(),
        })
    }

    /// Numeric value of `key`.
    pub fn number(&self, key: &str) -> Result<f64> {
        let raw = self.require(key)?;
        match raw.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(n),
            _ => Err(DashError::InvalidNumber {
                version: self.version.to_string(),
                key: key.to_string(),
                value: raw.to_string(),
            }),
        }
    }

    /// Comment lines written directly above `key` (without the `#`).
    pub fn comments(&self, key: &str) -> &[String] {
        self.comments.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Result of parsing a properties file
#[derive(Debug, Default)]
pub struct ParsedProperties {
    pub values: BTreeMap<String, String>,
    pub comments: BTreeMap<String, Vec<String>>,
}

/// Parse `KEY = value` / `KEY: value` lines.
///
/// Lines whose key is not upper-case alphanumeric/underscore are skipped.
pub fn parse_properties(contents: &str) -> ParsedProperties {
    let mut parsed = ParsedProperties::default();
    let mut pending: Vec<String> = Vec::new();

    for (lineno, line) in contents.lines().enumerate() {
        let line = line.trim();

        if line.is_empty() {
            pending.clear();
            continue;
        }
        if let Some(comment) = line.strip_prefix('#').or_else(|| line.strip_prefix('!')) {
            pending.push(comment.trim().to_string());
            continue;
        }

        let split = line.find(['=', ':']);
        let Some(idx) = split else {
            warn!(line = lineno + 1, "skipping config line without separator");
            pending.clear();
            continue;
        };
        let key = line[..idx].trim();
        if !is_config_key(key) {
            warn!(line = lineno + 1, key, "skipping config line with invalid key");
            pending.clear();
            continue;
        }

        let value = clean_value(&line[idx + 1..]);
        parsed.values.insert(key.to_string(), value);
        if pending.is_empty() {
            parsed.comments.remove(key);
        } else {
            parsed
                .comments
                .insert(key.to_string(), std::mem::take(&mut pending));
        }
    }

    parsed
}

/// Trim whitespace and one level of matching surrounding quotes.
pub fn clean_value(raw: &str) -> String {
    let trimmed = raw.trim();
    let bytes = trimmed.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if (first == b'"' || first == b'\'') && first == last {
            return trimmed[1..trimmed.len() - 1].trim().to_string();
        }
    }
    trimmed.to_string()
}

/// True if `key` is a non-empty `[A-Z0-9_]+` identifier.
pub fn is_config_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(text: &str) -> ConfigSnapshot {
        ConfigSnapshot::parse(Version::parse("v1").unwrap(), text)
    }

    #[test]
    fn test_parse_basic_values() {
        let cfg = snapshot("TARGET_POPULATION = 10000\nBUY_MU: 1.2\n");
        assert_eq!(cfg.get("TARGET_POPULATION"), Some("10000"));
        assert_eq!(cfg.number("BUY_MU").unwrap(), 1.2);
        assert_eq!(cfg.len(), 2);
    }

    #[test]
    fn test_quotes_and_whitespace_stripped() {
        let cfg = snapshot("DATA_TAX_RATES = \"src/main/resources/TaxRates.csv\"  \n");
        assert_eq!(cfg.get("DATA_TAX_RATES"), Some("src/main/resources/TaxRates.csv"));
        assert_eq!(clean_value("  ' 12 '  "), "12");
        assert_eq!(clean_value("\"unterminated"), "\"unterminated");
    }

    #[test]
    fn test_comment_block_attaches_to_next_key() {
        let text = "# Header comment\n\n# Source: WAS Wave 3\n# 2010-2012\nDATA_WEALTH = w.csv\nOTHER = 1\n";
        let cfg = snapshot(text);
        assert_eq!(cfg.comments("DATA_WEALTH"), ["Source: WAS Wave 3", "2010-2012"]);
        assert!(cfg.comments("OTHER").is_empty());
    }

    #[test]
    fn test_invalid_lines_skipped() {
        let cfg = snapshot("lowercase = 1\nno separator here\nGOOD_KEY=2\n");
        assert_eq!(cfg.len(), 1);
        assert_eq!(cfg.get("GOOD_KEY"), Some("2"));
    }

    #[test]
    fn test_missing_and_invalid_numbers() {
        let cfg = snapshot("BUY_SIGMA = abc\n");
        assert!(matches!(
            cfg.number("BUY_MU"),
            Err(DashError::MissingConfigKey { .. })
        ));
        assert!(matches!(
            cfg.number("BUY_SIGMA"),
            Err(DashError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_later_duplicate_wins() {
        let cfg = snapshot("A = 1\nA = 2\n");
        assert_eq!(cfg.get("A"), Some("2"));
    }
}
