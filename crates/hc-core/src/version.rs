//! Version identifiers of published calibration snapshots.
//!
//! Versions look like `v0`, `v3.8` or `v1.2.10`. Ordering is numeric,
//! component by component, with missing components read as zero; two
//! versions that are numerically equal (`v3.8` and `v3.8.0`) fall back to a
//! lexicographic comparison of their text so the order stays total.

use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DashError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    raw: String,
    parts: Vec<u64>,
}

impl Version {
    /// Parse a version identifier, with or without the leading `v`.
    pub fn parse(text: &str) -> Result<Self, DashError> {
        let raw = text.trim();
        let digits = raw
            .strip_prefix('v')
            .or_else(|| raw.strip_prefix('V'))
            .unwrap_or(raw);
        if digits.is_empty() {
            return Err(DashError::InvalidVersion(text.to_string()));
        }

        let parts = digits
            .split('.')
            .map(|p| {
                if p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(DashError::InvalidVersion(text.to_string()));
                }
                p.parse::<u64>()
                    .map_err(|_| DashError::InvalidVersion(text.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            raw: raw.to_string(),
            parts,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Numeric components, e.g. `[3, 8]` for `v3.8`.
    pub fn parts(&self) -> &[u64] {
        &self.parts
    }

    pub fn major(&self) -> u64 {
        self.parts[0]
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.parts.len().max(other.parts.len());
        for i in 0..len {
            let a = self.parts.get(i).copied().unwrap_or(0);
            let b = other.parts.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => {}
                ord => return ord,
            }
        }
        self.raw.cmp(&other.raw)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for Version {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

impl Serialize for Version {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Version::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Sort versions in place, oldest first.
pub fn sort_versions(versions: &mut [Version]) {
    versions.sort();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_parse_with_and_without_prefix() {
        assert_eq!(v("v3.8").parts(), &[3, 8]);
        assert_eq!(v("3.8").parts(), &[3, 8]);
        assert_eq!(v("V0").parts(), &[0]);
        assert_eq!(v("v3.8").to_string(), "v3.8");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "v", "v3.", "v.3", "v3.x", "latest", "v-1"] {
            assert!(
                matches!(Version::parse(bad), Err(DashError::InvalidVersion(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_numeric_not_lexicographic() {
        assert!(v("v1.10") > v("v1.9"));
        assert!(v("v10") > v("v9.9"));
        assert!(v("v0") < v("v0.1"));
    }

    #[test]
    fn test_tie_break_is_total() {
        let a = v("v3.8");
        let b = v("v3.8.0");
        assert_ne!(a.cmp(&b), Ordering::Equal);
        assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
    }

    #[test]
    fn test_sort_versions() {
        let mut versions = vec![v("v3.8"), v("v0"), v("v1.10"), v("v1.2")];
        sort_versions(&mut versions);
        let names: Vec<_> = versions.iter().map(|x| x.as_str()).collect();
        assert_eq!(names, ["v0", "v1.2", "v1.10", "v3.8"]);
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&v("v3.8")).unwrap();
        assert_eq!(json, "\"v3.8\"");
        let back: Version = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v("v3.8"));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn name(parts: &[u64]) -> String {
            let dotted: Vec<String> = parts.iter().map(u64::to_string).collect();
            format!("v{}", dotted.join("."))
        }

        proptest! {
            #[test]
            fn order_matches_numeric_parts(
                a in proptest::collection::vec(0u64..50, 1..4),
                b in proptest::collection::vec(0u64..50, 1..4),
            ) {
                let (va, vb) = (v(&name(&a)), v(&name(&b)));
                prop_assert_eq!(va.cmp(&vb), vb.cmp(&va).reverse());
                if a.len() == b.len() {
                    prop_assert_eq!(va.cmp(&vb), a.cmp(&b));
                }
                prop_assert_eq!(v(&va.to_string()), va);
            }
        }
    }
}
