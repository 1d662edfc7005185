//! Catalog schema: which parameters the dashboard compares and how.
//!
//! The entries themselves are static data (see the `hc-data` crate); this
//! module only defines their shape and validates it.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::error::{DashError, Result};

/// Visual shape of a catalog item; selects the comparison builder.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CatalogFormat {
    Scalar,
    ScalarPair,
    BinnedDistribution,
    JointDistribution,
    LognormalPair,
    PowerLawPair,
    GaussianPair,
    HpaExpectationLine,
    BuyQuad,
}

/// How many config keys a format consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCount {
    Exactly(usize),
    AtLeast(usize),
}

impl KeyCount {
    pub fn accepts(self, n: usize) -> bool {
        match self {
            KeyCount::Exactly(k) => n == k,
            KeyCount::AtLeast(k) => n >= k,
        }
    }
}

impl core::fmt::Display for KeyCount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            KeyCount::Exactly(k) => write!(f, "exactly {}", k),
            KeyCount::AtLeast(k) => write!(f, "at least {}", k),
        }
    }
}

impl CatalogFormat {
    /// Parse a format tag; unknown tags are a schema error.
    pub fn parse(tag: &str) -> Result<Self> {
        CatalogFormat::from_str(tag).map_err(|_| DashError::UnsupportedFormat(tag.to_string()))
    }

    pub const fn expected_config_keys(&self) -> KeyCount {
        match self {
            CatalogFormat::Scalar => KeyCount::AtLeast(1),
            CatalogFormat::ScalarPair
            | CatalogFormat::LognormalPair
            | CatalogFormat::PowerLawPair
            | CatalogFormat::GaussianPair
            | CatalogFormat::HpaExpectationLine => KeyCount::Exactly(2),
            CatalogFormat::BuyQuad => KeyCount::Exactly(4),
            CatalogFormat::BinnedDistribution | CatalogFormat::JointDistribution => {
                KeyCount::Exactly(0)
            }
        }
    }

    /// Distributions read exactly one data file.
    pub const fn is_distribution(&self) -> bool {
        matches!(
            self,
            CatalogFormat::BinnedDistribution | CatalogFormat::JointDistribution
        )
    }
}

/// A statically declared comparable item
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: &'static str,
    pub title: &'static str,
    pub group: &'static str,
    pub format: CatalogFormat,
    pub config_keys: &'static [&'static str],
    /// Keys whose values name CSV files in the version folder.
    pub data_file_config_keys: &'static [&'static str],
    pub description: &'static str,
}

impl CatalogEntry {
    /// Check the declared keys against the format's requirements.
    pub fn validate(&self) -> Result<()> {
        let expected = self.format.expected_config_keys();
        if !expected.accepts(self.config_keys.len()) {
            return Err(DashError::WrongKeyCount {
                id: self.id.to_string(),
                format: self.format.to_string(),
                expected: expected.to_string(),
                found: self.config_keys.len(),
            });
        }
        if self.format.is_distribution() && self.data_file_config_keys.len() != 1 {
            return Err(DashError::WrongDataFileCount {
                id: self.id.to_string(),
                format: self.format.to_string(),
                found: self.data_file_config_keys.len(),
            });
        }
        Ok(())
    }

    /// Config keys followed by data-file keys.
    pub fn all_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.config_keys
            .iter()
            .chain(self.data_file_config_keys.iter())
            .copied()
    }
}
