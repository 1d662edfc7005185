//! Dataset attribution: which survey or register a parameter came from.
//!
//! Sources are inferred from the comment block above each config key and,
//! failing that, from the value itself (data-file names often embed the
//! dataset and year). Rules are tried in a fixed priority order and the first
//! match wins.

use regex::Regex;
use serde::Serialize;
use strum::Display;

use crate::catalog::CatalogEntry;
use crate::config::ConfigSnapshot;

/// Known calibration datasets, in matching priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DatasetTag {
    Was,
    Lcfs,
    Psd,
    Hmrc,
    Ehs,
    Zoopla,
    LandRegistry,
    Nmg,
    Ons,
    Boe,
}

impl DatasetTag {
    pub const fn label(&self) -> &'static str {
        match self {
            DatasetTag::Was => "Wealth and Assets Survey",
            DatasetTag::Lcfs => "Living Costs and Food Survey",
            DatasetTag::Psd => "FCA Product Sales Data",
            DatasetTag::Hmrc => "HM Revenue & Customs",
            DatasetTag::Ehs => "English Housing Survey",
            DatasetTag::Zoopla => "Zoopla listings",
            DatasetTag::LandRegistry => "HM Land Registry Price Paid",
            DatasetTag::Nmg => "NMG household survey",
            DatasetTag::Ons => "Office for National Statistics",
            DatasetTag::Boe => "Bank of England",
        }
    }
}

/// Inferred origin of one config key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceAttribution {
    pub key: String,
    pub dataset: Option<DatasetTag>,
    pub dataset_label: Option<&'static str>,
    pub year: Option<String>,
    pub edition: Option<String>,
    /// Comment text the attribution was read from.
    pub note: Option<String>,
}

/// Compiled attribution rules
#[derive(Debug)]
pub struct AttributionResolver {
    rules: Vec<(DatasetTag, Regex)>,
    year: Regex,
    edition: Regex,
}

// Order matters: survey names before the agencies that publish them.
const RULES: &[(DatasetTag, &str)] = &[
    (DatasetTag::Was, r"(?i)\bWAS\b|wealth\s+and\s+assets"),
    (
        DatasetTag::Lcfs,
        r"(?i)\bLCFS?\b|\bEFS\b|living\s+costs|expenditure\s+and\s+food",
    ),
    (DatasetTag::Psd, r"(?i)\bPSD\b|product\s+sales\s+data"),
    (DatasetTag::Hmrc, r"(?i)\bHMRC\b|revenue\s*(?:&|and)\s*customs"),
    (DatasetTag::Ehs, r"(?i)\bEHS\b|english\s+housing\s+survey"),
    (DatasetTag::Zoopla, r"(?i)zoopla"),
    (DatasetTag::LandRegistry, r"(?i)land\s*registry|price\s+paid"),
    (DatasetTag::Nmg, r"(?i)\bNMG\b"),
    (DatasetTag::Ons, r"(?i)\bONS\b|office\s+for\s+national\s+statistics"),
    (DatasetTag::Boe, r"(?i)\bBoE\b|bank\s+of\s+england"),
];

impl AttributionResolver {
    pub fn new() -> Self {
        // The patterns are literals; a failure here is a bug in RULES.
        let compile = |p: &str| Regex::new(p).unwrap_or_else(|e| panic!("bad rule {p}: {e}"));
        Self {
            rules: RULES.iter().map(|(t, p)| (*t, compile(p))).collect(),
            year: compile(r"(?:19|20)\d{2}(?:\s*[-/]\s*(?:(?:19|20)\d{2}|\d{2}))?"),
            edition: compile(
                r"(?i)\b(?:wave|round)\s+\d+\b|\b\d{4}\s+edition\b|\bedition\s+\d+\b|\b(?:19|20)\d{2}/\d{2}\b",
            ),
        }
    }

    /// Dataset tag for a piece of text, by rule priority.
    pub fn match_dataset(&self, text: &str) -> Option<DatasetTag> {
        self.rules
            .iter()
            .find(|(_, re)| re.is_match(text))
            .map(|(tag, _)| *tag)
    }

    /// Last year (or year range) mentioned in `text`.
    pub fn match_year(&self, text: &str) -> Option<String> {
        self.year
            .find_iter(text)
            .filter(|m| is_standalone(text, m.start(), m.end()))
            .last()
            .map(|m| m.as_str().replace(' ', ""))
    }

    pub fn match_edition(&self, text: &str) -> Option<String> {
        self.edition.find(text).map(|m| m.as_str().to_string())
    }

    /// Attribute one key of a snapshot.
    pub fn resolve(&self, snapshot: &ConfigSnapshot, key: &str) -> SourceAttribution {
        let comment = snapshot.comments(key).join(" ");
        let value = snapshot.get(key).unwrap_or_default();

        let dataset = self
            .match_dataset(&comment)
            .or_else(|| self.match_dataset(value));
        let year = self.match_year(&comment).or_else(|| self.match_year(value));
        let edition = self
            .match_edition(&comment)
            .or_else(|| self.match_edition(value));

        SourceAttribution {
            key: key.to_string(),
            dataset,
            dataset_label: dataset.map(|d| d.label()),
            year,
            edition,
            note: (!comment.is_empty()).then_some(comment),
        }
    }

    /// Attribute every key of a catalog entry.
    pub fn resolve_entry(
        &self,
        snapshot: &ConfigSnapshot,
        entry: &CatalogEntry,
    ) -> Vec<SourceAttribution> {
        entry.all_keys().map(|k| self.resolve(snapshot, k)).collect()
    }
}

impl Default for AttributionResolver {
    fn default() -> Self {
        Self::new()
    }
}

// Years may follow a letter ("Zoopla2014") but not a digit ("12011") or a
// version prefix ("v2011").
fn is_standalone(text: &str, start: usize, end: usize) -> bool {
    let mut preceding = text[..start].chars().rev();
    let before = preceding.next();
    let version_prefix = matches!(before, Some('v' | 'V'))
        && !preceding.next().is_some_and(|c| c.is_ascii_alphanumeric());
    let after = text[end..].chars().next();
    !before.is_some_and(|c| c.is_ascii_digit())
        && !version_prefix
        && !after.is_some_and(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::Version;

    fn snapshot(text: &str) -> ConfigSnapshot {
        ConfigSnapshot::parse(Version::parse("v3.8").unwrap(), text)
    }

    #[test]
    fn test_comment_takes_priority_over_value() {
        let cfg = snapshot(
            "# Source: ONS Wealth and Assets Survey, Wave 3 (2010-2012)\nDATA_WEALTH = Zoopla2014.csv\n",
        );
        let r = AttributionResolver::new().resolve(&cfg, "DATA_WEALTH");
        assert_eq!(r.dataset, Some(DatasetTag::Was));
        assert_eq!(r.year.as_deref(), Some("2010-2012"));
        assert_eq!(r.edition.as_deref(), Some("Wave 3"));
        assert_eq!(r.dataset_label, Some("Wealth and Assets Survey"));
    }

    #[test]
    fn test_value_used_without_comment() {
        let cfg = snapshot("DATA_PRICES = \"src/main/resources/LandRegistry_2016.csv\"\n");
        let r = AttributionResolver::new().resolve(&cfg, "DATA_PRICES");
        assert_eq!(r.dataset, Some(DatasetTag::LandRegistry));
        assert_eq!(r.year.as_deref(), Some("2016"));
        assert!(r.note.is_none());
    }

    #[test]
    fn test_tax_year_edition() {
        let cfg = snapshot("# HMRC income tax bands 2023/24\nDATA_TAX_RATES = TaxRates.csv\n");
        let r = AttributionResolver::new().resolve(&cfg, "DATA_TAX_RATES");
        assert_eq!(r.dataset, Some(DatasetTag::Hmrc));
        assert_eq!(r.year.as_deref(), Some("2023/24"));
        assert_eq!(r.edition.as_deref(), Some("2023/24"));
    }

    #[test]
    fn test_unknown_source() {
        let cfg = snapshot("# hand tuned\nMARKET_AVERAGE_PRICE_DECAY = 0.25\n");
        let r = AttributionResolver::new().resolve(&cfg, "MARKET_AVERAGE_PRICE_DECAY");
        assert_eq!(r.dataset, None);
        assert_eq!(r.year, None);
        assert_eq!(r.note.as_deref(), Some("hand tuned"));
    }

    #[test]
    fn test_year_must_stand_alone() {
        let resolver = AttributionResolver::new();
        assert_eq!(resolver.match_year("population 120119"), None);
        assert_eq!(resolver.match_year("2011 and 2016"), Some("2016".to_string()));
        assert_eq!(resolver.match_year("release v2011"), None);
    }

    #[test]
    fn test_year_glued_to_file_name() {
        let cfg = snapshot("DATA_RENTS = src/main/resources/Zoopla2014.csv\n");
        let r = AttributionResolver::new().resolve(&cfg, "DATA_RENTS");
        assert_eq!(r.dataset, Some(DatasetTag::Zoopla));
        assert_eq!(r.year.as_deref(), Some("2014"));

        let resolver = AttributionResolver::new();
        assert_eq!(
            resolver.match_year("AgeDistribution2011.csv"),
            Some("2011".to_string())
        );
        assert_eq!(resolver.match_year("Revision2011.csv"), Some("2011".to_string()));
    }

    #[test]
    fn test_priority_order() {
        let resolver = AttributionResolver::new();
        // Mentions both the survey and its publisher.
        assert_eq!(
            resolver.match_dataset("ONS Living Costs and Food Survey"),
            Some(DatasetTag::Lcfs)
        );
    }
}
