//! Calibration catalog
//!
//! Parameters of the housing-market model, grouped the way the dashboard
//! shows them.

use hc_core::{CatalogEntry, CatalogFormat, DashError, Result};

/// Data file also used, when present, to derive the income domain of
/// power-law curves.
pub const INCOME_DOMAIN_KEY: &str = "DATA_INCOME_GIVEN_AGE";

pub static CATALOG: &[CatalogEntry] = &[
    // Demographics
    CatalogEntry {
        id: "target_population",
        title: "Target population",
        group: "Demographics",
        format: CatalogFormat::Scalar,
        config_keys: &["TARGET_POPULATION"],
        data_file_config_keys: &[],
        description: "Number of households simulated at steady state.",
    },
    CatalogEntry {
        id: "age_distribution",
        title: "Household age distribution",
        group: "Demographics",
        format: CatalogFormat::BinnedDistribution,
        config_keys: &[],
        data_file_config_keys: &["DATA_AGE_DISTRIBUTION"],
        description: "Share of household representative persons by age band.",
    },
    // Income & wealth
    CatalogEntry {
        id: "income_given_age",
        title: "Gross income given age",
        group: "Income & wealth",
        format: CatalogFormat::JointDistribution,
        config_keys: &[],
        data_file_config_keys: &["DATA_INCOME_GIVEN_AGE"],
        description: "Joint probability of age band and log gross annual income.",
    },
    CatalogEntry {
        id: "wealth_given_income",
        title: "Financial wealth given income",
        group: "Income & wealth",
        format: CatalogFormat::JointDistribution,
        config_keys: &[],
        data_file_config_keys: &["DATA_WEALTH_GIVEN_INCOME"],
        description: "Joint probability of log income and log liquid financial wealth.",
    },
    CatalogEntry {
        id: "desired_bank_balance",
        title: "Desired bank balance",
        group: "Income & wealth",
        format: CatalogFormat::ScalarPair,
        config_keys: &["DESIRED_BANK_BALANCE_ALPHA", "DESIRED_BANK_BALANCE_BETA"],
        data_file_config_keys: &[],
        description: "Log-linear fit of desired liquid wealth on income.",
    },
    // Taxation
    CatalogEntry {
        id: "tax_rates",
        title: "Income tax bands",
        group: "Taxation",
        format: CatalogFormat::BinnedDistribution,
        config_keys: &[],
        data_file_config_keys: &["DATA_TAX_RATES"],
        description: "Marginal income tax rate by annual income threshold.",
    },
    CatalogEntry {
        id: "national_insurance_rates",
        title: "National Insurance bands",
        group: "Taxation",
        format: CatalogFormat::BinnedDistribution,
        config_keys: &[],
        data_file_config_keys: &["DATA_NATIONAL_INSURANCE_RATES"],
        description: "Marginal employee NI rate by annual income threshold.",
    },
    // Housing market
    CatalogEntry {
        id: "house_price_distribution",
        title: "House price distribution",
        group: "Housing market",
        format: CatalogFormat::LognormalPair,
        config_keys: &["HOUSE_PRICES_SCALE", "HOUSE_PRICES_SHAPE"],
        data_file_config_keys: &[],
        description: "Lognormal reference distribution of house prices.",
    },
    CatalogEntry {
        id: "rental_price_distribution",
        title: "Rental price distribution",
        group: "Housing market",
        format: CatalogFormat::LognormalPair,
        config_keys: &["RENTAL_PRICES_SCALE", "RENTAL_PRICES_SHAPE"],
        data_file_config_keys: &[],
        description: "Lognormal reference distribution of monthly rents.",
    },
    CatalogEntry {
        id: "market_average_price_decay",
        title: "Average price decay",
        group: "Housing market",
        format: CatalogFormat::Scalar,
        config_keys: &["MARKET_AVERAGE_PRICE_DECAY"],
        data_file_config_keys: &[],
        description: "Decay constant of the exponential moving average of sale prices.",
    },
    CatalogEntry {
        id: "sale_price_reduction",
        title: "Sale price reduction",
        group: "Housing market",
        format: CatalogFormat::GaussianPair,
        config_keys: &["REDUCTION_MU", "REDUCTION_SIGMA"],
        data_file_config_keys: &[],
        description: "Gaussian over the log of the percentage reduction of unsold listings.",
    },
    CatalogEntry {
        id: "hpa_expectation",
        title: "House price appreciation expectation",
        group: "Housing market",
        format: CatalogFormat::HpaExpectationLine,
        config_keys: &["HPA_EXPECTATION_FACTOR", "HPA_EXPECTATION_CONST"],
        data_file_config_keys: &[],
        description: "Expected annual HPA as an affine function of recent HPA.",
    },
    // Household behaviour
    CatalogEntry {
        id: "desired_rent",
        title: "Desired rent",
        group: "Household behaviour",
        format: CatalogFormat::PowerLawPair,
        config_keys: &["DESIRED_RENT_SCALE", "DESIRED_RENT_EXPONENT"],
        data_file_config_keys: &[INCOME_DOMAIN_KEY],
        description: "Desired monthly rent as a power law of gross income.",
    },
    CatalogEntry {
        id: "buy_quad",
        title: "House purchase budget",
        group: "Household behaviour",
        format: CatalogFormat::BuyQuad,
        config_keys: &["BUY_SCALE", "BUY_EXPONENT", "BUY_MU", "BUY_SIGMA"],
        data_file_config_keys: &[INCOME_DOMAIN_KEY],
        description: "Power-law budget on income times a lognormal multiplier.",
    },
    // Buy-to-let
    CatalogEntry {
        id: "btl_probability",
        title: "Buy-to-let investor probability",
        group: "Buy-to-let",
        format: CatalogFormat::ScalarPair,
        config_keys: &["BTL_PROBABILITY_MIN", "BTL_PROBABILITY_MAX"],
        data_file_config_keys: &[],
        description: "Probability bounds of a household becoming a BTL investor.",
    },
];

/// Number of catalog entries
pub fn num_entries() -> usize {
    CATALOG.len()
}

/// Get an entry by index
pub fn get_entry(index: usize) -> Option<&'static CatalogEntry> {
    CATALOG.get(index)
}

/// Find an entry by id
pub fn find_entry(id: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|e| e.id == id)
}

/// Find an entry by id, failing with `UnknownCatalogId`
pub fn require_entry(id: &str) -> Result<&'static CatalogEntry> {
    find_entry(id).ok_or_else(|| DashError::UnknownCatalogId(id.to_string()))
}

/// Entries of one group, in catalog order
pub fn entries_in_group(group: &str) -> impl Iterator<Item = &'static CatalogEntry> + '_ {
    CATALOG.iter().filter(move |e| e.group == group)
}

/// Group names in order of first appearance
pub fn groups() -> Vec<&'static str> {
    let mut out: Vec<&'static str> = Vec::new();
    for entry in CATALOG {
        if !out.contains(&entry.group) {
            out.push(entry.group);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_entry_validates() {
        for entry in CATALOG {
            entry
                .validate()
                .unwrap_or_else(|e| panic!("{} invalid: {}", entry.id, e));
        }
    }

    #[test]
    fn test_ids_unique() {
        let ids: HashSet<_> = CATALOG.iter().map(|e| e.id).collect();
        assert_eq!(ids.len(), num_entries());
    }

    #[test]
    fn test_keys_are_config_keys() {
        for entry in CATALOG {
            for key in entry.all_keys() {
                assert!(hc_core::config::is_config_key(key), "{key}");
            }
        }
    }

    #[test]
    fn test_lookup() {
        assert_eq!(find_entry("buy_quad").unwrap().config_keys.len(), 4);
        assert!(find_entry("nope").is_none());
        assert!(matches!(
            require_entry("nope"),
            Err(DashError::UnknownCatalogId(_))
        ));
        assert_eq!(get_entry(0).unwrap().id, "target_population");
    }

    #[test]
    fn test_groups() {
        let groups = groups();
        assert_eq!(groups[0], "Demographics");
        assert_eq!(entries_in_group("Taxation").count(), 2);
    }

    #[test]
    fn test_every_format_is_declared() {
        use hc_core::CatalogFormat as F;
        for format in [
            F::Scalar,
            F::ScalarPair,
            F::BinnedDistribution,
            F::JointDistribution,
            F::LognormalPair,
            F::PowerLawPair,
            F::GaussianPair,
            F::HpaExpectationLine,
            F::BuyQuad,
        ] {
            assert!(CATALOG.iter().any(|e| e.format == format), "{format}");
        }
    }
}
