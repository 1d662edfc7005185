//! Constants shared by every comparison component.

/// Threshold for "this delta is zero" and for guarding divisions.
///
/// One absolute value is used everywhere so that `unchanged` flags and the
/// displayed deltas can never disagree.
pub const EPSILON: f64 = 1e-12;

/// Number of samples drawn for every parametric curve.
pub const CURVE_SAMPLES: usize = 180;

/// Policy cap (in percent) for the sale-price reduction percent view.
pub const PERCENT_CAP: f64 = 50.0;

/// Income domain used by power-law curves when no income data is available.
pub const POWER_LAW_FALLBACK_DOMAIN: (f64, f64) = (10_000.0, 250_000.0);

/// Domain of the house-price-appreciation expectation line.
pub const HPA_DOMAIN: (f64, f64) = (-0.2, 0.2);

/// Time step of the HPA expectation line, in years.
pub const HPA_DT: f64 = 1.0;

/// Half-width, in sigmas, of the lognormal sampling domain.
pub const LOGNORMAL_SIGMAS: f64 = 3.0;

/// Half-width, in sigmas, of the Gaussian sampling domain.
pub const GAUSSIAN_SIGMAS: f64 = 4.0;

/// Name of the key/value file inside every version folder.
pub const CONFIG_FILE_NAME: &str = "config.properties";

/// Name of the version-notes log at the root of the data directory.
pub const NOTES_FILE_NAME: &str = "version-notes.json";
