//! Parametric curves built from pairs of config scalars.
//!
//! Every builder takes the parameters of both versions and samples the two
//! curves on one domain, so the front end can draw them on shared axes.
//! Builders are pure: no files, no shared state.

use core::f64::consts::{PI, SQRT_2};

use hc_core::{
    CURVE_SAMPLES, EPSILON, GAUSSIAN_SIGMAS, HPA_DOMAIN, HPA_DT, LOGNORMAL_SIGMAS, PERCENT_CAP,
    POWER_LAW_FALLBACK_DOMAIN,
};
use serde::Serialize;

/// Error function, Abramowitz & Stegun 7.1.26 (|error| < 1.5e-7).
pub fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let y = 1.0 - (((((A5 * t + A4) * t) + A3) * t + A2) * t + A1) * t * (-x * x).exp();
    sign * y
}

/// Standard normal CDF.
pub fn normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / SQRT_2))
}

pub fn normal_pdf(x: f64, mu: f64, sigma: f64) -> f64 {
    if sigma <= EPSILON {
        return 0.0;
    }
    let z = (x - mu) / sigma;
    (-0.5 * z * z).exp() / (sigma * (2.0 * PI).sqrt())
}

/// Density of `exp(N(mu, sigma))` at `x`; zero for `x <= 0`.
pub fn lognormal_pdf(x: f64, mu: f64, sigma: f64) -> f64 {
    if x <= 0.0 || sigma <= EPSILON {
        return 0.0;
    }
    let z = (x.ln() - mu) / sigma;
    (-0.5 * z * z).exp() / (x * sigma * (2.0 * PI).sqrt())
}

/// `n` evenly spaced points from `lo` to `hi` inclusive.
pub fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![lo],
        _ => {
            let step = (hi - lo) / (n - 1) as f64;
            let mut xs: Vec<f64> = (0..n - 1).map(|i| lo + step * i as f64).collect();
            xs.push(hi);
            xs
        }
    }
}

/// `n` log-uniform points from `lo` to `hi`; both must be positive.
pub fn geomspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    let mut xs: Vec<f64> = linspace(lo.ln(), hi.ln(), n)
        .into_iter()
        .map(f64::exp)
        .collect();
    if let Some(first) = xs.first_mut() {
        *first = lo;
    }
    if n > 1 {
        if let Some(last) = xs.last_mut() {
            *last = hi;
        }
    }
    xs
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Curve {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Curve {
    fn sample(xs: Vec<f64>, f: impl Fn(f64) -> f64) -> Self {
        let y = xs.iter().map(|&x| f(x)).collect();
        Self { x: xs, y }
    }
}

/// Both versions' curves on one domain
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurvePair {
    pub domain: (f64, f64),
    pub left: Curve,
    pub right: Curve,
}

/// A scalar seen in both versions
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeltaStat {
    pub left: f64,
    pub right: f64,
    pub delta: f64,
    /// Relative change in percent; `None` when `left` is zero.
    pub percent_change: Option<f64>,
}

impl DeltaStat {
    pub fn new(left: f64, right: f64) -> Self {
        let delta = right - left;
        Self {
            left,
            right,
            delta,
            percent_change: (left.abs() > EPSILON).then(|| delta / left.abs() * 100.0),
        }
    }
}

// -- lognormal --------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LognormalParams {
    pub mu: f64,
    pub sigma: f64,
}

impl LognormalParams {
    pub fn median(&self) -> f64 {
        self.mu.exp()
    }

    pub fn expectation(&self) -> f64 {
        (self.mu + self.sigma * self.sigma / 2.0).exp()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LognormalPairCurves {
    pub curves: CurvePair,
    pub mu: DeltaStat,
    pub sigma: DeltaStat,
    pub median: DeltaStat,
    pub expectation: DeltaStat,
}

impl LognormalPairCurves {
    pub fn deltas(&self) -> [f64; 4] {
        [
            self.mu.delta,
            self.sigma.delta,
            self.median.delta,
            self.expectation.delta,
        ]
    }
}

/// Lognormal PDFs on `[exp(min(mu - 3s)), exp(max(mu + 3s))]`, log-uniform.
pub fn lognormal_pair(left: LognormalParams, right: LognormalParams) -> LognormalPairCurves {
    let lo_log = (left.mu - LOGNORMAL_SIGMAS * left.sigma)
        .min(right.mu - LOGNORMAL_SIGMAS * right.sigma);
    let mut hi_log = (left.mu + LOGNORMAL_SIGMAS * left.sigma)
        .max(right.mu + LOGNORMAL_SIGMAS * right.sigma);
    if hi_log - lo_log <= EPSILON {
        hi_log = lo_log + 1.0;
    }
    let lo = lo_log.exp().max(f64::MIN_POSITIVE);
    let hi = hi_log.exp();

    let xs = geomspace(lo, hi, CURVE_SAMPLES);
    LognormalPairCurves {
        curves: CurvePair {
            domain: (lo, hi),
            left: Curve::sample(xs.clone(), |x| lognormal_pdf(x, left.mu, left.sigma)),
            right: Curve::sample(xs, |x| lognormal_pdf(x, right.mu, right.sigma)),
        },
        mu: DeltaStat::new(left.mu, right.mu),
        sigma: DeltaStat::new(left.sigma, right.sigma),
        median: DeltaStat::new(left.median(), right.median()),
        expectation: DeltaStat::new(left.expectation(), right.expectation()),
    }
}

// -- power law --------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerLawParams {
    pub scale: f64,
    pub exponent: f64,
}

impl PowerLawParams {
    pub fn eval(&self, x: f64) -> f64 {
        self.scale * x.powf(self.exponent)
    }
}

/// Where a power-law domain came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DomainSource {
    IncomeData,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerLawPairCurves {
    pub curves: CurvePair,
    pub domain_source: DomainSource,
    pub scale: DeltaStat,
    pub exponent: DeltaStat,
}

impl PowerLawPairCurves {
    pub fn deltas(&self) -> [f64; 2] {
        [self.scale.delta, self.exponent.delta]
    }
}

/// `scale * x^exponent` sampled log-uniformly over an income domain.
///
/// An absent or unusable `domain` falls back to the fixed income range.
pub fn power_law_pair(
    left: PowerLawParams,
    right: PowerLawParams,
    domain: Option<(f64, f64)>,
) -> PowerLawPairCurves {
    let usable = domain.filter(|&(lo, hi)| lo > 0.0 && hi.is_finite() && hi - lo > EPSILON);
    let ((lo, hi), domain_source) = match usable {
        Some(d) => (d, DomainSource::IncomeData),
        None => (POWER_LAW_FALLBACK_DOMAIN, DomainSource::Fallback),
    };

    let xs = geomspace(lo, hi, CURVE_SAMPLES);
    PowerLawPairCurves {
        curves: CurvePair {
            domain: (lo, hi),
            left: Curve::sample(xs.clone(), |x| left.eval(x)),
            right: Curve::sample(xs, |x| right.eval(x)),
        },
        domain_source,
        scale: DeltaStat::new(left.scale, right.scale),
        exponent: DeltaStat::new(left.exponent, right.exponent),
    }
}

// -- gaussian (sale price reduction) ----------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianParams {
    pub mu: f64,
    pub sigma: f64,
}

impl GaussianParams {
    /// Probability that `exp(N(mu, sigma))` exceeds `cap`, in `[0, 1]`.
    pub fn mass_beyond(&self, cap: f64) -> f64 {
        let threshold = cap.ln();
        if self.sigma <= EPSILON {
            return if self.mu > threshold { 1.0 } else { 0.0 };
        }
        (1.0 - normal_cdf((threshold - self.mu) / self.sigma)).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GaussianPairCurves {
    /// Normal PDF over the log of the reduction.
    pub log_reduction: CurvePair,
    /// Density over the reduction itself, in percent, up to the cap.
    pub percent: CurvePair,
    pub percent_cap: f64,
    pub percent_cap_mass_left: f64,
    pub percent_cap_mass_right: f64,
    pub mu: DeltaStat,
    pub sigma: DeltaStat,
    pub cap_mass: DeltaStat,
}

impl GaussianPairCurves {
    pub fn deltas(&self) -> [f64; 3] {
        [self.mu.delta, self.sigma.delta, self.cap_mass.delta]
    }
}

pub fn gaussian_pair(left: GaussianParams, right: GaussianParams) -> GaussianPairCurves {
    let lo = (left.mu - GAUSSIAN_SIGMAS * left.sigma).min(right.mu - GAUSSIAN_SIGMAS * right.sigma);
    let mut hi =
        (left.mu + GAUSSIAN_SIGMAS * left.sigma).max(right.mu + GAUSSIAN_SIGMAS * right.sigma);
    if hi - lo <= EPSILON {
        hi = lo + 1.0;
    }
    let xs = linspace(lo, hi, CURVE_SAMPLES);
    let log_reduction = CurvePair {
        domain: (lo, hi),
        left: Curve::sample(xs.clone(), |x| normal_pdf(x, left.mu, left.sigma)),
        right: Curve::sample(xs, |x| normal_pdf(x, right.mu, right.sigma)),
    };

    let cap = PERCENT_CAP;
    let mut pct_lo = lo.exp().max(1e-6);
    if pct_lo >= cap {
        pct_lo = cap * 1e-3;
    }
    let pxs = geomspace(pct_lo, cap, CURVE_SAMPLES);
    let percent = CurvePair {
        domain: (pct_lo, cap),
        left: Curve::sample(pxs.clone(), |x| lognormal_pdf(x, left.mu, left.sigma)),
        right: Curve::sample(pxs, |x| lognormal_pdf(x, right.mu, right.sigma)),
    };

    let mass_left = left.mass_beyond(cap);
    let mass_right = right.mass_beyond(cap);
    GaussianPairCurves {
        log_reduction,
        percent,
        percent_cap: cap,
        percent_cap_mass_left: mass_left,
        percent_cap_mass_right: mass_right,
        mu: DeltaStat::new(left.mu, right.mu),
        sigma: DeltaStat::new(left.sigma, right.sigma),
        cap_mass: DeltaStat::new(mass_left, mass_right),
    }
}

// -- HPA expectation line ---------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HpaParams {
    pub factor: f64,
    pub constant: f64,
}

impl HpaParams {
    pub fn eval(&self, x: f64) -> f64 {
        self.factor * HPA_DT * x + self.constant
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HpaLineCurves {
    pub curves: CurvePair,
    pub dt: f64,
    pub factor: DeltaStat,
    pub constant: DeltaStat,
}

impl HpaLineCurves {
    pub fn deltas(&self) -> [f64; 2] {
        [self.factor.delta, self.constant.delta]
    }
}

/// `y = factor * dt * x + const` on `[-0.2, 0.2]`.
pub fn hpa_expectation_line(left: HpaParams, right: HpaParams) -> HpaLineCurves {
    let (lo, hi) = HPA_DOMAIN;
    let xs = linspace(lo, hi, CURVE_SAMPLES);
    HpaLineCurves {
        curves: CurvePair {
            domain: (lo, hi),
            left: Curve::sample(xs.clone(), |x| left.eval(x)),
            right: Curve::sample(xs, |x| right.eval(x)),
        },
        dt: HPA_DT,
        factor: DeltaStat::new(left.factor, right.factor),
        constant: DeltaStat::new(left.constant, right.constant),
    }
}

// -- buy quad ---------------------------------------------------------------

/// `BUY_SCALE`, `BUY_EXPONENT`, `BUY_MU`, `BUY_SIGMA`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuyParams {
    pub scale: f64,
    pub exponent: f64,
    pub mu: f64,
    pub sigma: f64,
}

impl BuyParams {
    fn budget(&self) -> PowerLawParams {
        PowerLawParams {
            scale: self.scale,
            exponent: self.exponent,
        }
    }

    fn multiplier(&self) -> LognormalParams {
        LognormalParams {
            mu: self.mu,
            sigma: self.sigma,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyQuadCurves {
    /// Deterministic budget `scale * income^exponent`.
    pub budget: PowerLawPairCurves,
    /// Lognormal noise multiplying the budget.
    pub multiplier: LognormalPairCurves,
    pub multiplier_median: DeltaStat,
    pub multiplier_expectation: DeltaStat,
}

impl BuyQuadCurves {
    pub fn deltas(&self) -> impl Iterator<Item = f64> + '_ {
        self.budget
            .deltas()
            .into_iter()
            .chain(self.multiplier.deltas())
    }
}

pub fn buy_quad(left: BuyParams, right: BuyParams, domain: Option<(f64, f64)>) -> BuyQuadCurves {
    let budget = power_law_pair(left.budget(), right.budget(), domain);
    let multiplier = lognormal_pair(left.multiplier(), right.multiplier());
    BuyQuadCurves {
        multiplier_median: multiplier.median,
        multiplier_expectation: multiplier.expectation,
        budget,
        multiplier,
    }
}
