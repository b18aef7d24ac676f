//! Probability distributions and numerical helpers.
//!
//! Provides the [`Distribution`] trait and implementations for [`Normal`],
//! [`ChiSquared`], and [`Hypergeometric`], plus low-level functions
//! ([`ln_gamma`], [`gammainc`], [`gammaincc`], [`erf`], [`erfc`]) used for
//! p-value computation.

use core::f64::consts::PI;

use fourfold_core::{FourfoldError, Result};

use crate::combinatorics::ln_binomial;

// ── Numerical helpers ──────────────────────────────────────────────────────

/// Natural log of the gamma function via the Lanczos approximation (g=7).
pub fn ln_gamma(x: f64) -> f64 {
    const COEFFS: [f64; 8] = [
        676.5203681218851,
        -1259.1392167224028,
        771.32342877765313,
        -176.61502916214059,
        12.507343278686905,
        -0.13857109526572012,
        9.9843695780195716e-6,
        1.5056327351493116e-7,
    ];

    if x < 0.5 {
        // Reflection formula: Γ(x) = π / (sin(πx) · Γ(1-x))
        let log_pi_over_sin = (PI / (PI * x).sin()).ln();
        log_pi_over_sin - ln_gamma(1.0 - x)
    } else {
        let x = x - 1.0;
        let mut ag = 0.99999999999980993_f64;
        for (i, &c) in COEFFS.iter().enumerate() {
            ag += c / (x + i as f64 + 1.0);
        }
        let t = x + 7.5; // g + 0.5
        0.5 * (2.0 * PI).ln() + (x + 0.5) * t.ln() - t + ag.ln()
    }
}

// ── Regularized incomplete gamma functions ─────────────────────────────────

fn check_gamma_args(name: &str, a: f64, x: f64) -> Result<()> {
    if !(a > 0.0) {
        return Err(FourfoldError::InvalidInput(format!("{name}: a must be positive")));
    }
    if !(x >= 0.0) {
        return Err(FourfoldError::Domain(format!("{name}: x must be non-negative")));
    }
    Ok(())
}

/// Regularized lower incomplete gamma function P(a, x) = γ(a, x) / Γ(a).
///
/// Uses the series expansion when x < a + 1 and the continued fraction
/// representation (computing Q = 1 - P) otherwise.
pub fn gammainc(a: f64, x: f64) -> Result<f64> {
    check_gamma_args("gammainc", a, x)?;
    if x == 0.0 {
        return Ok(0.0);
    }
    if x.is_infinite() {
        return Ok(1.0);
    }

    if x < a + 1.0 {
        Ok(gammainc_series(a, x))
    } else {
        Ok(1.0 - gammainc_cf(a, x))
    }
}

/// Regularized upper incomplete gamma function Q(a, x) = 1 - P(a, x).
///
/// Evaluated directly from the continued fraction in the upper tail, so small
/// tail probabilities keep their relative precision instead of cancelling
/// against 1.
pub fn gammaincc(a: f64, x: f64) -> Result<f64> {
    check_gamma_args("gammaincc", a, x)?;
    if x == 0.0 {
        return Ok(1.0);
    }
    if x.is_infinite() {
        return Ok(0.0);
    }

    if x < a + 1.0 {
        Ok(1.0 - gammainc_series(a, x))
    } else {
        Ok(gammainc_cf(a, x))
    }
}

/// Series expansion for P(a, x).
fn gammainc_series(a: f64, x: f64) -> f64 {
    let max_iter = 500;
    let eps = 1e-15;
    let ln_prefix = a * x.ln() - x - ln_gamma(a);

    let mut sum = 1.0 / a;
    let mut term = 1.0 / a;

    for n in 1..=max_iter {
        term *= x / (a + n as f64);
        sum += term;
        if term.abs() < sum.abs() * eps {
            break;
        }
    }

    (sum * ln_prefix.exp()).min(1.0)
}

/// Continued fraction for Q(a, x) = 1 - P(a, x) via modified Lentz's method.
fn gammainc_cf(a: f64, x: f64) -> f64 {
    let max_iter = 500;
    let eps = 1e-15;
    let tiny = 1e-300_f64;
    let ln_prefix = a * x.ln() - x - ln_gamma(a);

    let mut b = x + 1.0 - a;
    let mut c = 1.0 / tiny;
    let mut d = 1.0 / b;
    let mut h = d;

    for i in 1..=max_iter {
        let an = -(i as f64) * (i as f64 - a);
        b += 2.0;
        d = an * d + b;
        if d.abs() < tiny {
            d = tiny;
        }
        c = b + an / c;
        if c.abs() < tiny {
            c = tiny;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;
        if (delta - 1.0).abs() < eps {
            break;
        }
    }

    (h * ln_prefix.exp()).clamp(0.0, 1.0)
}

/// Error function, via erf(x) = P(1/2, x²).
pub fn erf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    let p = gammainc(0.5, x * x).unwrap_or(1.0);
    if x < 0.0 {
        -p
    } else {
        p
    }
}

/// Complementary error function, via erfc(x) = Q(1/2, x²) for x ≥ 0.
///
/// Accurate far into the upper tail, where `1.0 - erf(x)` underflows to 0.
pub fn erfc(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    let q = gammaincc(0.5, x * x).unwrap_or(0.0);
    if x < 0.0 {
        2.0 - q
    } else {
        q
    }
}

// ── Distribution trait ─────────────────────────────────────────────────────

/// A probability distribution with basic statistical properties.
pub trait Distribution {
    /// Probability density (or mass) function at `x`.
    fn pdf(&self, x: f64) -> f64;

    /// Cumulative distribution function at `x`.
    fn cdf(&self, x: f64) -> f64;

    /// Survival function P(X > x) (default: `1 - cdf`).
    fn sf(&self, x: f64) -> f64 {
        1.0 - self.cdf(x)
    }

    /// Distribution mean.
    fn mean(&self) -> f64;

    /// Distribution variance.
    fn variance(&self) -> f64;

    /// Distribution standard deviation (default: sqrt of variance).
    fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }
}

// ── Normal distribution ────────────────────────────────────────────────────

/// Normal (Gaussian) distribution with parameters μ and σ.
#[derive(Debug, Clone, Copy)]
pub struct Normal {
    mu: f64,
    sigma: f64,
}

impl Normal {
    /// Create a new Normal distribution. `sigma` must be positive.
    pub fn new(mu: f64, sigma: f64) -> Result<Self> {
        if !(sigma > 0.0) {
            return Err(FourfoldError::InvalidInput(
                "Normal: sigma must be positive".into(),
            ));
        }
        Ok(Self { mu, sigma })
    }

    /// Standard normal distribution N(0, 1).
    pub fn standard() -> Self {
        Self {
            mu: 0.0,
            sigma: 1.0,
        }
    }

    /// Two-tailed p-value for a z-score: `2 · P(Z > |z|)`.
    pub fn two_tailed_p(&self, x: f64) -> f64 {
        let z = ((x - self.mu) / self.sigma).abs();
        (2.0 * Normal::standard().sf(z)).min(1.0)
    }
}

impl Distribution for Normal {
    fn pdf(&self, x: f64) -> f64 {
        let z = (x - self.mu) / self.sigma;
        (-0.5 * z * z).exp() / (self.sigma * (2.0 * PI).sqrt())
    }

    fn cdf(&self, x: f64) -> f64 {
        let z = (x - self.mu) / self.sigma;
        0.5 * erfc(-z / core::f64::consts::SQRT_2)
    }

    fn sf(&self, x: f64) -> f64 {
        let z = (x - self.mu) / self.sigma;
        0.5 * erfc(z / core::f64::consts::SQRT_2)
    }

    fn mean(&self) -> f64 {
        self.mu
    }

    fn variance(&self) -> f64 {
        self.sigma * self.sigma
    }
}

// ── Chi-squared distribution ──────────────────────────────────────────────

/// Chi-squared distribution with k degrees of freedom.
#[derive(Debug, Clone, Copy)]
pub struct ChiSquared {
    k: f64,
}

impl ChiSquared {
    /// Create a chi-squared distribution with `k` degrees of freedom.
    pub fn new(k: f64) -> Result<Self> {
        if !(k > 0.0) || k.is_infinite() {
            return Err(FourfoldError::InvalidInput(
                "ChiSquared: k must be positive and finite".into(),
            ));
        }
        Ok(Self { k })
    }

    /// Degrees of freedom.
    pub fn df(&self) -> f64 {
        self.k
    }
}

impl Distribution for ChiSquared {
    fn pdf(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return 0.0;
        }
        let half_k = self.k / 2.0;
        let ln_pdf = (half_k - 1.0) * x.ln() - x / 2.0 - half_k * 2.0_f64.ln() - ln_gamma(half_k);
        ln_pdf.exp()
    }

    fn cdf(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return 0.0;
        }
        gammainc(self.k / 2.0, x / 2.0).unwrap_or(0.0)
    }

    fn sf(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return 1.0;
        }
        gammaincc(self.k / 2.0, x / 2.0).unwrap_or(1.0)
    }

    fn mean(&self) -> f64 {
        self.k
    }

    fn variance(&self) -> f64 {
        2.0 * self.k
    }
}

// ── Hypergeometric distribution ───────────────────────────────────────────

/// Hypergeometric distribution: number of successes in `draws` draws without
/// replacement from a population of `total` containing `successes` successes.
#[derive(Debug, Clone, Copy)]
pub struct Hypergeometric {
    total: u64,
    successes: u64,
    draws: u64,
}

impl Hypergeometric {
    /// Create a hypergeometric distribution. Both `successes` and `draws`
    /// must not exceed `total`.
    pub fn new(total: u64, successes: u64, draws: u64) -> Result<Self> {
        if successes > total || draws > total {
            return Err(FourfoldError::InvalidInput(
                "Hypergeometric: successes and draws must be <= total".into(),
            ));
        }
        Ok(Self {
            total,
            successes,
            draws,
        })
    }

    /// Smallest and largest attainable number of successes.
    pub fn support(&self) -> (u64, u64) {
        let lo = (self.draws + self.successes).saturating_sub(self.total);
        let hi = self.draws.min(self.successes);
        (lo, hi)
    }

    /// Probability mass function P(X = k), computed in log-space.
    pub fn pmf(&self, k: u64) -> f64 {
        let (lo, hi) = self.support();
        if k < lo || k > hi {
            return 0.0;
        }
        self.ln_pmf(k).map(f64::exp).unwrap_or(0.0)
    }

    fn ln_pmf(&self, k: u64) -> Result<f64> {
        // P = C(K,k) * C(N-K, n-k) / C(N, n)
        Ok(ln_binomial(self.successes, k)?
            + ln_binomial(self.total - self.successes, self.draws - k)?
            - ln_binomial(self.total, self.draws)?)
    }

    /// Lower tail P(X <= k).
    pub fn lower_tail(&self, k: u64) -> f64 {
        let (lo, hi) = self.support();
        if k < lo {
            return 0.0;
        }
        let sum: f64 = (lo..=k.min(hi)).map(|i| self.pmf(i)).sum();
        sum.min(1.0)
    }

    /// Upper tail P(X >= k), summed directly rather than as `1 - cdf`.
    pub fn upper_tail(&self, k: u64) -> f64 {
        let (lo, hi) = self.support();
        if k > hi {
            return 0.0;
        }
        let sum: f64 = (k.max(lo)..=hi).map(|i| self.pmf(i)).sum();
        sum.min(1.0)
    }
}

impl Distribution for Hypergeometric {
    fn pdf(&self, x: f64) -> f64 {
        let k = x.round() as i64;
        if k < 0 || (x - k as f64).abs() > 1e-9 {
            return 0.0;
        }
        self.pmf(k as u64)
    }

    fn cdf(&self, x: f64) -> f64 {
        let k = x.floor();
        if k < 0.0 {
            return 0.0;
        }
        self.lower_tail(k as u64)
    }

    fn sf(&self, x: f64) -> f64 {
        let k = x.floor();
        if k < 0.0 {
            return 1.0;
        }
        self.upper_tail(k as u64 + 1)
    }

    fn mean(&self) -> f64 {
        self.draws as f64 * self.successes as f64 / self.total as f64
    }

    fn variance(&self) -> f64 {
        let n = self.total as f64;
        if n <= 1.0 {
            return 0.0;
        }
        let draws = self.draws as f64;
        let p = self.successes as f64 / n;
        draws * p * (1.0 - p) * (n - draws) / (n - 1.0)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-6;

    #[test]
    fn erf_zero() {
        assert!((erf(0.0)).abs() < TOL);
    }

    #[test]
    fn erf_one() {
        assert!((erf(1.0) - 0.8427007929).abs() < 1e-9);
    }

    #[test]
    fn erf_negative_symmetry() {
        assert!((erf(-0.5) + erf(0.5)).abs() < 1e-12);
    }

    #[test]
    fn erfc_complements_erf() {
        for &x in &[-2.0, -0.3, 0.0, 0.7, 1.5, 3.0] {
            assert!((erf(x) + erfc(x) - 1.0).abs() < 1e-12, "x={}", x);
        }
    }

    #[test]
    fn erfc_deep_tail() {
        // erfc(6) ≈ 2.15197e-17, lost entirely by 1 - erf(6)
        let v = erfc(6.0);
        assert!((v / 2.151973671249891e-17 - 1.0).abs() < 1e-6, "v={}", v);
    }

    #[test]
    fn ln_gamma_integers() {
        // Γ(n) = (n-1)! for positive integers
        assert!((ln_gamma(1.0) - 0.0).abs() < TOL); // 0! = 1
        assert!((ln_gamma(2.0) - 0.0).abs() < TOL); // 1! = 1
        assert!((ln_gamma(5.0) - (24.0_f64).ln()).abs() < TOL); // 4! = 24
        assert!((ln_gamma(7.0) - (720.0_f64).ln()).abs() < TOL); // 6! = 720
    }

    #[test]
    fn ln_gamma_half() {
        // Γ(0.5) = √π
        assert!((ln_gamma(0.5) - 0.5 * PI.ln()).abs() < 1e-10);
    }

    #[test]
    fn normal_standard_cdf() {
        let n = Normal::standard();
        assert!((n.cdf(0.0) - 0.5).abs() < 1e-12);
        assert!((n.cdf(1.0) - 0.8413447460685429).abs() < 1e-9);
        assert!((n.cdf(-1.0) - 0.15865525393145707).abs() < 1e-9);
        assert!((n.cdf(2.0) - 0.9772498680518208).abs() < 1e-9);
    }

    #[test]
    fn normal_sf_mirrors_cdf() {
        let n = Normal::standard();
        for &z in &[-1.5, 0.0, 0.4, 1.96, 3.5] {
            assert!((n.sf(z) - n.cdf(-z)).abs() < 1e-12);
        }
        // 1.96 is the two-sided 5% critical value
        assert!((n.two_tailed_p(1.96) - 0.04999579).abs() < 1e-7);
        assert!((n.two_tailed_p(-1.96) - n.two_tailed_p(1.96)).abs() < 1e-15);
    }

    #[test]
    fn normal_standard_pdf_at_zero() {
        let n = Normal::standard();
        let expected = 1.0 / (2.0 * PI).sqrt();
        assert!((n.pdf(0.0) - expected).abs() < TOL);
    }

    #[test]
    fn normal_invalid_sigma() {
        assert!(Normal::new(0.0, 0.0).is_err());
        assert!(Normal::new(0.0, -1.0).is_err());
        assert!(Normal::new(0.0, f64::NAN).is_err());
    }

    // ── gammainc tests ─────────────────────────────────────────────────

    #[test]
    fn gammainc_zero() {
        assert_eq!(gammainc(1.0, 0.0).unwrap(), 0.0);
        assert_eq!(gammaincc(1.0, 0.0).unwrap(), 1.0);
    }

    #[test]
    fn gammainc_exponential() {
        // P(1, x) = 1 - e^{-x} for exponential distribution
        let x: f64 = 2.0;
        let expected = 1.0 - (-x).exp();
        assert!((gammainc(1.0, x).unwrap() - expected).abs() < 1e-12);
        assert!((gammaincc(1.0, x).unwrap() - (-x).exp()).abs() < 1e-12);
    }

    #[test]
    fn gammainc_pair_sums_to_one() {
        for &(a, x) in &[(0.5, 0.1), (0.5, 2.6), (3.0, 1.0), (3.0, 10.0)] {
            let p = gammainc(a, x).unwrap();
            let q = gammaincc(a, x).unwrap();
            assert!((p + q - 1.0).abs() < 1e-12, "a={} x={}", a, x);
        }
    }

    #[test]
    fn gammainc_large_x() {
        // For large x, P(a, x) → 1
        assert!((gammainc(2.0, 50.0).unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(gammaincc(2.0, f64::INFINITY).unwrap(), 0.0);
    }

    #[test]
    fn gammainc_invalid() {
        assert!(gammainc(-1.0, 1.0).is_err());
        assert!(gammainc(1.0, -1.0).is_err());
        assert!(gammaincc(1.0, f64::NAN).is_err());
    }

    // ── Chi-squared tests ──────────────────────────────────────────────

    #[test]
    fn chi_squared_cdf_known_values() {
        let chi2 = ChiSquared::new(2.0).unwrap();
        // χ²(2) CDF at x: P = 1 - e^{-x/2}
        let x: f64 = 5.991;
        assert!((chi2.cdf(x) - (1.0 - (-x / 2.0).exp())).abs() < 1e-12);
    }

    #[test]
    fn chi_squared_sf_df1() {
        let chi2 = ChiSquared::new(1.0).unwrap();
        // χ²(1) at 3.841459 is the 5% critical value
        assert!((chi2.sf(3.841458820694124) - 0.05).abs() < 1e-9);
        assert_eq!(chi2.sf(0.0), 1.0);
    }

    #[test]
    fn chi_squared_mean_variance() {
        let chi2 = ChiSquared::new(5.0).unwrap();
        assert!((chi2.mean() - 5.0).abs() < TOL);
        assert!((chi2.variance() - 10.0).abs() < TOL);
    }

    #[test]
    fn chi_squared_cdf_at_zero() {
        let chi2 = ChiSquared::new(3.0).unwrap();
        assert_eq!(chi2.cdf(0.0), 0.0);
    }

    #[test]
    fn chi_squared_invalid() {
        assert!(ChiSquared::new(0.0).is_err());
        assert!(ChiSquared::new(-1.0).is_err());
        assert!(ChiSquared::new(f64::INFINITY).is_err());
    }

    // ── Hypergeometric tests ───────────────────────────────────────────

    #[test]
    fn hypergeometric_pmf_sums_to_one() {
        let h = Hypergeometric::new(20, 7, 12).unwrap();
        let (lo, hi) = h.support();
        let sum: f64 = (lo..=hi).map(|k| h.pmf(k)).sum();
        assert!((sum - 1.0).abs() < 1e-10);
    }

    #[test]
    fn hypergeometric_pmf_known() {
        // Lady tasting tea: N=8, K=4, n=4, P(X=4) = 1/70
        let h = Hypergeometric::new(8, 4, 4).unwrap();
        assert!((h.pmf(4) - 1.0 / 70.0).abs() < 1e-12);
        assert!((h.pmf(3) - 16.0 / 70.0).abs() < 1e-12);
        assert_eq!(h.pmf(5), 0.0);
    }

    #[test]
    fn hypergeometric_support() {
        let h = Hypergeometric::new(10, 7, 6).unwrap();
        assert_eq!(h.support(), (3, 6));
        assert_eq!(h.pmf(2), 0.0);
    }

    #[test]
    fn hypergeometric_tails() {
        let h = Hypergeometric::new(8, 4, 4).unwrap();
        assert!((h.upper_tail(3) - 17.0 / 70.0).abs() < 1e-12);
        assert!((h.lower_tail(1) - 17.0 / 70.0).abs() < 1e-12);
        assert!((h.cdf(4.0) - 1.0).abs() < 1e-12);
        assert!((h.sf(2.0) - h.upper_tail(3)).abs() < 1e-15);
        assert_eq!(h.upper_tail(5), 0.0);
    }

    #[test]
    fn hypergeometric_moments() {
        let h = Hypergeometric::new(50, 10, 5).unwrap();
        assert!((h.mean() - 1.0).abs() < TOL);
        // 5 · 0.2 · 0.8 · 45/49
        assert!((h.variance() - 0.8 * 45.0 / 49.0).abs() < TOL);
    }

    #[test]
    fn hypergeometric_invalid() {
        assert!(Hypergeometric::new(5, 6, 1).is_err());
        assert!(Hypergeometric::new(5, 1, 6).is_err());
    }
}
