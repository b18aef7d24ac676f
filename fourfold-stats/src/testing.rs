//! Hypothesis testing on 2×2 contingency tables.
//!
//! Provides the Pearson chi-squared test of independence
//! ([`expected_frequencies`], [`chi_squared_statistic`],
//! [`chi_squared_p_value`], [`chi_squared_test`]) and Fisher's exact test
//! ([`fisher_exact`]).

use core::fmt;
use core::str::FromStr;

use fourfold_core::{
    Cell, ExpectedTable, FourfoldError, ObservedTable, Result, Scored, Summarizable,
};

use crate::distribution::{ChiSquared, Distribution, Hypergeometric};

/// Degrees of freedom of the chi-squared test on a 2×2 table.
pub const DF_2X2: f64 = 1.0;

/// Result of a hypothesis test.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TestResult {
    /// The test statistic (χ², etc.).
    pub statistic: f64,
    /// p-value of the test.
    pub p_value: f64,
    /// Degrees of freedom, if applicable.
    pub degrees_of_freedom: Option<f64>,
    /// Name of the test method.
    pub method: String,
}

impl Scored for TestResult {
    fn score(&self) -> f64 {
        self.p_value
    }
}

impl Summarizable for TestResult {
    fn summary(&self) -> String {
        match self.degrees_of_freedom {
            Some(df) => format!(
                "{}: statistic={:.4}, df={:.1}, p={:.6}",
                self.method, self.statistic, df, self.p_value,
            ),
            None => format!(
                "{}: statistic={:.4}, p={:.6}",
                self.method, self.statistic, self.p_value,
            ),
        }
    }
}

// ── Expected frequencies ───────────────────────────────────────────────────

/// Expected cell frequencies under independence of rows and columns.
///
/// `expected[i][j] = row_sum[i] × col_sum[j] / n`.
///
/// # Errors
///
/// Returns [`FourfoldError::DivideByZero`] if the table total is zero and
/// [`FourfoldError::InvalidInput`] if a margin overflows `u64`.
pub fn expected_frequencies(obs: &ObservedTable) -> Result<ExpectedTable> {
    let n = obs.total()?;
    if n == 0 {
        return Err(FourfoldError::DivideByZero(
            "expected_frequencies: table total is zero".into(),
        ));
    }

    let n = n as f64;
    let rows = obs.row_sums()?.map(|r| r as f64);
    let cols = obs.col_sums()?.map(|c| c as f64);

    Ok(ExpectedTable {
        a: rows[0] * cols[0] / n,
        b: rows[0] * cols[1] / n,
        c: rows[1] * cols[0] / n,
        d: rows[1] * cols[1] / n,
    })
}

// ── Chi-squared test of independence ──────────────────────────────────────

/// Continuity correction applied to the chi-squared statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ChiSquaredCorrection {
    /// Uncorrected Pearson statistic.
    #[default]
    None,
    /// Yates' continuity correction: `(|O - E| - 0.5)²`.
    Yates,
}

fn chi_squared_sum<F>(obs: &ObservedTable, exp: &ExpectedTable, name: &str, term: F) -> Result<f64>
where
    F: Fn(f64) -> f64,
{
    let mut chi2 = 0.0;
    for cell in Cell::ALL {
        let expected = exp.get(cell);
        if expected == 0.0 {
            return Err(FourfoldError::DivideByZero(format!(
                "{name}: expected frequency of cell {cell} is zero"
            )));
        }
        if !(expected > 0.0) || expected.is_infinite() {
            return Err(FourfoldError::Domain(format!(
                "{name}: expected frequency of cell {cell} is {expected}"
            )));
        }
        let diff = (obs.get(cell) as f64 - expected).abs();
        chi2 += term(diff) / expected;
    }
    Ok(chi2)
}

/// Pearson's chi-squared statistic: χ² = Σ |O - E|² / E over the four cells.
///
/// # Errors
///
/// Returns [`FourfoldError::DivideByZero`] if any expected frequency is zero.
pub fn chi_squared_statistic(obs: &ObservedTable, exp: &ExpectedTable) -> Result<f64> {
    chi_squared_sum(obs, exp, "chi_squared_statistic", |diff| diff * diff)
}

/// Yates-corrected chi-squared statistic: χ² = Σ (|O - E| - 0.5)² / E.
///
/// The reduced deviation is clamped at zero so cells already within 0.5 of
/// their expectation contribute nothing.
pub fn chi_squared_statistic_yates(obs: &ObservedTable, exp: &ExpectedTable) -> Result<f64> {
    chi_squared_sum(obs, exp, "chi_squared_statistic_yates", |diff| {
        let reduced = (diff - 0.5).max(0.0);
        reduced * reduced
    })
}

/// Upper-tail p-value of a chi-squared statistic: `1 - CDF(statistic; df)`.
///
/// Evaluated as the regularized upper incomplete gamma function
/// `Q(df/2, statistic/2)`.
///
/// # Errors
///
/// Returns [`FourfoldError::Domain`] for a negative or NaN statistic and
/// [`FourfoldError::InvalidInput`] for non-positive `df`.
pub fn chi_squared_p_value(statistic: f64, df: f64) -> Result<f64> {
    if !(statistic >= 0.0) {
        return Err(FourfoldError::Domain(format!(
            "chi_squared_p_value: statistic must be non-negative, got {statistic}"
        )));
    }
    let dist = ChiSquared::new(df)?;
    Ok(dist.sf(statistic).clamp(0.0, 1.0))
}

/// Chi-squared test of independence for a 2×2 table (1 degree of freedom).
pub fn chi_squared_test(obs: &ObservedTable, correction: ChiSquaredCorrection) -> Result<TestResult> {
    let exp = expected_frequencies(obs)?;
    let (statistic, method) = match correction {
        ChiSquaredCorrection::None => (
            chi_squared_statistic(obs, &exp)?,
            "Chi-squared test of independence",
        ),
        ChiSquaredCorrection::Yates => (
            chi_squared_statistic_yates(obs, &exp)?,
            "Chi-squared test of independence (Yates)",
        ),
    };
    let p_value = chi_squared_p_value(statistic, DF_2X2)?;

    Ok(TestResult {
        statistic,
        p_value,
        degrees_of_freedom: Some(DF_2X2),
        method: method.into(),
    })
}

// ── Fisher's exact test (2×2) ─────────────────────────────────────────────

/// Alternative hypothesis of an exact test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Alternative {
    /// The true odds ratio is less than 1.
    Less,
    /// The true odds ratio is greater than 1.
    Greater,
    /// The true odds ratio differs from 1.
    #[default]
    TwoSided,
}

impl fmt::Display for Alternative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Alternative::Less => "less",
            Alternative::Greater => "greater",
            Alternative::TwoSided => "two-sided",
        })
    }
}

impl FromStr for Alternative {
    type Err = FourfoldError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "less" => Ok(Alternative::Less),
            "greater" => Ok(Alternative::Greater),
            "two-sided" | "two_sided" | "twosided" => Ok(Alternative::TwoSided),
            other => Err(FourfoldError::InvalidInput(format!(
                "unknown alternative '{other}' (expected less, greater or two-sided)"
            ))),
        }
    }
}

/// Result of Fisher's exact test.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FisherResult {
    /// Sample cross-product ratio `(a·d) / (b·c)`.
    pub odds_ratio: f64,
    /// Exact p-value under the chosen alternative.
    pub p_value: f64,
    /// Alternative hypothesis the p-value refers to.
    pub alternative: Alternative,
}

impl Scored for FisherResult {
    fn score(&self) -> f64 {
        self.p_value
    }
}

impl Summarizable for FisherResult {
    fn summary(&self) -> String {
        format!(
            "Fisher's exact test ({}): odds ratio={:.4}, p={:.6}",
            self.alternative, self.odds_ratio, self.p_value,
        )
    }
}

/// Relative tolerance when comparing table probabilities in the two-sided test.
const FISHER_REL_TOL: f64 = 1e-7;

/// Fisher's exact test for a 2×2 contingency table.
///
/// The table is laid out as:
///
/// ```text
///           Column 1  Column 2
/// Row 1        a         b
/// Row 2        c         d
/// ```
///
/// With all margins fixed, `a` follows a hypergeometric distribution. The
/// p-value is `P(X <= a)` for [`Alternative::Less`], `P(X >= a)` for
/// [`Alternative::Greater`], and the total probability of all tables no more
/// likely than the observed one for [`Alternative::TwoSided`].
///
/// The odds ratio is the sample cross-product `(a·d) / (b·c)`; it is `+∞`
/// when `b·c = 0`. A table with an empty row or column carries no
/// information: the odds ratio is NaN and the p-value 1.
///
/// Every table in the hypergeometric support is evaluated, so the cost grows
/// linearly with the smaller margin. Counts in the millions are fine; counts
/// in the billions are better served by [`chi_squared_test`].
///
/// # Errors
///
/// Returns [`FourfoldError::InvalidInput`] for an all-zero table or one whose
/// total overflows `u64`.
pub fn fisher_exact(table: &ObservedTable, alternative: Alternative) -> Result<FisherResult> {
    let n = table.total()?;
    if n == 0 {
        return Err(FourfoldError::InvalidInput("fisher_exact: table is all zeros".into()));
    }

    let rows = table.row_sums()?;
    let cols = table.col_sums()?;
    if rows.contains(&0) || cols.contains(&0) {
        return Ok(FisherResult {
            odds_ratio: f64::NAN,
            p_value: 1.0,
            alternative,
        });
    }

    let odds_ratio = sample_odds_ratio(table);
    let dist = Hypergeometric::new(n, cols[0], rows[0])?;
    let a = table.a;

    let p_value = match alternative {
        Alternative::Less => dist.lower_tail(a),
        Alternative::Greater => dist.upper_tail(a),
        Alternative::TwoSided => {
            let p_observed = dist.pmf(a);
            let threshold = p_observed * (1.0 + FISHER_REL_TOL);
            let (lo, hi) = dist.support();
            (lo..=hi)
                .map(|k| dist.pmf(k))
                .filter(|&p_k| p_k <= threshold)
                .sum::<f64>()
        }
    };

    Ok(FisherResult {
        odds_ratio,
        p_value: p_value.clamp(0.0, 1.0),
        alternative,
    })
}

fn sample_odds_ratio(table: &ObservedTable) -> f64 {
    let num = table.a as f64 * table.d as f64;
    let denom = table.b as f64 * table.c as f64;
    if denom == 0.0 {
        f64::INFINITY
    } else {
        num / denom
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────
