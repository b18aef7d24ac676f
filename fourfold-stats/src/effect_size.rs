//! Effect size measures for 2×2 exposure × outcome tables.
//!
//! Provides the two ratio measures used in epidemiology, each with a
//! log-scale Wald confidence interval and z-test:
//! - [`relative_risk`] — risk ratio between exposed and unexposed groups
//! - [`odds_ratio`] — cross-product ratio of the odds of disease
//!
//! Both operate on a [`RiskTable`]:
//!
//! ```text
//!              Disease   No disease
//! Exposed         a          b
//! Unexposed       c          d
//! ```

use core::fmt;
use core::str::FromStr;

use fourfold_core::{FourfoldError, Result, RiskTable, Scored, Summarizable};
use tracing::warn;

use crate::distribution::Normal;

/// Two-sided 95% critical value of the standard normal distribution.
pub const Z_95: f64 = 1.96;

/// Which ratio an [`EffectEstimate`] measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum EffectMeasure {
    RelativeRisk,
    OddsRatio,
}

impl fmt::Display for EffectMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EffectMeasure::RelativeRisk => "Relative Risk Ratio",
            EffectMeasure::OddsRatio => "Odds Ratio",
        })
    }
}

/// How zero cells are handled before computing a ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ZeroCellPolicy {
    /// Report the arithmetic failure.
    #[default]
    FailFast,
    /// Add 0.5 to every cell when any cell is zero (Haldane-Anscombe).
    HaldaneAnscombe,
}

impl fmt::Display for ZeroCellPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ZeroCellPolicy::FailFast => "fail-fast",
            ZeroCellPolicy::HaldaneAnscombe => "haldane",
        })
    }
}

impl FromStr for ZeroCellPolicy {
    type Err = FourfoldError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "fail-fast" | "fail_fast" | "failfast" => Ok(ZeroCellPolicy::FailFast),
            "haldane" | "haldane-anscombe" | "haldane_anscombe" => {
                Ok(ZeroCellPolicy::HaldaneAnscombe)
            }
            other => Err(FourfoldError::InvalidInput(format!(
                "unknown zero-cell policy '{other}' (expected fail-fast or haldane)"
            ))),
        }
    }
}

/// Options shared by [`relative_risk`] and [`odds_ratio`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectOptions {
    /// Critical value of the standard normal used for the confidence interval.
    pub z_critical: f64,
    /// Treatment of tables containing a zero cell.
    pub zero_cells: ZeroCellPolicy,
}

impl Default for EffectOptions {
    fn default() -> Self {
        Self {
            z_critical: Z_95,
            zero_cells: ZeroCellPolicy::FailFast,
        }
    }
}

impl EffectOptions {
    /// Check that the critical value is positive and finite.
    pub fn validate(&self) -> Result<()> {
        if !(self.z_critical > 0.0) || self.z_critical.is_infinite() {
            return Err(FourfoldError::InvalidInput(format!(
                "z_critical must be positive and finite, got {}",
                self.z_critical
            )));
        }
        Ok(())
    }
}

/// Closed interval `[low, high]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConfidenceInterval {
    pub low: f64,
    pub high: f64,
}

impl ConfidenceInterval {
    /// Whether `x` lies inside the interval (bounds included).
    pub fn contains(&self, x: f64) -> bool {
        self.low <= x && x <= self.high
    }
}

impl fmt::Display for ConfidenceInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.low, self.high)
    }
}

/// A ratio estimate with its log-scale Wald inference.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectEstimate {
    /// Which ratio this is.
    pub measure: EffectMeasure,
    /// Point estimate of the ratio.
    pub estimate: f64,
    /// Standard error of `ln(estimate)`.
    pub std_error: f64,
    /// Confidence interval `exp(ln(estimate) ∓ z·se)`.
    pub ci: ConfidenceInterval,
    /// Standard normal deviate `ln(estimate) / se`.
    pub z_score: f64,
    /// Two-tailed p-value of the z-test against a ratio of 1.
    pub p_value: f64,
    /// Whether the Haldane-Anscombe correction was applied.
    pub corrected: bool,
}

impl Scored for EffectEstimate {
    fn score(&self) -> f64 {
        self.p_value
    }
}

impl Summarizable for EffectEstimate {
    fn summary(&self) -> String {
        format!(
            "{}: estimate={:.4}, CI=[{:.4}, {:.4}], z={:.4}, p={:.6}",
            self.measure, self.estimate, self.ci.low, self.ci.high, self.z_score, self.p_value,
        )
    }
}

/// Cells as floats, with the zero-cell policy applied.
fn prepared_cells(table: &RiskTable, options: &EffectOptions, name: &str) -> Result<([f64; 4], bool)> {
    options.validate()?;
    let cells = table.cells().map(|x| x as f64);
    if table.has_zero_cell() && options.zero_cells == ZeroCellPolicy::HaldaneAnscombe {
        warn!(measure = name, "zero cell in table, applying Haldane-Anscombe correction");
        return Ok((cells.map(|x| x + 0.5), true));
    }
    Ok((cells, false))
}

fn log_scale_inference(
    measure: EffectMeasure,
    estimate: f64,
    std_error: f64,
    z_critical: f64,
    corrected: bool,
) -> EffectEstimate {
    let ln_estimate = estimate.ln();
    let ci = ConfidenceInterval {
        low: (ln_estimate - z_critical * std_error).exp(),
        high: (ln_estimate + z_critical * std_error).exp(),
    };
    let z_score = ln_estimate / std_error;
    let p_value = Normal::standard().two_tailed_p(z_score);

    EffectEstimate {
        measure,
        estimate,
        std_error,
        ci,
        z_score,
        p_value,
        corrected,
    }
}

/// Relative risk (risk ratio) with a 95% confidence interval and z-test.
///
/// RR = [a/(a+b)] / [c/(c+d)], se(ln RR) = √(1/a + 1/c − 1/(a+b) − 1/(c+d)).
/// A value of 1.0 means no difference in risk.
///
/// # Errors
///
/// Without a zero-cell correction: [`FourfoldError::DivideByZero`] if a
/// group is empty, the unexposed risk is zero, or the standard error
/// vanishes; [`FourfoldError::Domain`] if `a = 0` (log of zero).
pub fn relative_risk(table: &RiskTable, options: &EffectOptions) -> Result<EffectEstimate> {
    let ([a, b, c, d], corrected) = prepared_cells(table, options, "relative_risk")?;

    let exposed = a + b;
    let unexposed = c + d;
    if exposed == 0.0 || unexposed == 0.0 {
        return Err(FourfoldError::DivideByZero(
            "relative_risk: group total is zero".into(),
        ));
    }
    if c == 0.0 {
        return Err(FourfoldError::DivideByZero(
            "relative_risk: unexposed risk is zero".into(),
        ));
    }
    if a == 0.0 {
        return Err(FourfoldError::Domain(
            "relative_risk: exposed risk is zero, ln(RR) is undefined".into(),
        ));
    }

    let rr = (a / exposed) / (c / unexposed);
    // 1/a − 1/(a+b) = b / (a(a+b)), exact zero when b = 0
    let variance = b / (a * exposed) + d / (c * unexposed);
    let se = variance.sqrt();
    if se == 0.0 {
        return Err(FourfoldError::DivideByZero(
            "relative_risk: standard error of ln(RR) is zero".into(),
        ));
    }

    Ok(log_scale_inference(
        EffectMeasure::RelativeRisk,
        rr,
        se,
        options.z_critical,
        corrected,
    ))
}

/// Odds ratio with a 95% confidence interval and z-test.
///
/// OR = (a × d) / (b × c), se(ln OR) = √(1/a + 1/b + 1/c + 1/d).
/// A value of 1.0 means no association.
///
/// # Errors
///
/// Without a zero-cell correction, [`FourfoldError::DivideByZero`] if any
/// cell is zero.
pub fn odds_ratio(table: &RiskTable, options: &EffectOptions) -> Result<EffectEstimate> {
    let ([a, b, c, d], corrected) = prepared_cells(table, options, "odds_ratio")?;

    if let Some(pos) = [a, b, c, d].iter().position(|&x| x == 0.0) {
        return Err(FourfoldError::DivideByZero(format!(
            "odds_ratio: cell {} is zero",
            ["a", "b", "c", "d"][pos]
        )));
    }

    let odds = (a * d) / (b * c);
    let se = (1.0 / a + 1.0 / b + 1.0 / c + 1.0 / d).sqrt();

    Ok(log_scale_inference(
        EffectMeasure::OddsRatio,
        odds,
        se,
        options.z_critical,
        corrected,
    ))
}
