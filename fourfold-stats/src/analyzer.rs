//! The 2×2 analysis pipeline.
//!
//! [`ContingencyAnalyzer`] runs every statistic on an [`ObservedTable`]
//! independently and collects the outcomes in an [`AnalysisReport`]. A
//! statistic that fails (zero cell, empty margin) is recorded as
//! [`StatOutcome::Failed`] without affecting the others.

use core::fmt;

use fourfold_core::{Cell, ExpectedTable, ObservedTable, Result, RiskTable, TableLabels};
use tracing::{debug, debug_span, warn};

use crate::distribution::Normal;
use crate::effect_size::{self, EffectEstimate, EffectOptions, ZeroCellPolicy};
use crate::testing::{self, Alternative, ChiSquaredCorrection, FisherResult, TestResult, DF_2X2};

/// Parameters of an analysis run. The default reproduces the reference
/// scenario: uncorrected chi-squared, one-sided ("less") Fisher test,
/// 95% intervals, and no zero-cell correction.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalysisOptions {
    /// Alternative hypothesis of Fisher's exact test.
    pub alternative: Alternative,
    /// Continuity correction of the chi-squared statistic.
    pub chi_squared_correction: ChiSquaredCorrection,
    /// Interval width and zero-cell handling of the effect sizes.
    pub effect: EffectOptions,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            alternative: Alternative::Less,
            chi_squared_correction: ChiSquaredCorrection::None,
            effect: EffectOptions::default(),
        }
    }
}

impl AnalysisOptions {
    /// Check the effect-size options (see [`EffectOptions::validate`]).
    pub fn validate(&self) -> Result<()> {
        self.effect.validate()
    }
}

/// Outcome of one statistic in a report.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StatOutcome<T> {
    Computed(T),
    /// The error message of the failed computation.
    Failed(String),
}

impl<T> StatOutcome<T> {
    fn record(name: &str, result: Result<T>) -> Self {
        match result {
            Ok(value) => StatOutcome::Computed(value),
            Err(e) => {
                warn!(statistic = name, error = %e, "statistic could not be computed");
                StatOutcome::Failed(e.to_string())
            }
        }
    }

    /// The computed value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            StatOutcome::Computed(v) => Some(v),
            StatOutcome::Failed(_) => None,
        }
    }

    /// The error message, if the computation failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            StatOutcome::Computed(_) => None,
            StatOutcome::Failed(e) => Some(e),
        }
    }

    /// Whether the statistic was computed.
    pub fn is_computed(&self) -> bool {
        matches!(self, StatOutcome::Computed(_))
    }
}

/// Every quantity derived from one observed table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalysisReport {
    pub observed: ObservedTable,
    pub labels: TableLabels,
    pub options: AnalysisOptions,
    pub expected: StatOutcome<ExpectedTable>,
    pub chi_squared: StatOutcome<TestResult>,
    pub fisher: StatOutcome<FisherResult>,
    /// `|p_chi² − p_Fisher|`.
    pub p_value_difference: StatOutcome<f64>,
    pub relative_risk: StatOutcome<EffectEstimate>,
    pub odds_ratio: StatOutcome<EffectEstimate>,
}

impl AnalysisReport {
    /// Whether every statistic was computed.
    pub fn is_complete(&self) -> bool {
        self.failures().is_empty()
    }

    /// `(statistic, error)` pairs for every statistic that failed.
    pub fn failures(&self) -> Vec<(&'static str, &str)> {
        [
            ("expected frequencies", self.expected.error()),
            ("chi-squared", self.chi_squared.error()),
            ("fisher exact", self.fisher.error()),
            ("p-value difference", self.p_value_difference.error()),
            ("relative risk", self.relative_risk.error()),
            ("odds ratio", self.odds_ratio.error()),
        ]
        .into_iter()
        .filter_map(|(name, err)| err.map(|e| (name, e)))
        .collect()
    }
}

/// Runs the chi-squared, Fisher, relative-risk and odds-ratio analyses of a
/// 2×2 table.
///
/// The observed table is read as outcome rows × group columns: row 1 is the
/// diseased outcome and column 1 the exposed group. Fisher's test is applied
/// with groups as rows (`[[a, c], [b, d]]`), and the effect sizes use the
/// [`RiskTable`] relabeling.
#[derive(Debug, Clone, Default)]
pub struct ContingencyAnalyzer {
    options: AnalysisOptions,
    labels: TableLabels,
}

impl ContingencyAnalyzer {
    /// Create an analyzer, rejecting invalid options up front.
    pub fn new(options: AnalysisOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            labels: TableLabels::default(),
        })
    }

    /// Use `labels` when naming table cells in the report.
    pub fn with_labels(mut self, labels: TableLabels) -> Self {
        self.labels = labels;
        self
    }

    /// Options this analyzer runs with.
    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Labels used to name table cells.
    pub fn labels(&self) -> &TableLabels {
        &self.labels
    }

    /// Expected frequencies of `obs` under independence.
    pub fn expected_frequencies(&self, obs: &ObservedTable) -> Result<ExpectedTable> {
        testing::expected_frequencies(obs)
    }

    /// Chi-squared statistic, with the configured continuity correction.
    pub fn chi_squared_statistic(&self, obs: &ObservedTable, exp: &ExpectedTable) -> Result<f64> {
        match self.options.chi_squared_correction {
            ChiSquaredCorrection::None => testing::chi_squared_statistic(obs, exp),
            ChiSquaredCorrection::Yates => testing::chi_squared_statistic_yates(obs, exp),
        }
    }

    /// Upper-tail p-value of `statistic` on one degree of freedom.
    pub fn chi_squared_p_value(&self, statistic: f64) -> Result<f64> {
        testing::chi_squared_p_value(statistic, DF_2X2)
    }

    /// Fisher's exact test with groups as rows.
    pub fn fisher_exact(&self, obs: &ObservedTable) -> Result<FisherResult> {
        testing::fisher_exact(&obs.transpose(), self.options.alternative)
    }

    /// Relative risk of the exposed (column 1) group.
    pub fn relative_risk(&self, obs: &ObservedTable) -> Result<EffectEstimate> {
        effect_size::relative_risk(&RiskTable::from_observed(obs), &self.options.effect)
    }

    /// Odds ratio of the exposed (column 1) group.
    pub fn odds_ratio(&self, obs: &ObservedTable) -> Result<EffectEstimate> {
        effect_size::odds_ratio(&RiskTable::from_observed(obs), &self.options.effect)
    }

    /// Run every statistic on `obs`.
    pub fn analyze(&self, obs: &ObservedTable) -> AnalysisReport {
        let _span = debug_span!("analyze", table = %obs).entered();

        let expected = StatOutcome::record("expected frequencies", self.expected_frequencies(obs));
        if let Some(exp) = expected.value() {
            debug!(a = exp.a, b = exp.b, c = exp.c, d = exp.d, "expected frequencies");
        }

        let chi_squared = StatOutcome::record("chi-squared", self.chi_squared_test(obs));
        if let Some(chi) = chi_squared.value() {
            debug!(statistic = chi.statistic, p_value = chi.p_value, "chi-squared test");
        }

        let fisher = StatOutcome::record("fisher exact", self.fisher_exact(obs));
        if let Some(f) = fisher.value() {
            debug!(odds_ratio = f.odds_ratio, p_value = f.p_value, alternative = %f.alternative, "fisher exact test");
        }

        let p_value_difference = match (chi_squared.value(), fisher.value()) {
            (Some(chi), Some(f)) => StatOutcome::Computed((chi.p_value - f.p_value).abs()),
            _ => StatOutcome::Failed("requires both chi-squared and Fisher p-values".into()),
        };

        let relative_risk = StatOutcome::record("relative risk", self.relative_risk(obs));
        let odds_ratio = StatOutcome::record("odds ratio", self.odds_ratio(obs));
        for estimate in [relative_risk.value(), odds_ratio.value()].into_iter().flatten() {
            debug!(
                measure = %estimate.measure,
                estimate = estimate.estimate,
                low = estimate.ci.low,
                high = estimate.ci.high,
                p_value = estimate.p_value,
                "effect size"
            );
        }

        AnalysisReport {
            observed: *obs,
            labels: self.labels.clone(),
            options: self.options,
            expected,
            chi_squared,
            fisher,
            p_value_difference,
            relative_risk,
            odds_ratio,
        }
    }

    fn chi_squared_test(&self, obs: &ObservedTable) -> Result<TestResult> {
        testing::chi_squared_test(obs, self.options.chi_squared_correction)
    }
}

// ── Text rendering ─────────────────────────────────────────────────────────

fn write_line<T, F>(f: &mut fmt::Formatter<'_>, label: &str, outcome: &StatOutcome<T>, show: F) -> fmt::Result
where
    F: Fn(&T) -> String,
{
    match outcome {
        StatOutcome::Computed(v) => writeln!(f, "{label}: {}", show(v)),
        StatOutcome::Failed(e) => writeln!(f, "{label}: undefined ({e})"),
    }
}

fn write_effect(
    f: &mut fmt::Formatter<'_>,
    outcome: &StatOutcome<EffectEstimate>,
    name: &str,
    ci_label: &str,
) -> fmt::Result {
    write_line(f, name, outcome, |e| e.estimate.to_string())?;
    write_line(f, ci_label, outcome, |e| e.ci.to_string())?;
    write_line(f, &format!("{name} p-value"), outcome, |e| e.p_value.to_string())
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.expected {
            StatOutcome::Computed(exp) => {
                writeln!(f, "Expected frequencies:")?;
                for cell in Cell::ALL {
                    writeln!(f, "  {}: {}", self.labels.cell_label(cell), exp.get(cell))?;
                }
            }
            StatOutcome::Failed(e) => writeln!(f, "Expected frequencies: undefined ({e})")?,
        }

        write_line(f, "Chi-squared value", &self.chi_squared, |t| t.statistic.to_string())?;
        write_line(f, "Chi-squared p-value", &self.chi_squared, |t| t.p_value.to_string())?;
        write_line(
            f,
            &format!("Fisher's exact test p-value ({})", self.options.alternative),
            &self.fisher,
            |r| r.p_value.to_string(),
        )?;
        write_line(
            f,
            "Difference between chi-squared and Fisher p-values",
            &self.p_value_difference,
            |d| d.to_string(),
        )?;

        let level = 100.0 * (1.0 - Normal::standard().two_tailed_p(self.options.effect.z_critical));
        let ci_label = format!("{level:.0}% Confidence Interval");
        write_effect(f, &self.relative_risk, "Relative Risk Ratio", &ci_label)?;
        write_effect(f, &self.odds_ratio, "Odds Ratio", &ci_label)?;

        if self.options.effect.zero_cells == ZeroCellPolicy::HaldaneAnscombe {
            let corrected = [self.relative_risk.value(), self.odds_ratio.value()]
                .into_iter()
                .flatten()
                .any(|e| e.corrected);
            if corrected {
                writeln!(f, "Note: Haldane-Anscombe correction applied (+0.5 to every cell)")?;
            }
        }
        Ok(())
    }
}
