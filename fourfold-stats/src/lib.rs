//! Statistical analysis of 2×2 contingency tables.
//!
//! - **Distributions** — Normal, chi-squared and hypergeometric, with the
//!   incomplete gamma and error functions behind their tails
//! - **Hypothesis testing** — Pearson chi-squared (optionally Yates-corrected)
//!   and Fisher's exact test
//! - **Effect sizes** — Relative risk and odds ratio with Wald intervals
//! - **Analyzer** — The full pipeline from observed counts to a report
//!
//! # Quick start
//!
//! ```
//! use fourfold_core::ObservedTable;
//! use fourfold_stats::{AnalysisOptions, ContingencyAnalyzer};
//!
//! let analyzer = ContingencyAnalyzer::new(AnalysisOptions::default()).unwrap();
//! let report = analyzer.analyze(&ObservedTable::ascorbic_acid_trial());
//! assert!(report.is_complete());
//! ```

pub mod analyzer;
pub mod combinatorics;
pub mod distribution;
pub mod effect_size;
pub mod testing;

pub use analyzer::{AnalysisOptions, AnalysisReport, ContingencyAnalyzer, StatOutcome};
pub use distribution::{ChiSquared, Distribution, Hypergeometric, Normal};
pub use effect_size::{
    odds_ratio, relative_risk, ConfidenceInterval, EffectEstimate, EffectMeasure, EffectOptions,
    ZeroCellPolicy, Z_95,
};
pub use testing::{
    chi_squared_p_value, chi_squared_statistic, chi_squared_statistic_yates, chi_squared_test,
    expected_frequencies, fisher_exact, Alternative, ChiSquaredCorrection, FisherResult,
    TestResult, DF_2X2,
};
