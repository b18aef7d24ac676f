//! End-to-end checks on the 1961 ascorbic acid trial (17, 31, 122, 109).

use fourfold_core::{ObservedTable, RiskTable, TableLabels};
use fourfold_stats::{
    chi_squared_p_value, chi_squared_statistic, expected_frequencies, fisher_exact, odds_ratio,
    relative_risk, Alternative, AnalysisOptions, ContingencyAnalyzer, EffectOptions, DF_2X2,
};

const TRIAL: ObservedTable = ObservedTable::ascorbic_acid_trial();

#[test]
fn chi_squared_against_fisher() {
    let exp = expected_frequencies(&TRIAL).unwrap();
    let chi2 = chi_squared_statistic(&TRIAL, &exp).unwrap();
    let p_chi = chi_squared_p_value(chi2, DF_2X2).unwrap();
    assert!((chi2 - 4.811).abs() < 0.01, "chi2={}", chi2);
    assert!((p_chi - 0.0283).abs() < 0.001, "p={}", p_chi);

    let fisher = fisher_exact(&TRIAL.transpose(), Alternative::Less).unwrap();
    assert!((fisher.p_value - 0.0213).abs() < 0.001, "p={}", fisher.p_value);

    // The normal approximation drifts from the exact test, but not by much
    let diff = (p_chi - fisher.p_value).abs();
    assert!(diff > 0.0 && diff < 0.01, "diff={}", diff);
}

#[test]
fn effect_sizes_show_reduced_risk() {
    let risk = RiskTable::from_observed(&TRIAL);
    assert_eq!(risk, RiskTable::new(17, 122, 31, 109));

    let rr = relative_risk(&risk, &EffectOptions::default()).unwrap();
    assert!((rr.estimate - 0.552).abs() < 0.005, "rr={}", rr.estimate);
    assert!(rr.p_value < 0.05);
    assert!(!rr.ci.contains(1.0));

    let or = odds_ratio(&risk, &EffectOptions::default()).unwrap();
    assert!((or.estimate - 0.489).abs() < 0.005, "or={}", or.estimate);
    assert!(or.ci.high < 1.0);
    assert!(or.p_value < 0.05);
}

#[test]
fn analyzer_reproduces_free_functions() {
    let analyzer = ContingencyAnalyzer::new(AnalysisOptions::default())
        .unwrap()
        .with_labels(TableLabels::ascorbic_acid_trial());
    let report = analyzer.analyze(&TRIAL);
    assert!(report.is_complete());

    let rr = relative_risk(&RiskTable::from_observed(&TRIAL), &EffectOptions::default()).unwrap();
    assert_eq!(report.relative_risk.value(), Some(&rr));
    assert_eq!(report.observed, TRIAL);
}

#[test]
fn expected_frequencies_are_idempotent() {
    let first = expected_frequencies(&TRIAL).unwrap();
    let second = expected_frequencies(&TRIAL).unwrap();
    assert_eq!(first, second);
    assert!((first.total() - TRIAL.total().unwrap() as f64).abs() < 1e-9);
}

#[cfg(feature = "serde")]
#[test]
fn report_serializes_to_json() {
    let report = ContingencyAnalyzer::default().analyze(&TRIAL);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["observed"]["a"], 17);
    assert_eq!(json["options"]["alternative"], "less");
    assert!(json["chi_squared"]["computed"]["p_value"].as_f64().unwrap() < 0.05);
    assert!(json["odds_ratio"]["computed"]["ci"]["high"].as_f64().unwrap() < 1.0);
}
