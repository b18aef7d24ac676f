// fourfold CLI: 2×2 contingency analysis of the 1961 ascorbic acid trial
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use fourfold_core::{ObservedTable, TableLabels};
use fourfold_stats::{
    Alternative, AnalysisOptions, AnalysisReport, ChiSquaredCorrection, ContingencyAnalyzer,
    EffectOptions, ZeroCellPolicy, Z_95,
};

#[derive(Parser, Debug)]
#[command(name = "fourfold")]
#[command(version)]
#[command(
    about = "Chi-squared, Fisher exact, relative risk and odds ratio for the ascorbic acid trial",
    long_about = None
)]
struct Cli {
    /// Alternative hypothesis of Fisher's exact test (less, greater, two-sided)
    #[arg(long, value_name = "ALT", default_value = "less")]
    alternative: Alternative,

    /// Apply Yates' continuity correction to the chi-squared statistic
    #[arg(long)]
    yates: bool,

    /// Zero-cell handling for relative risk and odds ratio (fail-fast, haldane)
    #[arg(long, value_name = "POLICY", default_value = "fail-fast")]
    zero_cells: ZeroCellPolicy,

    /// Normal critical value for the confidence intervals
    #[arg(long, value_name = "Z", default_value_t = Z_95, value_parser = parse_z_critical)]
    z: f64,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn parse_z_critical(s: &str) -> std::result::Result<f64, String> {
    let z: f64 = s.parse().map_err(|e| format!("`{s}` is not a number: {e}"))?;
    if z > 0.0 && z.is_finite() {
        Ok(z)
    } else {
        Err(format!("must be positive and finite, got {z}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

impl Cli {
    fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            alternative: self.alternative,
            chi_squared_correction: if self.yates {
                ChiSquaredCorrection::Yates
            } else {
                ChiSquaredCorrection::None
            },
            effect: EffectOptions {
                z_critical: self.z,
                zero_cells: self.zero_cells,
            },
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn render(report: &AnalysisReport, format: Format) -> Result<String> {
    match format {
        Format::Text => Ok(report.to_string()),
        Format::Json => {
            serde_json::to_string_pretty(report).context("Failed to serialize report to JSON")
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let table = ObservedTable::ascorbic_acid_trial();
    let analyzer = ContingencyAnalyzer::new(cli.analysis_options())
        .context("Invalid analysis options")?
        .with_labels(TableLabels::ascorbic_acid_trial());
    info!(%table, n = table.total()?, "analyzing table");

    let report = analyzer.analyze(&table);
    let output = render(&report, cli.format)?;
    if cli.format == Format::Json {
        println!("{output}");
    } else {
        print!("{output}");
    }

    if report.is_complete() {
        Ok(ExitCode::SUCCESS)
    } else {
        for (statistic, error) in report.failures() {
            warn!(statistic, error, "analysis incomplete");
        }
        Ok(ExitCode::FAILURE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_match_reference_scenario() {
        let cli = Cli::try_parse_from(["fourfold"]).unwrap();
        assert_eq!(cli.analysis_options(), AnalysisOptions::default());
        assert_eq!(cli.format, Format::Text);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn flags_map_onto_options() {
        let cli = Cli::try_parse_from([
            "fourfold",
            "--alternative",
            "two-sided",
            "--yates",
            "--zero-cells",
            "haldane",
            "--z",
            "2.576",
            "--format",
            "json",
            "-vv",
        ])
        .unwrap();
        let opts = cli.analysis_options();
        assert_eq!(opts.alternative, Alternative::TwoSided);
        assert_eq!(opts.chi_squared_correction, ChiSquaredCorrection::Yates);
        assert_eq!(opts.effect.zero_cells, ZeroCellPolicy::HaldaneAnscombe);
        assert_eq!(opts.effect.z_critical, 2.576);
        assert_eq!(cli.format, Format::Json);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn unknown_alternative_is_rejected() {
        assert!(Cli::try_parse_from(["fourfold", "--alternative", "sideways"]).is_err());
    }

    #[test]
    fn bad_z_critical_is_a_usage_error() {
        for bad in ["--z=-1", "--z=0", "--z=nan", "--z=inf", "--z=wide"] {
            let err = Cli::try_parse_from(["fourfold", bad]).unwrap_err();
            assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation, "{bad}");
            assert_eq!(err.exit_code(), 2, "{bad}");
        }
        let cli = Cli::try_parse_from(["fourfold", "--z=2.576"]).unwrap();
        assert_eq!(cli.z, 2.576);
    }

    #[test]
    fn json_output_is_parseable() {
        let report = ContingencyAnalyzer::default().analyze(&ObservedTable::ascorbic_acid_trial());
        let json = render(&report, Format::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["fisher"]["computed"]["p_value"].as_f64().unwrap() < 0.05);
    }

    #[test]
    fn text_output_starts_with_expected_table() {
        let report = ContingencyAnalyzer::default()
            .with_labels(TableLabels::ascorbic_acid_trial())
            .analyze(&ObservedTable::ascorbic_acid_trial());
        let text = render(&report, Format::Text).unwrap();
        assert!(text.starts_with("Expected frequencies:\n  Ascorbic Acid Treatment, Cold Symptoms:"));
    }
}
