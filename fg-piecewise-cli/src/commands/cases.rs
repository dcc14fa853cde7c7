use std::{io, io::Write, path::PathBuf};

use anyhow::{bail, Result};
use clap::{
    builder::{PossibleValuesParser, TypedValueParser as _},
    Parser,
};
use log::{info, warn};
use piecewise::align::{
    chain::validate_anchors,
    io::{read_cases, ChainCase},
};

use super::{
    command::{Command, ValueEnum},
    report::{write_case, write_summary, CaseReport, ReportFormat},
    scoring::ScoringArgs,
};

/// Aligns every anchor chain in a JSON file of cases and reports whether each succeeded.
///
/// A case passes when its anchors are valid, the chain aligns, the resulting alignment is
/// self-consistent, and the score and CIGAR match the case's `expected_score` and
/// `expected_cigar` when given.  The command fails if any case fails.
#[derive(Parser, Debug, Clone)]
#[clap(term_width = 0)]
pub struct Cases {
    /// The path to the JSON file of cases (may be gzipped), or '-' for standard input.
    #[clap(long, short = 'i', display_order = 1)]
    input: PathBuf,

    #[clap(flatten)]
    scoring: ScoringArgs,

    /// Show each alignment as reference, match and query rows (text format only).
    #[clap(long, default_value = "false", display_order = 2)]
    show_alignment: bool,

    /// The format of the report.
    #[clap(
        long,
        value_parser = PossibleValuesParser::new(ReportFormat::possible_values())
            .try_map(|s| s.parse::<ReportFormat>()),
        default_value_t = ReportFormat::Text,
        ignore_case = true,
        display_order = 3
    )]
    format: ReportFormat,
}

/// Aligns a single case with the given scoring options.
pub fn run_case(case: &ChainCase, scoring: &ScoringArgs) -> CaseReport {
    let mut report = CaseReport {
        name: case.name().clone(),
        passed: false,
        alignment: None,
        failures: Vec::new(),
    };
    let query = case.query_bytes();
    let reference = case.reference_bytes();

    if let Err(err) = validate_anchors(query, reference, case.anchors(), *case.k()) {
        report.failures.push(format!("Invalid input: {}", err));
        return report;
    }
    let aligned = scoring
        .builder()
        .kmer_size(*case.k())
        .padding(*case.padding())
        .build_chain_aligner()
        .and_then(|mut aligner| Ok(aligner.align(query, reference, case.anchors())?));
    let alignment = match aligned {
        Ok(alignment) => alignment,
        Err(err) => {
            report.failures.push(format!("Alignment failed: {:#}", err));
            return report;
        }
    };

    if let Err(err) = alignment.validate(query.len(), reference.len()) {
        report.failures.push(format!("Invalid alignment result: {:#}", err));
    }
    if let Some(expected) = case.expected_score() {
        if *expected != alignment.score {
            report
                .failures
                .push(format!("Expected score {}, found {}", expected, alignment.score));
        }
    }
    if let Some(expected) = case.expected_cigar() {
        if *expected != alignment.cigar() {
            report
                .failures
                .push(format!("Expected CIGAR {}, found {}", expected, alignment.cigar()));
        }
    }
    report.passed = report.failures.is_empty();
    report.alignment = Some(alignment);
    report
}

impl Command for Cases {
    fn execute(&self) -> Result<()> {
        let cases = read_cases(&self.input)?;
        let reports = cases
            .iter()
            .map(|case| run_case(case, &self.scoring))
            .collect::<Vec<_>>();

        let mut stdout = io::stdout().lock();
        match self.format {
            ReportFormat::Text => {
                for (index, (case, report)) in cases.iter().zip(&reports).enumerate() {
                    write_case(&mut stdout, index, case, report, self.show_alignment)?;
                }
                write_summary(&mut stdout, &reports)?;
            }
            ReportFormat::Json => {
                serde_json::to_writer_pretty(&mut stdout, &reports)?;
                writeln!(stdout)?;
            }
        }
        stdout.flush()?;

        let failed = reports.iter().filter(|report| !report.passed).count();
        for report in reports.iter().filter(|report| !report.passed) {
            warn!("Case '{}' failed: {}", report.name, report.failures.join("; "));
        }
        if failed > 0 {
            bail!("{} of {} cases failed", failed, reports.len());
        }
        info!("All {} cases passed", reports.len());
        Ok(())
    }
}

#[cfg(test)]
pub mod tests {
    use clap::Parser;
    use piecewise::align::{io::ChainCase, Anchor};

    use super::{run_case, Cases};
    use crate::commands::report::ReportFormat;

    fn scoring() -> crate::commands::scoring::ScoringArgs {
        Cases::parse_from(["cases", "-i", "cases.json"]).scoring
    }

    fn case(query: &str, reference: &str, anchors: &[(usize, usize)], k: usize) -> ChainCase {
        ChainCase::new(
            "test".to_string(),
            query.to_string(),
            reference.to_string(),
            anchors.iter().copied().map(Anchor::from).collect(),
            k,
            2,
        )
    }

    #[test]
    fn test_parse_defaults() {
        let cases = Cases::parse_from(["cases", "-i", "cases.json"]);
        assert_eq!(cases.format, ReportFormat::Text);
        assert!(!cases.show_alignment);
        assert_eq!(cases.scoring.match_score, 3);
        assert_eq!(cases.scoring.mismatch_score, -1);
        assert_eq!(cases.scoring.gap_open, -3);
        assert_eq!(cases.scoring.gap_extend, -1);
        assert_eq!(cases.scoring.threads, 1);
    }

    #[test]
    fn test_parse_overrides() {
        let cases = Cases::parse_from([
            "cases", "-i", "cases.json", "-A", "2", "-O", "-5", "-t", "4", "--format", "JSON",
            "--show-alignment",
        ]);
        assert_eq!(cases.format, ReportFormat::Json);
        assert!(cases.show_alignment);
        assert_eq!(cases.scoring.match_score, 2);
        assert_eq!(cases.scoring.gap_open, -5);
        assert_eq!(cases.scoring.threads, 4);
    }

    #[test]
    fn test_parse_rejects_unknown_format() {
        assert!(Cases::try_parse_from(["cases", "-i", "x.json", "--format", "yaml"]).is_err());
    }

    #[test]
    fn test_run_passing_case() {
        let report = run_case(&case("ATCGATCG", "ATCGATCG", &[(0, 0), (4, 4)], 4), &scoring());
        assert!(report.passed, "{:?}", report.failures);
        let alignment = report.alignment.unwrap();
        assert_eq!(alignment.score, 24);
        assert_eq!(alignment.cigar(), "8=");
    }

    #[test]
    fn test_run_invalid_case() {
        let report = run_case(&case("ATCG", "ATGG", &[(0, 0)], 3), &scoring());
        assert!(!report.passed);
        assert!(report.alignment.is_none());
        assert!(report.failures[0].starts_with("Invalid input"));
    }

    #[test]
    fn test_run_case_with_wrong_expectations() {
        let json = r#"{"name": "x", "query": "ATC", "reference": "ATC", "anchors": [[0, 0]],
                       "k": 3, "padding": 2, "expected_score": 10, "expected_cigar": "2=1X"}"#;
        let case: ChainCase = serde_json::from_str(json).unwrap();
        let report = run_case(&case, &scoring());
        assert!(!report.passed);
        assert_eq!(report.failures.len(), 2);
        assert!(report.alignment.is_some());
    }
}
