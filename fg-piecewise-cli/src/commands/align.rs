use std::{io, io::Write};

use anyhow::Result;
use clap::{
    builder::{PossibleValuesParser, TypedValueParser as _},
    Parser,
};
use log::info;
use piecewise::align::{
    aligners::{DEFAULT_KMER_SIZE, DEFAULT_PADDING},
    io::ChainCase,
    view::AlignmentView,
    Anchor,
};

use super::{
    command::{Command, ValueEnum},
    report::{write_case, ReportFormat},
    scoring::ScoringArgs,
};
use crate::commands::cases::run_case;

/// Aligns a query to a reference along a single chain of exact-match anchors.
///
/// Each anchor is given as `<query offset>:<reference offset>` (0-based) and marks the start of a
/// length-k exact match.  Anchors must be in ascending order on both sequences.  Gaps between
/// anchors are aligned globally, while the unanchored ends are aligned with free query ends
/// against a reference window `--padding` bases longer than the query end.
#[derive(Parser, Debug, Clone)]
#[clap(term_width = 0)]
pub struct Align {
    /// The query sequence.  Bases are compared exactly as given, so case matters.
    #[clap(long, short = 'q', display_order = 1)]
    query: String,

    /// The reference sequence.  Bases are compared exactly as given, so case matters.
    #[clap(long, short = 'r', display_order = 2)]
    reference: String,

    /// The anchors, e.g. `2:6,7:11,12:17`.
    #[clap(long, short = 'a', value_delimiter = ',', required = true, display_order = 3)]
    anchors: Vec<Anchor>,

    /// The length of every anchor's exact match.
    #[clap(long, short = 'k', default_value_t = DEFAULT_KMER_SIZE, display_order = 4)]
    k: usize,

    /// The number of extra reference bases searched when aligning the unanchored ends.
    #[clap(long, short = 'p', default_value_t = DEFAULT_PADDING, display_order = 5)]
    padding: usize,

    #[clap(flatten)]
    scoring: ScoringArgs,

    /// Show the alignment as reference, match and query rows (text format only).
    #[clap(long, default_value = "false", display_order = 6)]
    show_alignment: bool,

    /// The format of the report.
    #[clap(
        long,
        value_parser = PossibleValuesParser::new(ReportFormat::possible_values())
            .try_map(|s| s.parse::<ReportFormat>()),
        default_value_t = ReportFormat::Text,
        ignore_case = true,
        display_order = 7
    )]
    format: ReportFormat,
}

impl Align {
    fn to_case(&self) -> ChainCase {
        ChainCase::new(
            "command-line".to_string(),
            self.query.clone(),
            self.reference.clone(),
            self.anchors.clone(),
            self.k,
            self.padding,
        )
    }
}

impl Command for Align {
    fn execute(&self) -> Result<()> {
        let case = self.to_case();
        info!(
            "Aligning a query of length {} to a reference of length {} with {} anchors",
            case.query().len(),
            case.reference().len(),
            case.anchors().len()
        );
        let report = run_case(&case, &self.scoring);

        let mut stdout = io::stdout().lock();
        match self.format {
            ReportFormat::Text => write_case(&mut stdout, 0, &case, &report, false)?,
            ReportFormat::Json => {
                serde_json::to_writer_pretty(&mut stdout, &report)?;
                writeln!(stdout)?;
            }
        }
        if let (true, ReportFormat::Text, Some(alignment)) =
            (self.show_alignment, self.format, &report.alignment)
        {
            write!(
                stdout,
                "{}",
                AlignmentView::new(case.query_bytes(), case.reference_bytes(), alignment)
            )?;
        }
        stdout.flush()?;

        anyhow::ensure!(report.passed, "{}", report.failures.join("; "));
        Ok(())
    }
}

#[cfg(test)]
pub mod tests {
    use clap::Parser;
    use piecewise::align::Anchor;

    use super::Align;
    use crate::commands::cases::run_case;

    #[test]
    fn test_parse_anchors() {
        let align = Align::parse_from([
            "align",
            "-q",
            "tcactaaccgctacgat",
            "-r",
            "AAAATCACTACCCGCATACGTTCCCC",
            "-a",
            "2:6,7:11,12:17",
        ]);
        assert_eq!(
            align.anchors,
            vec![Anchor::new(2, 6), Anchor::new(7, 11), Anchor::new(12, 17)]
        );
        assert_eq!(align.k, 3);
        assert_eq!(align.padding, 2);
        assert_eq!(align.to_case().query(), "tcactaaccgctacgat");
    }

    #[test]
    fn test_bases_are_compared_as_given() {
        let align = Align::parse_from(["align", "-q", "acgT", "-r", "ACGT", "-a", "0:0"]);
        let case = align.to_case();
        assert_eq!(case.query(), "acgT");
        assert_eq!(case.reference(), "ACGT");
        let report = run_case(&case, &align.scoring);
        assert!(!report.passed);
        assert!(report.failures[0].starts_with("Invalid input"));
    }

    #[test]
    fn test_parse_requires_anchors() {
        assert!(Align::try_parse_from(["align", "-q", "ACGT", "-r", "ACGT"]).is_err());
        assert!(Align::try_parse_from(["align", "-q", "ACGT", "-r", "ACGT", "-a", "0"]).is_err());
    }
}
