use std::{fmt::Display, io::Write, str::FromStr};

use anyhow::{anyhow, Error, Result};
use itertools::Itertools;
use piecewise::align::{io::ChainCase, view::AlignmentView, AlignmentResult};
use serde::Serialize;

use super::command::ValueEnum;

/// The format of the report written to standard output.
#[derive(Default, Debug, PartialEq, Eq, Copy, Clone)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl FromStr for ReportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(anyhow!("Invalid report format: {}", s)),
        }
    }
}

impl ValueEnum for ReportFormat {
    fn variants<'a>() -> &'a [Self] {
        &[Self::Text, Self::Json]
    }
}

/// The outcome of aligning one case.
#[derive(Debug, Serialize)]
pub struct CaseReport {
    pub name: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<AlignmentResult>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<String>,
}

/// Writes one case and its outcome as text, optionally followed by the alignment view.
pub fn write_case<W: Write>(
    writer: &mut W,
    index: usize,
    case: &ChainCase,
    report: &CaseReport,
    show_alignment: bool,
) -> Result<()> {
    writeln!(writer, "Case {}: {}", index + 1, case.name())?;
    writeln!(writer, "Query: {}", case.query())?;
    writeln!(writer, "Ref:   {}", case.reference())?;
    writeln!(
        writer,
        "Anchors: {} k={} padding={}",
        case.anchors().iter().join(" "),
        case.k(),
        case.padding()
    )?;
    if let Some(alignment) = &report.alignment {
        writeln!(writer, "Score: {}", alignment.score)?;
        writeln!(writer, "Query Range: {} - {}", alignment.query_start, alignment.query_end)?;
        writeln!(writer, "Ref Range:   {} - {}", alignment.ref_start, alignment.ref_end)?;
        writeln!(writer, "CIGAR: {}", alignment.edit_script)?;
    }
    for failure in &report.failures {
        writeln!(writer, "FAILED: {}", failure)?;
    }
    if report.passed {
        writeln!(writer, "PASSED")?;
    }
    if let (true, Some(alignment)) = (show_alignment, &report.alignment) {
        writeln!(writer)?;
        write!(
            writer,
            "{}",
            AlignmentView::new(case.query_bytes(), case.reference_bytes(), alignment)
        )?;
    }
    writeln!(writer)?;
    Ok(())
}

/// Writes the pass/fail counts.
pub fn write_summary<W: Write>(writer: &mut W, reports: &[CaseReport]) -> Result<()> {
    let passed = reports.iter().filter(|report| report.passed).count();
    writeln!(writer, "Cases passed: {}/{}", passed, reports.len())?;
    writeln!(writer, "Cases failed: {}/{}", reports.len() - passed, reports.len())?;
    Ok(())
}
