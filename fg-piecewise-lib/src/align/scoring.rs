use anyhow::{ensure, Result};
use bio::alignment::pairwise::{MatchParams, Scoring as BioScoring};
use serde::{Deserialize, Serialize};

use super::edit_script::{EditScript, Operation, Run};

/// Details of scoring are encapsulated in this structure.
///
/// An [affine gap score model](https://en.wikipedia.org/wiki/Gap_penalty#Affine)
/// is used so that the gap score for a gap of length `k >= 1` is:
/// `GapScore(k) = gap_open + gap_extend * (k - 1)`
///
/// Note: this differs from `bio::alignment::pairwise::Scoring`, which charges
/// `gap_open + gap_extend * k`; see [`ScoringParameters::to_bio_scoring`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct ScoringParameters {
    pub match_score: i32,
    pub mismatch_score: i32,
    pub gap_open: i32,
    pub gap_extend: i32,
}

impl Default for ScoringParameters {
    fn default() -> Self {
        Self {
            match_score: 3,
            mismatch_score: -1,
            gap_open: -3,
            gap_extend: -1,
        }
    }
}

impl ScoringParameters {
    pub fn new(match_score: i32, mismatch_score: i32, gap_open: i32, gap_extend: i32) -> Self {
        Self {
            match_score,
            mismatch_score,
            gap_open,
            gap_extend,
        }
    }

    /// Checks that the scores describe a sensible affine scheme: non-negative match,
    /// non-positive mismatch, and `gap_open <= gap_extend <= 0`.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.match_score >= 0, "match score can't be negative: {}", self.match_score);
        ensure!(
            self.mismatch_score <= 0,
            "mismatch score can't be positive: {}",
            self.mismatch_score
        );
        ensure!(self.gap_extend <= 0, "gap extend can't be positive: {}", self.gap_extend);
        ensure!(
            self.gap_open <= self.gap_extend,
            "gap open ({}) must be no greater than gap extend ({})",
            self.gap_open,
            self.gap_extend
        );
        Ok(())
    }

    /// The score of `len` consecutive exact matches.
    pub fn match_run(&self, len: usize) -> i32 {
        self.match_score * len as i32
    }

    /// The score of one contiguous insertion or deletion of length `len`; zero for an empty gap.
    pub fn gap(&self, len: usize) -> i32 {
        if len == 0 {
            0
        } else {
            self.gap_open + self.gap_extend * (len as i32 - 1)
        }
    }

    /// The score of a single run.  `Match` runs are scored as matches.
    pub fn run(&self, run: &Run) -> i32 {
        match run.op {
            Operation::Match | Operation::Equal => self.match_run(run.len),
            Operation::Mismatch => self.mismatch_score * run.len as i32,
            Operation::Insertion | Operation::Deletion => self.gap(run.len),
            Operation::Sentinel => 0,
        }
    }

    /// Re-scores an edit script from its runs alone.
    pub fn edit_script(&self, script: &EditScript) -> i32 {
        script.iter().map(|run| self.run(run)).sum()
    }

    /// Converts to the scoring used by `bio`'s pairwise aligner, with all clip penalties set to
    /// `MIN_SCORE`.  `bio` charges `open + extend * k` for a gap of length `k`, so the open
    /// penalty passed on is `gap_open - gap_extend`.
    pub fn to_bio_scoring(&self) -> Result<BioScoring<MatchParams>> {
        self.validate()?;
        let match_params = MatchParams::new(self.match_score, self.mismatch_score);
        Ok(BioScoring::new(
            self.gap_open - self.gap_extend,
            self.gap_extend,
            match_params,
        ))
    }
}

#[cfg(test)]
pub mod tests {
    use rstest::rstest;

    use super::ScoringParameters;
    use crate::align::edit_script::EditScript;

    #[rstest]
    #[case(0, 0)]
    #[case(1, -3)]
    #[case(2, -4)]
    #[case(5, -7)]
    fn test_gap(#[case] len: usize, #[case] expected: i32) {
        assert_eq!(ScoringParameters::default().gap(len), expected);
    }

    #[rstest]
    #[case("3=", 9)]
    #[case("3=2I3=", 14)]
    #[case("1=1X", 2)]
    #[case("4M1D", 9)]
    fn test_score_edit_script(#[case] cigar: &str, #[case] expected: i32) {
        let script: EditScript = cigar.parse().unwrap();
        assert_eq!(ScoringParameters::default().edit_script(&script), expected);
    }

    #[rstest]
    #[case(ScoringParameters::new(-1, -1, -3, -1))]
    #[case(ScoringParameters::new(1, 1, -3, -1))]
    #[case(ScoringParameters::new(1, -1, -3, 1))]
    #[case(ScoringParameters::new(1, -1, -1, -3))]
    fn test_invalid_scoring(#[case] scoring: ScoringParameters) {
        assert!(scoring.validate().is_err());
        assert!(scoring.to_bio_scoring().is_err());
    }

    #[test]
    fn test_to_bio_scoring() {
        let scoring = ScoringParameters::default().to_bio_scoring().unwrap();
        assert_eq!(scoring.gap_open, -2);
        assert_eq!(scoring.gap_extend, -1);
    }
}
