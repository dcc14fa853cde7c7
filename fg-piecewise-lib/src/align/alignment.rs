use std::fmt;

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

use super::edit_script::EditScript;

/// We consider an alignment between a query and a reference sequence.  An alignment consists of
/// a score, the start and end positions of the alignment on the query and on the reference, and
/// the edit script.  Replaying the edit script from `(query_start, ref_start)` must end exactly at
/// `(query_end, ref_end)`; see [`AlignmentResult::validate`].
#[derive(Debug, Eq, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct AlignmentResult {
    /// Alignment score
    pub score: i32,

    /// Start position of alignment in the query (0-based)
    pub query_start: usize,

    /// End position of alignment in the query (0-based exclusive)
    pub query_end: usize,

    /// Start position of alignment in the reference (0-based)
    pub ref_start: usize,

    /// End position of alignment in the reference (0-based exclusive)
    pub ref_end: usize,

    /// The merged edit operations
    pub edit_script: EditScript,
}

impl AlignmentResult {
    pub fn cigar(&self) -> String {
        self.edit_script.cigar()
    }

    /// Validates that the spans lie within sequences of the given lengths and that the edit
    /// script consumes exactly the query and reference spans.
    pub fn validate(&self, query_len: usize, ref_len: usize) -> Result<()> {
        ensure!(
            self.query_start <= self.query_end && self.query_end <= query_len,
            "query span {}-{} invalid for a query of length {}",
            self.query_start,
            self.query_end,
            query_len
        );
        ensure!(
            self.ref_start <= self.ref_end && self.ref_end <= ref_len,
            "reference span {}-{} invalid for a reference of length {}",
            self.ref_start,
            self.ref_end,
            ref_len
        );
        let query_end = self.query_start + self.edit_script.query_len();
        let ref_end = self.ref_start + self.edit_script.ref_len();
        ensure!(
            query_end == self.query_end,
            "CIGAR {} ends at query position {}, expected {}",
            self.edit_script,
            query_end,
            self.query_end
        );
        ensure!(
            ref_end == self.ref_end,
            "CIGAR {} ends at reference position {}, expected {}",
            self.edit_script,
            ref_end,
            self.ref_end
        );
        Ok(())
    }
}

impl fmt::Display for AlignmentResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "query-span: {}-{} ref-span: {}-{} score: {} cigar: {}",
            self.query_start,
            self.query_end,
            self.ref_start,
            self.ref_end,
            self.score,
            self.edit_script,
        )
    }
}

#[cfg(test)]
pub mod tests {
    use rstest::rstest;

    use super::AlignmentResult;

    fn alignment(
        query_start: usize,
        query_end: usize,
        ref_start: usize,
        ref_end: usize,
        cigar: &str,
    ) -> AlignmentResult {
        AlignmentResult {
            score: 0,
            query_start,
            query_end,
            ref_start,
            ref_end,
            edit_script: cigar.parse().unwrap(),
        }
    }

    #[rstest]
    #[case(alignment(0, 0, 0, 0, ""), 0, 0)]
    #[case(alignment(0, 3, 0, 3, "3="), 3, 3)]
    #[case(alignment(2, 17, 5, 22, "5=2D5=1X4="), 17, 26)]
    #[case(alignment(1, 4, 0, 5, "3=2D"), 4, 5)]
    fn test_valid_alignments(
        #[case] alignment: AlignmentResult,
        #[case] query_len: usize,
        #[case] ref_len: usize,
    ) {
        alignment.validate(query_len, ref_len).unwrap();
    }

    #[rstest]
    #[case(alignment(0, 4, 0, 3, "3="), 4, 4)] // query span not consumed
    #[case(alignment(0, 3, 0, 4, "3="), 4, 4)] // reference span not consumed
    #[case(alignment(0, 5, 0, 5, "5="), 4, 5)] // beyond the query
    #[case(alignment(0, 5, 0, 5, "5="), 5, 4)] // beyond the reference
    #[case(alignment(3, 2, 0, 0, ""), 5, 5)] // start after end
    fn test_invalid_alignments(
        #[case] alignment: AlignmentResult,
        #[case] query_len: usize,
        #[case] ref_len: usize,
    ) {
        assert!(alignment.validate(query_len, ref_len).is_err());
    }

    #[test]
    fn test_display() {
        let alignment = AlignmentResult {
            score: 14,
            ..alignment(0, 8, 0, 6, "3=2I3=")
        };
        assert_eq!(
            alignment.to_string(),
            "query-span: 0-8 ref-span: 0-6 score: 14 cigar: 3=2I3="
        );
    }
}
