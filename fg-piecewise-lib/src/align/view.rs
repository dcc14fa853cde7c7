use std::fmt;

use super::{alignment::AlignmentResult, edit_script::Operation};

/// A plain-text, three row rendering of an alignment over the whole reference: the reference,
/// a match row (`|` for a match, `X` for a mismatch), and the query.  Reference bases outside the
/// aligned span are shown against `.` and gaps are shown as `-`.
pub struct AlignmentView<'a> {
    query: &'a [u8],
    reference: &'a [u8],
    result: &'a AlignmentResult,
}

impl<'a> AlignmentView<'a> {
    pub fn new(query: &'a [u8], reference: &'a [u8], result: &'a AlignmentResult) -> Self {
        Self {
            query,
            reference,
            result,
        }
    }

    /// Builds the reference, match and query rows.  Positions beyond either sequence are
    /// rendered as `?`.
    pub fn rows(&self) -> (String, String, String) {
        let mut ref_row = String::new();
        let mut match_row = String::new();
        let mut query_row = String::new();
        let base = |seq: &[u8], pos: usize| seq.get(pos).map_or('?', |b| char::from(*b));

        let ref_start = self.result.ref_start.min(self.reference.len());
        for pos in 0..ref_start {
            ref_row.push(base(self.reference, pos));
            match_row.push(' ');
            query_row.push('.');
        }

        let (mut query_pos, mut ref_pos) = (self.result.query_start, ref_start);
        for run in self.result.edit_script.iter() {
            for _ in 0..run.len {
                match run.op {
                    Operation::Match | Operation::Equal | Operation::Mismatch => {
                        ref_row.push(base(self.reference, ref_pos));
                        query_row.push(base(self.query, query_pos));
                        match_row.push(if run.op == Operation::Mismatch { 'X' } else { '|' });
                        query_pos += 1;
                        ref_pos += 1;
                    }
                    Operation::Insertion => {
                        ref_row.push('-');
                        match_row.push(' ');
                        query_row.push(base(self.query, query_pos));
                        query_pos += 1;
                    }
                    Operation::Deletion => {
                        ref_row.push(base(self.reference, ref_pos));
                        match_row.push(' ');
                        query_row.push('-');
                        ref_pos += 1;
                    }
                    Operation::Sentinel => (),
                }
            }
        }

        for pos in ref_pos..self.reference.len() {
            ref_row.push(base(self.reference, pos));
            match_row.push(' ');
            query_row.push('.');
        }
        (ref_row, match_row, query_row)
    }
}

impl fmt::Display for AlignmentView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (ref_row, match_row, query_row) = self.rows();
        writeln!(f, "Ref    : {}", ref_row)?;
        writeln!(f, "         {}", match_row)?;
        writeln!(f, "Query  : {}", query_row)
    }
}
