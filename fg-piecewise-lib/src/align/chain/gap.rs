use std::ops::Range;

use anyhow::anyhow;
use log::debug;

use super::{anchor::Anchor, ChainError, Segment};
use crate::align::{
    aligners::PairwiseAligner,
    edit_script::{Operation, Run},
    scoring::ScoringParameters,
};

/// How the span between two consecutive anchors is resolved.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum GapKind {
    /// Unaligned bases on both sequences: globally align the two slices, then match the anchor.
    Aligned {
        query: Range<usize>,
        reference: Range<usize>,
    },
    /// The anchors advance equally on both sequences (abutting or overlapping): one match run.
    Adjacent { match_len: usize },
    /// The query advances further than the reference: an insertion, then a match run.
    Insertion { len: usize, match_len: usize },
    /// The reference advances further than the query: a deletion, then a match run.
    Deletion { len: usize, match_len: usize },
}

/// The step of a chain that bridges anchor `index - 1` to anchor `index`, including anchor
/// `index`'s own exact match.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Gap {
    pub index: usize,
    pub k: usize,
    pub kind: GapKind,
}

/// `to - from` as a signed quantity.
fn signed_diff(to: usize, from: usize) -> isize {
    if to >= from {
        (to - from) as isize
    } else {
        -((from - to) as isize)
    }
}

impl Gap {
    /// Classifies the span between the end of `prev` and the start of `cur`.  Fails with
    /// [`ChainError::MalformedChain`] when the anchors overlap by `k` or more on the coordinate
    /// that advanced least, since the combined match run would then be empty or negative.
    pub fn between(prev: &Anchor, cur: &Anchor, k: usize, index: usize) -> Result<Self, ChainError> {
        let prev_end_query = prev.query_end(k);
        let prev_end_ref = prev.ref_end(k);
        let query_diff = signed_diff(cur.query_offset, prev_end_query);
        let ref_diff = signed_diff(cur.ref_offset, prev_end_ref);

        let kind = if query_diff > 0 && ref_diff > 0 {
            GapKind::Aligned {
                query: prev_end_query..cur.query_offset,
                reference: prev_end_ref..cur.ref_offset,
            }
        } else {
            let malformed = ChainError::MalformedChain {
                index,
                query_diff,
                ref_diff,
                k,
            };
            let match_len = (k as isize)
                .checked_add(query_diff.min(ref_diff))
                .and_then(|len| usize::try_from(len).ok())
                .filter(|&len| len > 0)
                .ok_or(malformed)?;
            let indel_len = query_diff.abs_diff(ref_diff);
            match ref_diff.cmp(&query_diff) {
                std::cmp::Ordering::Equal => GapKind::Adjacent { match_len },
                std::cmp::Ordering::Less => GapKind::Insertion {
                    len: indel_len,
                    match_len,
                },
                std::cmp::Ordering::Greater => GapKind::Deletion {
                    len: indel_len,
                    match_len,
                },
            }
        };
        Ok(Self { index, k, kind })
    }

    /// Whether bridging this gap needs the pairwise aligner.
    pub fn needs_aligner(&self) -> bool {
        matches!(self.kind, GapKind::Aligned { .. })
    }

    /// Resolves the gap into its score and runs.  Only [`GapKind::Aligned`] calls the aligner.
    pub fn bridge<A: PairwiseAligner>(
        &self,
        aligner: &mut A,
        query: &[u8],
        reference: &[u8],
        scoring: &ScoringParameters,
    ) -> Result<Segment, ChainError> {
        let segment = match &self.kind {
            GapKind::Aligned {
                query: query_span,
                reference: ref_span,
            } => {
                let query_part = &query[query_span.clone()];
                let ref_part = &reference[ref_span.clone()];
                let aligned = aligner.global(query_part, ref_part, scoring)?;
                if aligned.edit_script.query_len() != query_part.len()
                    || aligned.edit_script.ref_len() != ref_part.len()
                {
                    return Err(anyhow!(
                        "Global alignment of gap {} ({} query and {} reference bases) returned CIGAR {}",
                        self.index,
                        query_part.len(),
                        ref_part.len(),
                        aligned.edit_script
                    )
                    .into());
                }
                let mut runs = aligned.edit_script.runs().to_vec();
                runs.push(Run::new(Operation::Equal, self.k));
                Segment {
                    score: aligned.score + scoring.match_run(self.k),
                    runs,
                }
            }
            GapKind::Adjacent { match_len } => Segment {
                score: scoring.match_run(*match_len),
                runs: vec![Run::new(Operation::Equal, *match_len)],
            },
            GapKind::Insertion { len, match_len } => Segment {
                score: scoring.gap(*len) + scoring.match_run(*match_len),
                runs: vec![
                    Run::new(Operation::Insertion, *len),
                    Run::new(Operation::Equal, *match_len),
                ],
            },
            GapKind::Deletion { len, match_len } => Segment {
                score: scoring.gap(*len) + scoring.match_run(*match_len),
                runs: vec![
                    Run::new(Operation::Deletion, *len),
                    Run::new(Operation::Equal, *match_len),
                ],
            },
        };
        debug!(
            "Gap {} resolved as {:?} with score {}",
            self.index, self.kind, segment.score
        );
        Ok(segment)
    }
}
