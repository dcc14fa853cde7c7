use anyhow::Result;
use bio::alignment::{
    pairwise::{Aligner, MatchParams},
    Alignment as BioAlignment, AlignmentOperation,
};
use log::trace;

use super::{constants::DEFAULT_ALIGNER_CAPACITY, AlignmentMode, PairwiseAligner};
use crate::align::{
    alignment::AlignmentResult,
    edit_script::{merge_runs, EditScript, Operation, Run},
    scoring::ScoringParameters,
};

/// The three `bio` aligners, one per mode, built for a single set of scores.
#[derive(Clone)]
struct Aligners {
    scoring: ScoringParameters,
    global: Aligner<MatchParams>,
    free_start: Aligner<MatchParams>,
    free_end: Aligner<MatchParams>,
}

impl Aligners {
    fn new(scoring: ScoringParameters, capacity: usize) -> Result<Self> {
        let bio_scoring = scoring.to_bio_scoring()?;
        Ok(Self {
            scoring,
            global: Aligner::with_capacity_and_scoring(capacity, capacity, bio_scoring.clone()),
            free_start: Aligner::with_capacity_and_scoring(
                capacity,
                capacity,
                bio_scoring.clone().xclip_prefix(0).yclip_prefix(0),
            ),
            free_end: Aligner::with_capacity_and_scoring(
                capacity,
                capacity,
                bio_scoring.xclip_suffix(0).yclip_suffix(0),
            ),
        })
    }
}

/// A [`PairwiseAligner`] backed by the affine-gap dynamic-programming aligner in `bio`.
///
/// The underlying aligners are built lazily for the scores of the first call, and rebuilt only
/// when a later call uses different scores.
#[derive(Clone)]
pub struct BioAligner {
    capacity: usize,
    aligners: Option<Aligners>,
}

impl Default for BioAligner {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_ALIGNER_CAPACITY)
    }
}

impl BioAligner {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            aligners: None,
        }
    }

    fn aligners(&mut self, scoring: &ScoringParameters) -> Result<&mut Aligners> {
        let aligners = match self.aligners.take() {
            Some(aligners) if aligners.scoring == *scoring => aligners,
            _ => Aligners::new(*scoring, self.capacity)?,
        };
        Ok(self.aligners.insert(aligners))
    }
}

impl PairwiseAligner for BioAligner {
    fn align(
        &mut self,
        mode: AlignmentMode,
        query: &[u8],
        reference: &[u8],
        scoring: &ScoringParameters,
    ) -> Result<AlignmentResult> {
        trace!(
            "{} alignment of {} query bases to {} reference bases",
            mode,
            query.len(),
            reference.len()
        );
        let aligners = self.aligners(scoring)?;
        if query.is_empty() || reference.is_empty() {
            return Ok(align_empty(mode, query.len(), reference.len(), scoring));
        }
        let alignment = match mode {
            AlignmentMode::Global => aligners.global.global(query, reference),
            AlignmentMode::FreeQueryStart => aligners.free_start.custom(query, reference),
            AlignmentMode::FreeQueryEnd => aligners.free_end.custom(query, reference),
        };
        Ok(to_alignment_result(&alignment))
    }
}

/// Aligns when at least one of the slices is empty.  A global alignment is then a single indel
/// run; a free-end alignment skips everything.
fn align_empty(
    mode: AlignmentMode,
    query_len: usize,
    ref_len: usize,
    scoring: &ScoringParameters,
) -> AlignmentResult {
    match mode {
        AlignmentMode::Global => {
            let runs = [
                Run::new(Operation::Insertion, query_len),
                Run::new(Operation::Deletion, ref_len),
            ];
            AlignmentResult {
                score: scoring.gap(query_len) + scoring.gap(ref_len),
                query_start: 0,
                query_end: query_len,
                ref_start: 0,
                ref_end: ref_len,
                edit_script: merge_runs(runs),
            }
        }
        AlignmentMode::FreeQueryStart => AlignmentResult {
            score: 0,
            query_start: query_len,
            query_end: query_len,
            ref_start: ref_len,
            ref_end: ref_len,
            edit_script: EditScript::new(),
        },
        AlignmentMode::FreeQueryEnd => AlignmentResult::default(),
    }
}

/// Converts a `bio` alignment to an [`AlignmentResult`], dropping clipping operations.
fn to_alignment_result(alignment: &BioAlignment) -> AlignmentResult {
    let edit_script = alignment
        .operations
        .iter()
        .filter_map(|op| match op {
            AlignmentOperation::Match => Some(Run::new(Operation::Equal, 1)),
            AlignmentOperation::Subst => Some(Run::new(Operation::Mismatch, 1)),
            AlignmentOperation::Ins => Some(Run::new(Operation::Insertion, 1)),
            AlignmentOperation::Del => Some(Run::new(Operation::Deletion, 1)),
            AlignmentOperation::Xclip(_) | AlignmentOperation::Yclip(_) => None,
        })
        .collect::<EditScript>();
    AlignmentResult {
        score: alignment.score,
        query_start: alignment.xstart,
        query_end: alignment.xend,
        ref_start: alignment.ystart,
        ref_end: alignment.yend,
        edit_script,
    }
}
