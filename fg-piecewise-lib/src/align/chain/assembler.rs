use anyhow::anyhow;
use itertools::Itertools;
use log::{debug, info};

use super::{
    anchor::{validate_anchors, Anchor},
    flank::{Flank, FlankExtension, FlankSide},
    gap::Gap,
    ChainError, Segment,
};
use crate::align::{
    aligners::{Options, PairwiseAligner},
    alignment::AlignmentResult,
    edit_script::{merge_runs, Operation, Run},
    scoring::ScoringParameters,
};

/// One independent unit of work in a chain: a flank or a gap.  Each depends only on its own
/// slices of the two sequences.
#[derive(Debug, Clone)]
enum Step {
    Flank(Flank),
    Gap(Gap),
}

/// The resolved form of a [`Step`].
#[derive(Debug)]
enum Piece {
    Flank(FlankSide, FlankExtension),
    Gap(Segment),
}

impl Step {
    fn resolve<A: PairwiseAligner>(
        &self,
        aligner: &mut A,
        query: &[u8],
        reference: &[u8],
        scoring: &ScoringParameters,
    ) -> Result<Piece, ChainError> {
        match self {
            Self::Flank(flank) => {
                let extension = flank.extend(aligner, query, reference, scoring)?;
                Ok(Piece::Flank(flank.side, extension))
            }
            Self::Gap(gap) => Ok(Piece::Gap(gap.bridge(aligner, query, reference, scoring)?)),
        }
    }
}

/// A validated chain broken into its steps, in the order they contribute to the alignment:
/// leading flank, one gap per consecutive anchor pair, trailing flank.
struct Plan {
    first: Anchor,
    last: Anchor,
    k: usize,
    steps: Vec<Step>,
}

impl Plan {
    fn new(
        query: &[u8],
        reference: &[u8],
        anchors: &[Anchor],
        k: usize,
        padding: usize,
    ) -> Result<Self, ChainError> {
        validate_anchors(query, reference, anchors, k)?;
        let (first, last) = match (anchors.first(), anchors.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return Err(ChainError::EmptyAnchorChain),
        };

        let mut steps = Vec::with_capacity(anchors.len() + 1);
        if let Some(flank) = Flank::leading(&first, padding) {
            steps.push(Step::Flank(flank));
        }
        for (index, (prev, cur)) in anchors.iter().tuple_windows().enumerate() {
            steps.push(Step::Gap(Gap::between(prev, cur, k, index + 1)?));
        }
        if let Some(flank) = Flank::trailing(&last, k, query.len(), reference.len(), padding) {
            steps.push(Step::Flank(flank));
        }

        debug!(
            "Planned {} steps for {} anchors ({} need the aligner)",
            steps.len(),
            anchors.len(),
            steps
                .iter()
                .filter(|step| match step {
                    Step::Flank(_) => true,
                    Step::Gap(gap) => gap.needs_aligner(),
                })
                .count()
        );
        Ok(Self {
            first,
            last,
            k,
            steps,
        })
    }

    /// Concatenates the resolved pieces, in step order, around the first anchor's exact match.
    fn assemble(
        &self,
        pieces: Vec<Piece>,
        query: &[u8],
        reference: &[u8],
        scoring: &ScoringParameters,
    ) -> Result<AlignmentResult, ChainError> {
        let (mut query_start, mut ref_start) = (self.first.query_offset, self.first.ref_offset);
        let (mut query_end, mut ref_end) = (self.last.query_end(self.k), self.last.ref_end(self.k));

        let mut leading = Segment::default();
        let mut body = Segment {
            score: scoring.match_run(self.k),
            runs: vec![Run::new(Operation::Equal, self.k)],
        };
        for piece in pieces {
            match piece {
                Piece::Flank(FlankSide::Leading, extension) => {
                    query_start = extension.query_pos;
                    ref_start = extension.ref_pos;
                    leading = Segment {
                        score: extension.score,
                        runs: extension.runs,
                    };
                }
                Piece::Gap(segment) => {
                    body.score += segment.score;
                    body.runs.extend(segment.runs);
                }
                Piece::Flank(FlankSide::Trailing, extension) => {
                    query_end = extension.query_pos;
                    ref_end = extension.ref_pos;
                    body.score += extension.score;
                    body.runs.extend(extension.runs);
                }
            }
        }

        let result = AlignmentResult {
            score: leading.score + body.score,
            query_start,
            query_end,
            ref_start,
            ref_end,
            edit_script: merge_runs(leading.runs.into_iter().chain(body.runs)),
        };
        result.validate(query.len(), reference.len())?;
        Ok(result)
    }
}

/// Aligns `query` to `reference` along a chain of length-`k` exact-match anchors.
///
/// The anchors are validated first; nothing is aligned if any is invalid.  The leading flank, the
/// gaps between consecutive anchors and the trailing flank are then resolved in that order, each
/// either arithmetically or with a call to `aligner`, and their runs are merged into a single edit
/// script.  Any failure aborts the whole chain.
pub fn align_chain<A: PairwiseAligner>(
    aligner: &mut A,
    query: &[u8],
    reference: &[u8],
    anchors: &[Anchor],
    k: usize,
    padding: usize,
    scoring: &ScoringParameters,
) -> Result<AlignmentResult, ChainError> {
    let plan = Plan::new(query, reference, anchors, k, padding)?;
    let pieces = plan
        .steps
        .iter()
        .map(|step| step.resolve(aligner, query, reference, scoring))
        .collect::<Result<Vec<_>, _>>()?;
    plan.assemble(pieces, query, reference, scoring)
}

/// Like [`align_chain`], but resolves the steps of the chain on up to `threads` worker threads,
/// each with its own aligner built by `make_aligner`.  The result is identical to
/// [`align_chain`].  When several steps fail, the error of the earliest step is returned.
pub fn align_chain_parallel<A, F>(
    make_aligner: F,
    threads: usize,
    query: &[u8],
    reference: &[u8],
    anchors: &[Anchor],
    k: usize,
    padding: usize,
    scoring: &ScoringParameters,
) -> Result<AlignmentResult, ChainError>
where
    A: PairwiseAligner,
    F: Fn() -> A + Sync,
{
    let plan = Plan::new(query, reference, anchors, k, padding)?;
    let threads = threads.clamp(1, plan.steps.len().max(1));

    let (to_resolve_tx, to_resolve_rx) = flume::unbounded::<(usize, &Step)>();
    let (resolved_tx, resolved_rx) = flume::unbounded::<(usize, Result<Piece, ChainError>)>();
    for job in plan.steps.iter().enumerate() {
        to_resolve_tx
            .send(job)
            .map_err(|_| anyhow!("Step queue closed before all steps were sent"))?;
    }
    drop(to_resolve_tx);

    std::thread::scope(|scope| {
        for _ in 0..threads {
            let to_resolve_rx = to_resolve_rx.clone();
            let resolved_tx = resolved_tx.clone();
            let make_aligner = &make_aligner;
            scope.spawn(move || {
                let mut aligner = make_aligner();
                for (index, step) in to_resolve_rx.iter() {
                    let piece = step.resolve(&mut aligner, query, reference, scoring);
                    if resolved_tx.send((index, piece)).is_err() {
                        break;
                    }
                }
            });
        }
    });
    drop(resolved_tx);

    let mut resolved = resolved_rx.iter().collect::<Vec<_>>();
    if resolved.len() != plan.steps.len() {
        return Err(anyhow!(
            "Resolved {} of {} steps",
            resolved.len(),
            plan.steps.len()
        )
        .into());
    }
    resolved.sort_by_key(|(index, _)| *index);
    let pieces = resolved
        .into_iter()
        .map(|(_, piece)| piece)
        .collect::<Result<Vec<_>, _>>()?;
    plan.assemble(pieces, query, reference, scoring)
}

/// A pairwise aligner bundled with the [`Options`] for aligning anchor chains.
pub struct ChainAligner<A> {
    aligner: A,
    options: Options,
}

impl<A: PairwiseAligner + Clone + Sync> ChainAligner<A> {
    pub fn new(aligner: A, options: Options) -> Self {
        Self { aligner, options }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Aligns one chain, on several threads when the options ask for more than one.
    pub fn align(
        &mut self,
        query: &[u8],
        reference: &[u8],
        anchors: &[Anchor],
    ) -> Result<AlignmentResult, ChainError> {
        let k = self.options.kmer_size();
        let padding = self.options.padding();
        let scoring = self.options.scoring();
        let threads = self.options.threads();
        let result = if threads > 1 {
            let template = &self.aligner;
            align_chain_parallel(
                || template.clone(),
                threads,
                query,
                reference,
                anchors,
                k,
                padding,
                &scoring,
            )
        } else {
            align_chain(
                &mut self.aligner,
                query,
                reference,
                anchors,
                k,
                padding,
                &scoring,
            )
        }?;
        info!(
            "Aligned {} anchors with score {} and CIGAR {}",
            anchors.len(),
            result.score,
            result.cigar()
        );
        Ok(result)
    }
}
