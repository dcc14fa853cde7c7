use std::{fmt, ops::Range};

use anyhow::anyhow;
use log::debug;

use super::{anchor::Anchor, ChainError};
use crate::align::{aligners::PairwiseAligner, edit_script::Run, scoring::ScoringParameters};

/// Which end of the chain a flank extends.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum FlankSide {
    /// Before the first anchor, aligned with a free query start.
    Leading,
    /// After the last anchor, aligned with a free query end.
    Trailing,
}

impl fmt::Display for FlankSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leading => write!(f, "leading"),
            Self::Trailing => write!(f, "trailing"),
        }
    }
}

/// The query and reference slices a flank is aligned over.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct FlankWindow {
    pub query: Range<usize>,
    pub reference: Range<usize>,
}

/// An unanchored end of the chain that touches neither sequence boundary.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Flank {
    pub side: FlankSide,
    pub window: FlankWindow,
}

/// What a flank adds to the chain.  `query_pos`/`ref_pos` are the alignment start (leading) or
/// end (trailing) in full-sequence coordinates.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct FlankExtension {
    pub score: i32,
    pub runs: Vec<Run>,
    pub query_pos: usize,
    pub ref_pos: usize,
}

impl FlankExtension {
    /// No flank: the alignment starts or ends at the anchor.
    pub fn absent(query_pos: usize, ref_pos: usize) -> Self {
        Self {
            score: 0,
            runs: Vec::new(),
            query_pos,
            ref_pos,
        }
    }
}

impl Flank {
    /// The flank before `first`, or `None` when the anchor starts at position zero of either
    /// sequence.  The reference window ends at the anchor and is `padding` bases longer than the
    /// query part, clamped to the reference start.
    pub fn leading(first: &Anchor, padding: usize) -> Option<Self> {
        if first.query_offset == 0 || first.ref_offset == 0 {
            return None;
        }
        let ref_start = first
            .ref_offset
            .saturating_sub(first.query_offset.saturating_add(padding));
        Some(Self {
            side: FlankSide::Leading,
            window: FlankWindow {
                query: 0..first.query_offset,
                reference: ref_start..first.ref_offset,
            },
        })
    }

    /// The flank after `last`, or `None` when the anchor ends at the end of either sequence.  The
    /// reference window starts at the anchor end and is clamped to the reference end.
    pub fn trailing(
        last: &Anchor,
        k: usize,
        query_len: usize,
        ref_len: usize,
        padding: usize,
    ) -> Option<Self> {
        let query_start = last.query_end(k);
        let ref_start = last.ref_end(k);
        if query_start >= query_len || ref_start >= ref_len {
            return None;
        }
        let ref_end = ref_start
            .saturating_add(query_len - query_start)
            .saturating_add(padding)
            .min(ref_len);
        Some(Self {
            side: FlankSide::Trailing,
            window: FlankWindow {
                query: query_start..query_len,
                reference: ref_start..ref_end,
            },
        })
    }

    /// The position where the flank meets its anchor.
    pub fn boundary(&self) -> (usize, usize) {
        match self.side {
            FlankSide::Leading => (self.window.query.end, self.window.reference.end),
            FlankSide::Trailing => (self.window.query.start, self.window.reference.start),
        }
    }

    /// Aligns the flank window with the free-end mode for its side.  A zero score means no
    /// alignment beats leaving the flank unaligned, so the flank is dropped.
    pub fn extend<A: PairwiseAligner>(
        &self,
        aligner: &mut A,
        query: &[u8],
        reference: &[u8],
        scoring: &ScoringParameters,
    ) -> Result<FlankExtension, ChainError> {
        let query_part = &query[self.window.query.clone()];
        let ref_part = &reference[self.window.reference.clone()];
        let result = match self.side {
            FlankSide::Leading => aligner.free_query_start(query_part, ref_part, scoring)?,
            FlankSide::Trailing => aligner.free_query_end(query_part, ref_part, scoring)?,
        };

        if result.score == 0 {
            debug!("No {} flank found in window {:?}", self.side, self.window);
            let (query_pos, ref_pos) = self.boundary();
            return Ok(FlankExtension::absent(query_pos, ref_pos));
        }

        let (query_pos, ref_pos, anchored) = match self.side {
            FlankSide::Leading => (
                self.window.query.start + result.query_start,
                self.window.reference.start + result.ref_start,
                result.query_end == query_part.len() && result.ref_end == ref_part.len(),
            ),
            FlankSide::Trailing => (
                self.window.query.start + result.query_end,
                self.window.reference.start + result.ref_end,
                result.query_start == 0 && result.ref_start == 0,
            ),
        };
        if !anchored {
            return Err(anyhow!(
                "The {} flank alignment does not meet its anchor: {}",
                self.side,
                result
            )
            .into());
        }

        debug!(
            "Extended {} flank to query {} reference {} with score {}",
            self.side, query_pos, ref_pos, result.score
        );
        Ok(FlankExtension {
            score: result.score,
            runs: result.edit_script.runs().to_vec(),
            query_pos,
            ref_pos,
        })
    }
}
