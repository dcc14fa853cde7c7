//! Stitching a chain of exact-match anchors into a single alignment.
//!
//! The chain is walked in a fixed order: the leading flank (before the first anchor), the first
//! anchor's exact match, one gap per pair of consecutive anchors (each including the next
//! anchor's match), and the trailing flank (after the last anchor).  Each step contributes a
//! score and a list of runs; the runs are merged into one edit script at the end.
pub(crate) mod anchor;
pub(crate) mod assembler;
pub(crate) mod flank;
pub(crate) mod gap;

use std::fmt;

use thiserror::Error;

use super::edit_script::Run;

pub use anchor::{validate_anchors, Anchor};
pub use assembler::{align_chain, align_chain_parallel, ChainAligner};
pub use flank::{Flank, FlankExtension, FlankSide, FlankWindow};
pub use gap::{Gap, GapKind};

/// Which of the two sequences an anchor error refers to.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum SequenceKind {
    Query,
    Reference,
}

impl fmt::Display for SequenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query => write!(f, "query"),
            Self::Reference => write!(f, "reference"),
        }
    }
}

/// Errors that abort the alignment of an anchor chain.  No partial result is ever returned.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("No anchors provided")]
    EmptyAnchorChain,

    #[error("k must be positive")]
    InvalidKmerSize,

    #[error("Anchor {index} {sequence} position {offset} + k={k} exceeds {sequence} length {len}")]
    AnchorOutOfBounds {
        index: usize,
        sequence: SequenceKind,
        offset: usize,
        k: usize,
        len: usize,
    },

    #[error("Anchor {index} mismatch - query: '{query_kmer}' vs reference: '{ref_kmer}'")]
    AnchorMismatch {
        index: usize,
        query_kmer: String,
        ref_kmer: String,
    },

    #[error("Anchor {index} is not in ascending {sequence} order")]
    UnsortedAnchors { index: usize, sequence: SequenceKind },

    #[error(
        "Anchor {index} overlaps the previous anchor by k={k} or more \
         (query diff: {query_diff}, reference diff: {ref_diff})"
    )]
    MalformedChain {
        index: usize,
        query_diff: isize,
        ref_diff: isize,
        k: usize,
    },

    #[error(transparent)]
    Aligner(#[from] anyhow::Error),
}

/// The score and runs contributed by one step of the chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segment {
    pub score: i32,
    pub runs: Vec<Run>,
}
